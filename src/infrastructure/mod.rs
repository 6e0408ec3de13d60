pub mod backends;
pub mod transports;
