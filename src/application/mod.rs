pub mod cli;
pub mod commands;
pub mod relay;
pub mod ui;
