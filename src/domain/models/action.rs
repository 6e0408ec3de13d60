use super::OutgoingRequest;

pub enum Action {
    DeliveryAbort(),
    DeliveryRequest(OutgoingRequest),
    ProbeApi(),
}
