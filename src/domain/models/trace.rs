use chrono::DateTime;
use chrono::Utc;
use serde_derive::Serialize;
use serde_json::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TraceKind {
    Request,
    Response,
    Info,
    Error,
    Data,
}

#[derive(Clone, Debug, Serialize)]
pub struct TraceEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TraceKind,
    pub data: Value,
}

impl TraceEntry {
    pub fn new(kind: TraceKind, data: Value) -> TraceEntry {
        return TraceEntry {
            timestamp: Utc::now(),
            kind,
            data,
        };
    }
}
