//! Request and response types for the HTTP surface.

use loghouse_core::Record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ProduceRequest {
    pub record: Record,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProduceResponse {
    pub offset: u64,
}

#[derive(Debug, Deserialize)]
pub struct ConsumeParams {
    pub offset: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConsumeResponse {
    pub record: Record,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OffsetsResponse {
    pub lowest: u64,
    pub highest: u64,
}
