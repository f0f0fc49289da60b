use serde::{Deserialize, Serialize};

use crate::peer::PeerId;

/// The single JSON object a peer sends on its registration connection.
/// No framing, no newline; the peer's host is taken from the connection's
/// remote address, so only the task port travels in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub id: PeerId,
    pub port: u16,
}

/// JSON header preceding the raw image bytes on a task connection,
/// terminated by a single ASCII newline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHeader {
    pub size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl TaskHeader {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            filename: None,
        }
    }
}
