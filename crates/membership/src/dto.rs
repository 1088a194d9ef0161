//! Wire DTOs shared with the seed. Kept separate from `ring_core::NodeInfo`
//! because the wire format (`addr`) and the in-process type (`address`)
//! are allowed to diverge without forcing a rename on either side.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct HeartbeatRequest {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: String,
    pub addr: String,
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatResponse {
    pub active_nodes: Vec<NodeDto>,
}

impl From<NodeDto> for ring_core::NodeInfo {
    fn from(dto: NodeDto) -> Self {
        ring_core::NodeInfo::new(ring_core::NodeId::new(dto.id), dto.addr)
    }
}
