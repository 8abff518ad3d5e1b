use serde::{Deserialize, Serialize};

/// Server-assigned device identifier; never minted by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(pub i64);
