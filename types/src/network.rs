//! Network identifier.

use serde::{Deserialize, Serialize};

/// Identifies which lattice network a node participates in. Each network has
/// its own genesis account and genesis open block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkId {
    /// Local / CI test network. Ships its genesis private key.
    Test,
    /// The public beta network.
    Beta,
    /// The production network.
    Live,
}

impl NetworkId {
    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Beta => "beta",
            Self::Live => "live",
        }
    }
}
