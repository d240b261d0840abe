//! Operation identifiers.

use serde::{Deserialize, Serialize};

/// Handle to one operation: the owning global rank and its position in that
/// rank's operation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OpId {
    pub rank: usize,
    pub index: usize,
}
