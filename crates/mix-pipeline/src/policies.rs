//! Failure policies

use serde::{Deserialize, Serialize};

/// What a transform failure inside a report does to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformFailurePolicy {
    /// Log and count the failure, keep the partially filled record
    #[default]
    Report,

    /// Abort the run
    Fail,
}
