/// The newest homework entry of one poll, reduced to what the loop compares.
///
/// `id` carries the API's `homework_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRecord {
    pub id: String,
    pub status: String,
}

/// Result of a single tick, as reported by `Orchestrator::tick`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new verdict message was delivered.
    Notified(String),
    /// The derived message equals the last one sent.
    Unchanged,
    /// The record carried a status with no verdict; nothing was sent.
    NoVerdict(String),
    /// The tick hit an error and went through the failure path.
    Failed(String),
}
