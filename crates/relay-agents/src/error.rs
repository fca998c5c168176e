use thiserror::Error;

/// Failure of a single agent's quote request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("Agent {agent} unreachable: {reason}")]
    Unreachable { agent: String, reason: String },

    #[error("Agent {agent} declined: {reason}")]
    Declined { agent: String, reason: String },

    #[error("Agent {agent} timed out after {timeout_ms} ms")]
    Timeout { agent: String, timeout_ms: u64 },

    #[error("Agent task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NegotiationError {
    #[error("No agent responded within {waited_ms} ms")]
    Timeout { waited_ms: u64 },

    #[error("All {attempted} agents failed to quote")]
    AgentUnavailable {
        attempted: usize,
        failures: Vec<AgentError>,
    },

    #[error("No quotes available")]
    NoQuotesAvailable,

    #[error("Quote collection cancelled")]
    Cancelled,
}
