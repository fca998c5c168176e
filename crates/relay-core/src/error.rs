use std::error::Error as StdError;
use std::fmt;

use relay_agents::NegotiationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::{ProofError, SettlementError};
use crate::signer::SignerError;
use crate::validator::ValidationError;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Terminal failure classes a caller can act on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Fix the input; resubmitting unchanged fails again.
    InvalidRequest,
    ProofGenerationFailed,
    /// No usable quote.
    AgentUnavailable,
    Timeout,
    /// Settlement layer failure.
    NetworkFailure,
    /// Reported by the settlement layer, passed through unchanged.
    InsufficientFunds,
    Cancelled,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::ProofGenerationFailed => "PROOF_GENERATION_FAILED",
            ErrorKind::AgentUnavailable => "AGENT_UNAVAILABLE",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::NetworkFailure => "NETWORK_FAILURE",
            ErrorKind::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorKind::Cancelled => "CANCELLED",
        }
    }

    /// Whether resubmitting the same intent later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::AgentUnavailable | ErrorKind::Timeout | ErrorKind::NetworkFailure
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validation,
    Proof,
    QuoteCollection,
    RouteSelection,
    Settlement,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validation => "validation",
            Stage::Proof => "proof",
            Stage::QuoteCollection => "quote_collection",
            Stage::RouteSelection => "route_selection",
            Stage::Settlement => "settlement",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn cause_suffix(source: &Option<BoxError>) -> String {
    match source {
        Some(cause) => format!(": {cause}"),
        None => String::new(),
    }
}

/// The single tagged error an orchestration call fails with.
#[derive(Error, Debug)]
#[error("[{kind}] {stage}: {message}{}", cause_suffix(.source))]
pub struct RelayError {
    kind: ErrorKind,
    stage: Stage,
    message: String,
    source: Option<BoxError>,
}

impl RelayError {
    pub fn new(kind: ErrorKind, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn cancelled(stage: Stage) -> Self {
        Self::new(ErrorKind::Cancelled, stage, "call cancelled by caller")
    }

    pub(crate) fn deadline(stage: Stage) -> Self {
        Self::new(ErrorKind::Timeout, stage, "deadline exceeded")
    }

    pub(crate) fn from_validation(err: ValidationError) -> Self {
        Self::new(ErrorKind::InvalidRequest, Stage::Validation, "validation failed")
            .with_source(err)
    }

    pub(crate) fn from_proof(err: ProofError) -> Self {
        let message = match &err {
            ProofError::Verification => "generated proof failed verification",
            ProofError::Generation(_) => "failed to generate privacy proof",
        };
        Self::new(ErrorKind::ProofGenerationFailed, Stage::Proof, message).with_source(err)
    }

    pub(crate) fn from_negotiation(stage: Stage, err: NegotiationError) -> Self {
        let (kind, message) = match &err {
            NegotiationError::Timeout { .. } => {
                (ErrorKind::Timeout, "timed out waiting for agent quotes")
            }
            NegotiationError::AgentUnavailable { .. } => {
                (ErrorKind::AgentUnavailable, "failed to get agent quotes")
            }
            NegotiationError::NoQuotesAvailable => {
                (ErrorKind::AgentUnavailable, "no suitable route found")
            }
            NegotiationError::Cancelled => (ErrorKind::Cancelled, "call cancelled by caller"),
        };
        Self::new(kind, stage, message).with_source(err)
    }

    pub(crate) fn from_settlement(err: SettlementError) -> Self {
        let kind = match &err {
            SettlementError::InsufficientFunds(_) => ErrorKind::InsufficientFunds,
            SettlementError::Network(_) | SettlementError::Rejected(_) => {
                ErrorKind::NetworkFailure
            }
        };
        Self::new(kind, Stage::Settlement, "settlement failed").with_source(err)
    }

    pub(crate) fn from_signing(err: SignerError) -> Self {
        Self::new(
            ErrorKind::NetworkFailure,
            Stage::Settlement,
            "failed to sign settlement payload",
        )
        .with_source(err)
    }
}
