//! Capabilities the orchestrator consumes but does not implement.
//!
//! Agent discovery lives in `relay_agents::AgentDiscovery`; the proof system
//! and the settlement layer are declared here.

use async_trait::async_trait;
use relay_models::intent::TransferIntent;
use relay_models::proof::ProofArtifact;
use relay_models::quote::{Fee, RouteQuote};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::signer::SignedPayload;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("Proof generation error: {0}")]
    Generation(String),

    #[error("Proof verification failed")]
    Verification,
}

/// Produces a privacy proof that a balance covers a required minimum.
#[async_trait]
pub trait ProofCapability: Send + Sync {
    async fn generate_proof(
        &self,
        amount: &Decimal,
        required_minimum: &Decimal,
    ) -> Result<ProofArtifact, ProofError>;

    fn verify_proof(&self, proof: &ProofArtifact) -> bool;
}

/// What the settlement layer reports for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub tx_hash: String,
    pub block_height: u64,
    pub fee_used: Fee,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("Settlement network failure: {0}")]
    Network(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Settlement rejected: {0}")]
    Rejected(String),
}

/// Submits a selected route for execution. Called at most once per call.
///
/// `payload` is the relay's signature over the route, intent and proof.
#[async_trait]
pub trait SettlementCapability: Send + Sync {
    async fn submit(
        &self,
        route: &RouteQuote,
        intent: &TransferIntent,
        proof: Option<&ProofArtifact>,
        payload: &SignedPayload,
    ) -> Result<Settlement, SettlementError>;
}
