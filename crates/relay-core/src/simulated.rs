//! In-process stand-ins for the proof system and the settlement layer.

use std::time::Duration;

use async_trait::async_trait;
use relay_models::config::{ProverConfig, SettlementConfig};
use relay_models::intent::TransferIntent;
use relay_models::proof::ProofArtifact;
use relay_models::quote::RouteQuote;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::ports::{ProofCapability, ProofError, Settlement, SettlementCapability, SettlementError};
use crate::signer::SignedPayload;

const DIGEST_LEN: usize = 32;

/// Hash-based prover: the "proof" is SHA-256 over the inputs and circuit path.
#[derive(Debug, Clone)]
pub struct SimulatedProver {
    circuit_path: String,
}

impl SimulatedProver {
    pub fn new(config: &ProverConfig) -> Self {
        Self {
            circuit_path: config.circuit_path.clone(),
        }
    }

    pub fn circuit_path(&self) -> &str {
        &self.circuit_path
    }
}

#[async_trait]
impl ProofCapability for SimulatedProver {
    async fn generate_proof(
        &self,
        amount: &Decimal,
        required_minimum: &Decimal,
    ) -> Result<ProofArtifact, ProofError> {
        if self.circuit_path.is_empty() {
            return Err(ProofError::Generation("no circuit configured".to_string()));
        }
        let input = format!("{amount}-{required_minimum}-{}", self.circuit_path);
        let digest = Sha256::digest(input.as_bytes());
        let proof = ProofArtifact::new(digest.to_vec());
        debug!(proof = %proof.short(), "Generated proof");
        Ok(proof)
    }

    fn verify_proof(&self, proof: &ProofArtifact) -> bool {
        proof.len() == DIGEST_LEN
    }
}

/// Settlement layer that accepts every correctly signed submission after a
/// fixed latency.
#[derive(Debug, Clone)]
pub struct SimulatedSettlement {
    latency: Duration,
    block_height: u64,
}

impl SimulatedSettlement {
    pub fn new(config: &SettlementConfig) -> Self {
        Self {
            latency: Duration::from_millis(config.latency_ms),
            block_height: config.block_height,
        }
    }
}

#[async_trait]
impl SettlementCapability for SimulatedSettlement {
    async fn submit(
        &self,
        route: &RouteQuote,
        intent: &TransferIntent,
        proof: Option<&ProofArtifact>,
        payload: &SignedPayload,
    ) -> Result<Settlement, SettlementError> {
        if !payload.verify() {
            return Err(SettlementError::Rejected("invalid payload signature".to_string()));
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let tx_hash = format!("0x{}", Uuid::new_v4().simple());
        debug!(
            reference_id = %intent.reference_id,
            agent = %route.agent_id,
            tx_hash = %tx_hash,
            with_proof = proof.is_some(),
            signature = %payload.signature,
            "Submitted to settlement"
        );
        Ok(Settlement {
            tx_hash,
            block_height: self.block_height,
            fee_used: route.estimated_fee.clone(),
        })
    }
}
