//! Scripted proof and settlement doubles for orchestrator tests.
//!
//! Each double counts its calls through a shared counter so a test can assert
//! that a stage was, or was not, reached after the double is moved into an
//! orchestrator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use relay_agents::test_support::{quote, ScriptedAgent};
use relay_agents::{AgentDiscovery, Negotiator};
use relay_models::config::OrchestratorConfig;
use relay_models::intent::{ChainId, IntentKind, TransferIntent};
use relay_models::proof::ProofArtifact;
use relay_models::quote::RouteQuote;
use rust_decimal::Decimal;

use crate::metrics::MetricsRecorder;
use crate::orchestrator::Orchestrator;
use crate::ports::{ProofCapability, ProofError, Settlement, SettlementCapability, SettlementError};
use crate::signer::{SignedPayload, Signer};

pub const RECIPIENT: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0";

/// A 5000.00 USDC transfer on base to [`RECIPIENT`].
pub fn transfer_intent(reference_id: &str) -> TransferIntent {
    TransferIntent::new(
        reference_id,
        IntentKind::Transfer,
        "5000.00",
        "USDC",
        ChainId::base(),
    )
    .with_recipient(RECIPIENT)
}

/// Signer over a fixed test seed.
pub fn test_signer() -> Arc<Signer> {
    Arc::new(Signer::from_seed("relay-test-signer").expect("fixed seed yields a valid key"))
}

/// Orchestrator with default config, one instant agent and accepting doubles.
pub fn accepting_orchestrator() -> Orchestrator {
    Orchestrator::new(
        OrchestratorConfig::default(),
        Negotiator::new(
            vec![Arc::new(ScriptedAgent::quoting(quote(
                "agent-001",
                Decimal::new(5, 2),
                15,
                0.98,
            ))) as Arc<dyn AgentDiscovery>],
            Duration::from_secs(1),
        ),
        Arc::new(ScriptedProver::valid()),
        Arc::new(ScriptedSettlement::accepting()),
        Arc::new(MetricsRecorder::new()),
        test_signer(),
    )
}

#[derive(Debug, Clone)]
enum ProverScript {
    Valid,
    Unverifiable,
    Fail,
}

pub struct ScriptedProver {
    script: ProverScript,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProver {
    fn scripted(script: ProverScript) -> Self {
        Self {
            script,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns a 32-byte proof that verifies.
    pub fn valid() -> Self {
        Self::scripted(ProverScript::Valid)
    }

    /// Returns a proof that fails verification.
    pub fn unverifiable() -> Self {
        Self::scripted(ProverScript::Unverifiable)
    }

    pub fn failing() -> Self {
        Self::scripted(ProverScript::Fail)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Counts `generate_proof` calls.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ProofCapability for ScriptedProver {
    async fn generate_proof(
        &self,
        _amount: &Decimal,
        _required_minimum: &Decimal,
    ) -> Result<ProofArtifact, ProofError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.script {
            ProverScript::Valid => Ok(ProofArtifact::new(vec![0xab; 32])),
            ProverScript::Unverifiable => Ok(ProofArtifact::new(vec![0xab; 4])),
            ProverScript::Fail => Err(ProofError::Generation("circuit unavailable".to_string())),
        }
    }

    fn verify_proof(&self, proof: &ProofArtifact) -> bool {
        proof.len() == 32
    }
}

#[derive(Debug, Clone)]
enum SettlementScript {
    Accept,
    Fail(SettlementError),
    Hang,
}

pub struct ScriptedSettlement {
    script: SettlementScript,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    proofs_seen: Arc<AtomicUsize>,
    payloads: Arc<Mutex<Vec<SignedPayload>>>,
}

impl ScriptedSettlement {
    fn scripted(script: SettlementScript) -> Self {
        Self {
            script,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            proofs_seen: Arc::new(AtomicUsize::new(0)),
            payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Accepts every submission, charging the route's quoted fee.
    pub fn accepting() -> Self {
        Self::scripted(SettlementScript::Accept)
    }

    pub fn failing(err: SettlementError) -> Self {
        Self::scripted(SettlementScript::Fail(err))
    }

    /// Never returns.
    pub fn hanging() -> Self {
        Self::scripted(SettlementScript::Hang)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Counts submissions that carried a proof.
    pub fn proof_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.proofs_seen)
    }

    /// Every signed payload submitted, in order.
    pub fn payload_log(&self) -> Arc<Mutex<Vec<SignedPayload>>> {
        Arc::clone(&self.payloads)
    }
}

#[async_trait]
impl SettlementCapability for ScriptedSettlement {
    async fn submit(
        &self,
        route: &RouteQuote,
        intent: &TransferIntent,
        proof: Option<&ProofArtifact>,
        payload: &SignedPayload,
    ) -> Result<Settlement, SettlementError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if proof.is_some() {
            self.proofs_seen.fetch_add(1, Ordering::SeqCst);
        }
        self.payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.script {
            SettlementScript::Accept => Ok(Settlement {
                tx_hash: format!("0x{}-{n}", intent.reference_id),
                block_height: 1_948_201,
                fee_used: route.estimated_fee.clone(),
            }),
            SettlementScript::Fail(err) => Err(err.clone()),
            SettlementScript::Hang => std::future::pending().await,
        }
    }
}
