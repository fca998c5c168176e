//! Intent relay: turns a declarative transfer intent into a settled transaction.
//!
//! Validates the intent, reuses a cached result for the same transfer
//! pattern when one is live, proves solvency for shielded transfers, asks
//! every relay agent for a quote in parallel, picks a route by policy and
//! hands it to the settlement layer.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use relay::models::{RelayConfig, TransferIntent, IntentKind, ChainId};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let runtime = relay::build_orchestrator(&RelayConfig::default())?;
//! let intent = TransferIntent::new("ref-001", IntentKind::Transfer, "5000.00", "USDC", ChainId::base());
//! let result = runtime.orchestrator.execute(&intent).await?;
//! println!("{}", result.tx_hash);
//! runtime.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub use relay_agents as agents;
pub use relay_cache as cache;
pub use relay_core as pipeline;
pub use relay_models as models;

use std::sync::Arc;

use anyhow::Context;
use relay_agents::{AgentDiscovery, Negotiator, SimulatedAgent};
use relay_cache::{ProofCache, ResultCache};
use relay_core::{MetricsRecorder, Orchestrator, Signer, SimulatedProver, SimulatedSettlement};
use relay_models::config::RelayConfig;
use tracing::info;

/// An orchestrator together with the caches whose lifetimes it depends on.
pub struct Relay {
    pub orchestrator: Orchestrator,
    pub result_cache: Option<Arc<ResultCache>>,
}

impl Relay {
    /// Stop the result cache's sweep task.
    pub async fn shutdown(&self) {
        if let Some(cache) = &self.result_cache {
            cache.shutdown().await;
        }
    }
}

/// Build an orchestrator over the simulated prover, agents and settlement layer.
///
/// Settlement payloads are signed with a key derived from
/// `settlement.signing_seed`.
///
/// Must be called inside a tokio runtime when caching is enabled, since the
/// result cache starts its sweep task here.
pub fn build_orchestrator(config: &RelayConfig) -> Result<Relay, anyhow::Error> {
    let agents: Vec<Arc<dyn AgentDiscovery>> = config
        .agents
        .agents
        .iter()
        .filter(|a| a.enabled)
        .map(|a| Arc::new(SimulatedAgent::new(a.clone())) as Arc<dyn AgentDiscovery>)
        .collect();
    let negotiator = Negotiator::new(agents, config.agents.per_agent_timeout());
    let signer = Signer::from_seed(&config.settlement.signing_seed)
        .context("Failed to derive settlement signing key")?;

    let mut orchestrator = Orchestrator::new(
        config.orchestrator.clone(),
        negotiator,
        Arc::new(SimulatedProver::new(&config.prover)),
        Arc::new(SimulatedSettlement::new(&config.settlement)),
        Arc::new(MetricsRecorder::new()),
        Arc::new(signer),
    );

    let result_cache = if config.orchestrator.enable_cache {
        let cache = Arc::new(ResultCache::with_sweeper(config.cache.ttl())?);
        orchestrator = orchestrator.with_cache(Arc::clone(&cache));
        Some(cache)
    } else {
        None
    };

    if config.orchestrator.enable_proofs {
        orchestrator = orchestrator.with_proof_cache(Arc::new(ProofCache::new(
            config.cache.proof_max_capacity,
            config.cache.proof_ttl(),
        )));
    }

    info!(
        agents = config.agents.agents.iter().filter(|a| a.enabled).count(),
        policy = %config.orchestrator.selection_policy,
        cache = config.orchestrator.enable_cache,
        proofs = config.orchestrator.enable_proofs,
        "Relay ready"
    );

    Ok(Relay {
        orchestrator,
        result_cache,
    })
}
