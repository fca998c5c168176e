use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::policy::SelectionPolicy;

/// Top-level configuration for the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RelayConfig {
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub settlement: SettlementConfig,
    #[serde(default)]
    pub prover: ProverConfig,
}

/// Pipeline switches and the overall call budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrchestratorConfig {
    /// Generate a proof for shielded intents.
    #[serde(default = "default_true")]
    pub enable_proofs: bool,
    /// Memoize settled results by intent pattern.
    #[serde(default = "default_true")]
    pub enable_cache: bool,
    #[serde(default = "default_true")]
    pub enable_metrics: bool,
    /// Budget for a whole call, from validation to settlement.
    #[serde(default = "default_overall_timeout")]
    pub overall_timeout_ms: u64,
    #[serde(default)]
    pub selection_policy: SelectionPolicy,
    /// Minimum balance the solvency proof attests to.
    #[serde(default)]
    pub proof_required_minimum: Decimal,
}

impl OrchestratorConfig {
    pub fn overall_timeout(&self) -> Duration {
        Duration::from_millis(self.overall_timeout_ms)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            enable_proofs: true,
            enable_cache: true,
            enable_metrics: true,
            overall_timeout_ms: default_overall_timeout(),
            selection_policy: SelectionPolicy::default(),
            proof_required_minimum: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// How long a settled result stays reusable. Also the sweep period.
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    /// How long a generated proof stays reusable.
    #[serde(default = "default_proof_ttl")]
    pub proof_ttl_seconds: u64,
    #[serde(default = "default_proof_capacity")]
    pub proof_max_capacity: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn proof_ttl(&self) -> Duration {
        Duration::from_secs(self.proof_ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_cache_ttl(),
            proof_ttl_seconds: default_proof_ttl(),
            proof_max_capacity: default_proof_capacity(),
        }
    }
}

/// Agent network configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentsConfig {
    /// Upper bound for a single agent's quote. Never exceeds the call budget.
    #[serde(default = "default_per_agent_timeout")]
    pub per_agent_timeout_ms: u64,
    #[serde(default = "default_agent_sources")]
    pub agents: Vec<AgentSourceConfig>,
}

impl AgentsConfig {
    pub fn per_agent_timeout(&self) -> Duration {
        Duration::from_millis(self.per_agent_timeout_ms)
    }
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            per_agent_timeout_ms: default_per_agent_timeout(),
            agents: default_agent_sources(),
        }
    }
}

/// A simulated agent source and the quote it answers with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSourceConfig {
    pub agent_id: String,
    pub fee: Decimal,
    /// Fee currency. Falls back to the intent's asset when absent.
    #[serde(default)]
    pub currency: Option<String>,
    pub estimated_time_ms: u64,
    pub security_score: f64,
    /// Simulated response latency.
    #[serde(default = "default_agent_latency")]
    pub latency_ms: u64,
    /// Intermediate chains between source and target.
    #[serde(default)]
    pub via: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettlementConfig {
    #[serde(default = "default_settlement_latency")]
    pub latency_ms: u64,
    #[serde(default = "default_block_height")]
    pub block_height: u64,
    /// Seed the payload signing key is derived from.
    #[serde(default = "default_signing_seed")]
    pub signing_seed: String,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_settlement_latency(),
            block_height: default_block_height(),
            signing_seed: default_signing_seed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProverConfig {
    #[serde(default = "default_circuit_path")]
    pub circuit_path: String,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            circuit_path: default_circuit_path(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_overall_timeout() -> u64 {
    30_000
}
fn default_cache_ttl() -> u64 {
    60
}
fn default_proof_ttl() -> u64 {
    300
}
fn default_proof_capacity() -> u64 {
    1_000
}
fn default_per_agent_timeout() -> u64 {
    5_000
}
fn default_agent_latency() -> u64 {
    50
}
fn default_settlement_latency() -> u64 {
    100
}
fn default_block_height() -> u64 {
    1_948_201
}
fn default_signing_seed() -> String {
    "relay-settlement".to_string()
}
fn default_circuit_path() -> String {
    "./circuits/spend.wasm".to_string()
}
fn default_agent_sources() -> Vec<AgentSourceConfig> {
    vec![
        AgentSourceConfig {
            agent_id: "agent-001".to_string(),
            fee: Decimal::new(5, 2),
            currency: None,
            estimated_time_ms: 15_000,
            security_score: 0.98,
            latency_ms: default_agent_latency(),
            via: vec![],
            enabled: true,
        },
        AgentSourceConfig {
            agent_id: "agent-002".to_string(),
            fee: Decimal::new(3, 2),
            currency: None,
            estimated_time_ms: 30_000,
            security_score: 0.85,
            latency_ms: default_agent_latency(),
            via: vec!["polygon".to_string()],
            enabled: true,
        },
    ]
}
