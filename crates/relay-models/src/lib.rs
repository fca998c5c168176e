pub mod config;
pub mod intent;
pub mod policy;
pub mod proof;
pub mod quote;
pub mod serde_duration;
pub mod transaction;

pub use config::{
    AgentSourceConfig, AgentsConfig, CacheConfig, OrchestratorConfig, ProverConfig, RelayConfig,
    SettlementConfig,
};
pub use intent::{ChainId, IntentKind, TransferIntent, SUPPORTED_CHAINS};
pub use policy::{PolicyError, SelectionPolicy, Weights};
pub use proof::ProofArtifact;
pub use quote::{Fee, RouteQuote};
pub use transaction::{TransactionResult, TxStatus};
