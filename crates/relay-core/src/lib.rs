pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod ports;
pub mod signer;
pub mod simulated;
pub mod validator;

pub mod test_support;

pub use error::{ErrorKind, RelayError, Stage};
pub use metrics::{MetricsRecorder, MetricsSnapshot};
pub use orchestrator::{CallContext, Execution, Orchestrator, PipelineState};
pub use ports::{
    ProofCapability, ProofError, Settlement, SettlementCapability, SettlementError,
};
pub use signer::{verify_signature, SignedPayload, Signer, SignerError};
pub use simulated::{SimulatedProver, SimulatedSettlement};
pub use validator::{validate_intent, ValidationError};
