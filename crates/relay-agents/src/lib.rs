pub mod discovery;
pub mod error;
pub mod negotiator;
pub mod selection;
pub mod simulated;

pub mod test_support;

pub use discovery::AgentDiscovery;
pub use error::{AgentError, NegotiationError};
pub use negotiator::Negotiator;
pub use selection::{score_quotes, select_route, ScoredQuote};
pub use simulated::SimulatedAgent;
