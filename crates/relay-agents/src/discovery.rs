use async_trait::async_trait;
use relay_models::intent::TransferIntent;
use relay_models::quote::RouteQuote;

use crate::error::AgentError;

/// One relay agent that can quote a route for an intent. Mockable for testing.
///
/// The transport behind `discover` is up to the implementation; the negotiator
/// only bounds how long it may take.
#[async_trait]
pub trait AgentDiscovery: Send + Sync {
    fn agent_id(&self) -> &str;

    async fn discover(&self, intent: &TransferIntent) -> Result<RouteQuote, AgentError>;
}
