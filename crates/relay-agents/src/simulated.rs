use std::time::Duration;

use async_trait::async_trait;
use relay_models::config::AgentSourceConfig;
use relay_models::intent::{ChainId, TransferIntent};
use relay_models::quote::{Fee, RouteQuote};
use tracing::debug;

use crate::discovery::AgentDiscovery;
use crate::error::AgentError;

/// An agent that answers every intent with a fixed quote after a fixed latency.
///
/// Stands in for a networked agent in the CLI and in end-to-end tests.
#[derive(Debug, Clone)]
pub struct SimulatedAgent {
    config: AgentSourceConfig,
}

impl SimulatedAgent {
    pub fn new(config: AgentSourceConfig) -> Self {
        Self { config }
    }

    fn route_for(&self, intent: &TransferIntent) -> Vec<ChainId> {
        let mut route = vec![intent.source_chain.clone()];
        route.extend(self.config.via.iter().map(|c| ChainId::new(c.as_str())));
        route.push(
            intent
                .target_chain
                .clone()
                .unwrap_or_else(|| intent.source_chain.clone()),
        );
        route
    }
}

#[async_trait]
impl AgentDiscovery for SimulatedAgent {
    fn agent_id(&self) -> &str {
        &self.config.agent_id
    }

    async fn discover(&self, intent: &TransferIntent) -> Result<RouteQuote, AgentError> {
        debug!(agent = %self.config.agent_id, latency_ms = self.config.latency_ms, "Simulating quote request");
        tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;

        let currency = self
            .config
            .currency
            .clone()
            .unwrap_or_else(|| intent.asset.clone());

        Ok(RouteQuote {
            agent_id: self.config.agent_id.clone(),
            estimated_fee: Fee::new(self.config.fee, currency),
            estimated_time: Duration::from_millis(self.config.estimated_time_ms),
            route: self.route_for(intent),
            security_score: self.config.security_score,
        })
    }
}
