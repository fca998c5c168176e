//! Test support module providing scripted agents.
//!
//! `ScriptedAgent` answers with a canned quote, a failure, or never answers,
//! after an optional delay, and counts how often it was asked. Used by the
//! negotiation and orchestrator tests to inject slow, failing and silent agents.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use relay_models::intent::{ChainId, TransferIntent};
use relay_models::quote::{Fee, RouteQuote};
use rust_decimal::Decimal;

use crate::discovery::AgentDiscovery;
use crate::error::AgentError;

/// Build a quote with a USDC fee over a base→ethereum route.
pub fn quote(agent_id: &str, fee: Decimal, estimated_secs: u64, security_score: f64) -> RouteQuote {
    RouteQuote {
        agent_id: agent_id.to_string(),
        estimated_fee: Fee::new(fee, "USDC"),
        estimated_time: Duration::from_secs(estimated_secs),
        route: vec![ChainId::base(), ChainId::ethereum()],
        security_score,
    }
}

#[derive(Debug, Clone)]
enum Script {
    Quote(RouteQuote),
    Fail(String),
    Hang,
}

/// An agent with scripted behavior.
pub struct ScriptedAgent {
    agent_id: String,
    delay: Duration,
    script: Script,
    calls: Arc<AtomicUsize>,
}

impl ScriptedAgent {
    /// Answers with `quote` (agent id taken from the quote).
    pub fn quoting(quote: RouteQuote) -> Self {
        Self {
            agent_id: quote.agent_id.clone(),
            delay: Duration::ZERO,
            script: Script::Quote(quote),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(agent_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            delay: Duration::ZERO,
            script: Script::Fail("scripted failure".to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Never answers; only a timeout or cancellation ends the request.
    pub fn hanging(agent_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            delay: Duration::ZERO,
            script: Script::Hang,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared call counter, readable after the agent is moved into a negotiator.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentDiscovery for ScriptedAgent {
    fn agent_id(&self) -> &str {
        &self.agent_id
    }

    async fn discover(&self, _intent: &TransferIntent) -> Result<RouteQuote, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.script {
            Script::Quote(quote) => Ok(quote.clone()),
            Script::Fail(reason) => Err(AgentError::Unreachable {
                agent: self.agent_id.clone(),
                reason: reason.clone(),
            }),
            Script::Hang => std::future::pending().await,
        }
    }
}
