use std::sync::Arc;
use std::time::Duration;

use relay_models::intent::TransferIntent;
use relay_models::policy::SelectionPolicy;
use relay_models::quote::RouteQuote;
use rust_decimal::Decimal;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::discovery::AgentDiscovery;
use crate::error::{AgentError, NegotiationError};
use crate::selection::{score_quotes, select_route};

/// A quote with a negative fee counts as the agent declining.
fn screen_quote(agent: &str, quote: RouteQuote) -> Result<RouteQuote, AgentError> {
    if quote.estimated_fee.amount < Decimal::ZERO {
        return Err(AgentError::Declined {
            agent: agent.to_string(),
            reason: format!("negative fee {}", quote.estimated_fee),
        });
    }
    Ok(quote)
}

/// Collects competing quotes from every known agent and picks a route.
pub struct Negotiator {
    agents: Vec<Arc<dyn AgentDiscovery>>,
    per_agent_timeout: Duration,
}

impl Negotiator {
    pub fn new(agents: Vec<Arc<dyn AgentDiscovery>>, per_agent_timeout: Duration) -> Self {
        Self {
            agents,
            per_agent_timeout,
        }
    }

    /// Ask every agent for a quote in parallel.
    ///
    /// Returns once all agents have answered or `deadline` passes, whichever
    /// comes first, so the wait is the slowest agent's latency rather than the
    /// sum. Each agent gets `min(per_agent_timeout, time left)`. Agents still
    /// outstanding at the deadline are aborted and whatever arrived is returned.
    ///
    /// Quotes come back in agent registration order.
    pub async fn collect_quotes(
        &self,
        intent: &TransferIntent,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<Vec<RouteQuote>, NegotiationError> {
        let start = Instant::now();
        let attempted = self.agents.len();

        if attempted == 0 {
            warn!(reference_id = %intent.reference_id, "No agents registered");
            return Err(NegotiationError::AgentUnavailable {
                attempted,
                failures: vec![],
            });
        }

        let remaining = deadline.saturating_duration_since(start);
        if remaining.is_zero() {
            return Err(NegotiationError::Timeout { waited_ms: 0 });
        }
        let agent_timeout = self.per_agent_timeout.min(remaining);

        info!(
            reference_id = %intent.reference_id,
            agents = attempted,
            timeout_ms = agent_timeout.as_millis() as u64,
            "Requesting quotes"
        );

        // 1. Fan out, one task per agent
        let mut tasks = JoinSet::new();
        for (index, agent) in self.agents.iter().enumerate() {
            let agent = Arc::clone(agent);
            let intent = intent.clone();
            tasks.spawn(async move {
                let agent_start = Instant::now();
                let result = match tokio::time::timeout(agent_timeout, agent.discover(&intent)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(AgentError::Timeout {
                        agent: agent.agent_id().to_string(),
                        timeout_ms: agent_timeout.as_millis() as u64,
                    }),
                };
                let result = result.and_then(|quote| screen_quote(agent.agent_id(), quote));
                (
                    index,
                    agent.agent_id().to_string(),
                    result,
                    agent_start.elapsed(),
                )
            });
        }

        // 2. Collect until every task is done or the deadline passes
        let mut quotes: Vec<(usize, RouteQuote)> = Vec::new();
        let mut failures: Vec<AgentError> = Vec::new();
        let mut deadline_hit = false;

        let overall = tokio::time::sleep_until(deadline);
        tokio::pin!(overall);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    info!(reference_id = %intent.reference_id, "Quote collection cancelled");
                    return Err(NegotiationError::Cancelled);
                }
                _ = &mut overall => {
                    deadline_hit = true;
                    break;
                }
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok((index, agent_id, Ok(quote), elapsed))) => {
                        info!(agent = %agent_id, fee = %quote.estimated_fee, security = quote.security_score, elapsed_ms = elapsed.as_millis(), "Agent quoted");
                        quotes.push((index, quote));
                    }
                    Some(Ok((_, agent_id, Err(e), elapsed))) => {
                        warn!(agent = %agent_id, error = %e, elapsed_ms = elapsed.as_millis(), "Agent failed to quote");
                        failures.push(e);
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "Agent task panicked");
                        failures.push(AgentError::Task(e.to_string()));
                    }
                },
            }
        }

        if deadline_hit {
            warn!(
                outstanding = tasks.len(),
                received = quotes.len(),
                "Quote deadline reached, abandoning outstanding agents"
            );
            tasks.abort_all();
        }

        let waited_ms = start.elapsed().as_millis() as u64;

        if !quotes.is_empty() {
            quotes.sort_by_key(|(index, _)| *index);
            info!(
                received = quotes.len(),
                attempted,
                elapsed_ms = waited_ms,
                "Quote collection complete"
            );
            return Ok(quotes.into_iter().map(|(_, quote)| quote).collect());
        }

        let any_timed_out = failures
            .iter()
            .any(|f| matches!(f, AgentError::Timeout { .. }));
        if deadline_hit || any_timed_out {
            Err(NegotiationError::Timeout { waited_ms })
        } else {
            Err(NegotiationError::AgentUnavailable {
                attempted,
                failures,
            })
        }
    }

    /// Choose among `quotes` under `policy`, logging the ranking.
    pub fn select_route(
        &self,
        quotes: &[RouteQuote],
        policy: &SelectionPolicy,
    ) -> Result<RouteQuote, NegotiationError> {
        for scored in score_quotes(quotes, policy) {
            debug!(
                agent = %scored.quote.agent_id,
                policy = %policy,
                fee_score = scored.fee_score,
                time_score = scored.time_score,
                security_score = scored.security_score,
                total = scored.total,
                "Scored quote"
            );
        }
        let best = select_route(quotes, policy)?;
        info!(
            agent = %best.agent_id,
            fee = %best.estimated_fee,
            security = best.security_score,
            policy = %policy,
            "Selected route"
        );
        Ok(best)
    }
}
