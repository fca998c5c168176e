//! Integration tests for concurrent quote collection and route selection.
//!
//! Agents are scripted with artificial delays so wall-clock behavior of the
//! fan-out can be checked end to end.

use std::sync::Arc;
use std::time::{Duration, Instant as StdInstant};

use relay_agents::test_support::{quote, ScriptedAgent};
use relay_agents::{AgentDiscovery, NegotiationError, Negotiator, SimulatedAgent};
use relay_models::config::AgentsConfig;
use relay_models::intent::{ChainId, IntentKind, TransferIntent};
use relay_models::policy::SelectionPolicy;
use rust_decimal_macros::dec;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn shielded_transfer() -> TransferIntent {
    TransferIntent::new(
        "ref_pay_salary_001",
        IntentKind::Transfer,
        "5000.00",
        "USDC",
        ChainId::base(),
    )
    .with_recipient("0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0")
    .shielded()
}

/// Agents answering after 50ms and 200ms: total wait tracks the slower one, not the sum.
#[tokio::test]
async fn wait_is_max_not_sum_of_agent_latencies() {
    let negotiator = Negotiator::new(
        vec![
            Arc::new(
                ScriptedAgent::quoting(quote("agent-a", dec!(0.05), 15, 0.98))
                    .with_delay(Duration::from_millis(50)),
            ) as Arc<dyn AgentDiscovery>,
            Arc::new(
                ScriptedAgent::quoting(quote("agent-b", dec!(0.03), 30, 0.85))
                    .with_delay(Duration::from_millis(200)),
            ),
        ],
        Duration::from_secs(2),
    );

    let start = StdInstant::now();
    let quotes = negotiator
        .collect_quotes(
            &shielded_transfer(),
            Instant::now() + Duration::from_secs(2),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(quotes.len(), 2);
    assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(245), "elapsed {elapsed:?}");
}

/// A slow agent past the deadline does not hold up the fast one's quote.
#[tokio::test]
async fn slow_agent_is_abandoned_at_deadline() {
    let negotiator = Negotiator::new(
        vec![
            Arc::new(
                ScriptedAgent::quoting(quote("fast", dec!(0.05), 15, 0.98))
                    .with_delay(Duration::from_millis(10)),
            ) as Arc<dyn AgentDiscovery>,
            Arc::new(
                ScriptedAgent::quoting(quote("glacial", dec!(0.01), 30, 0.99))
                    .with_delay(Duration::from_secs(5)),
            ),
        ],
        Duration::from_secs(10),
    );

    let start = StdInstant::now();
    let quotes = negotiator
        .collect_quotes(
            &shielded_transfer(),
            Instant::now() + Duration::from_millis(100),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(start.elapsed() < Duration::from_millis(500));
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].agent_id, "fast");
}

/// The documented two-agent scenario under each named policy.
#[tokio::test]
async fn default_simulated_agents_under_policies() {
    let agents: Vec<Arc<dyn AgentDiscovery>> = AgentsConfig::default()
        .agents
        .into_iter()
        .map(|c| Arc::new(SimulatedAgent::new(c)) as Arc<dyn AgentDiscovery>)
        .collect();
    let negotiator = Negotiator::new(agents, Duration::from_secs(1));

    let quotes = negotiator
        .collect_quotes(
            &shielded_transfer(),
            Instant::now() + Duration::from_secs(1),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(quotes.len(), 2);

    let safest = negotiator
        .select_route(&quotes, &SelectionPolicy::Safest)
        .unwrap();
    assert_eq!(safest.agent_id, "agent-001");

    let cheapest = negotiator
        .select_route(&quotes, &SelectionPolicy::Cheapest)
        .unwrap();
    assert_eq!(cheapest.agent_id, "agent-002");
    assert_eq!(
        cheapest.route,
        vec![ChainId::base(), ChainId::new("polygon"), ChainId::base()]
    );
}

#[tokio::test]
async fn every_agent_asked_exactly_once() {
    let agents: Vec<ScriptedAgent> = (0..5)
        .map(|i| ScriptedAgent::quoting(quote(&format!("agent-{i}"), dec!(0.01), 10, 0.9)))
        .collect();
    let counters: Vec<_> = agents.iter().map(|a| a.call_counter()).collect();
    let negotiator = Negotiator::new(
        agents
            .into_iter()
            .map(|a| Arc::new(a) as Arc<dyn AgentDiscovery>)
            .collect(),
        Duration::from_secs(1),
    );

    let quotes = negotiator
        .collect_quotes(
            &shielded_transfer(),
            Instant::now() + Duration::from_secs(1),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(quotes.len(), 5);
    for counter in counters {
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    assert_eq!(
        negotiator.select_route(&[], &SelectionPolicy::Fastest),
        Err(NegotiationError::NoQuotesAvailable)
    );
}
