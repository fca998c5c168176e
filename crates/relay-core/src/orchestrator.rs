use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use relay_agents::Negotiator;
use relay_cache::{CacheKey, ProofCache, ResultCache};
use relay_models::config::OrchestratorConfig;
use relay_models::intent::TransferIntent;
use relay_models::proof::ProofArtifact;
use relay_models::quote::RouteQuote;
use relay_models::transaction::{TransactionResult, TxStatus};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ErrorKind, RelayError, Stage};
use crate::metrics::MetricsRecorder;
use crate::ports::{ProofCapability, ProofError, SettlementCapability};
use crate::signer::Signer;
use crate::validator::validate_intent;

/// Deadline and cancellation signal for one orchestration call.
#[derive(Debug, Clone)]
pub struct CallContext {
    deadline: Instant,
    cancel: CancellationToken,
}

impl CallContext {
    pub fn new(deadline: Instant, cancel: CancellationToken) -> Self {
        Self { deadline, cancel }
    }

    /// A context expiring `timeout` from now with a fresh cancellation token.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(Instant::now() + timeout, CancellationToken::new())
    }

    /// Race `fut` against cancellation and the deadline. Cancellation wins ties.
    async fn bound<F: Future>(&self, stage: Stage, fut: F) -> Result<F::Output, RelayError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(RelayError::cancelled(stage)),
            _ = tokio::time::sleep_until(self.deadline) => Err(RelayError::deadline(stage)),
            out = fut => Ok(out),
        }
    }
}

/// Where a call is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Validated,
    CacheChecked,
    ProofGenerated,
    ProofSkipped,
    QuotesCollected,
    RouteSelected,
    Settled,
    Recorded,
    Done,
    Failed(ErrorKind),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }

    /// Whether `next` is a legal transition from this state.
    pub fn can_advance_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        if self.is_terminal() {
            return false;
        }
        if matches!(next, Failed(_)) {
            return true;
        }
        matches!(
            (self, next),
            (Start, Validated)
                | (Validated, CacheChecked)
                | (CacheChecked, ProofGenerated | ProofSkipped | Recorded)
                | (ProofGenerated | ProofSkipped, QuotesCollected)
                | (QuotesCollected, RouteSelected)
                | (RouteSelected, Settled)
                | (Settled, Recorded)
                | (Recorded, Done)
        )
    }
}

/// Visited states of one call, in order.
struct Trace<'a> {
    reference_id: &'a str,
    states: Vec<PipelineState>,
}

impl<'a> Trace<'a> {
    fn new(reference_id: &'a str) -> Self {
        Self {
            reference_id,
            states: vec![PipelineState::Start],
        }
    }

    fn current(&self) -> PipelineState {
        self.states
            .last()
            .copied()
            .unwrap_or(PipelineState::Start)
    }

    fn advance(&mut self, next: PipelineState) {
        let from = self.current();
        debug_assert!(from.can_advance_to(next), "illegal transition {from:?} -> {next:?}");
        debug!(reference_id = %self.reference_id, ?from, to = ?next, "Pipeline transition");
        self.states.push(next);
    }
}

/// Outcome of one call together with how it got there.
#[derive(Debug)]
pub struct Execution {
    pub outcome: Result<TransactionResult, RelayError>,
    /// Every state visited, starting at `Start` and ending at a terminal state.
    pub states: Vec<PipelineState>,
    pub elapsed: Duration,
    pub cache_hit: bool,
}

impl Execution {
    pub fn final_state(&self) -> Option<PipelineState> {
        self.states.last().copied()
    }
}

enum Completed {
    Cached(TransactionResult),
    Settled {
        result: TransactionResult,
        key: Option<CacheKey>,
    },
}

/// Drives a transfer intent from validation to a recorded settlement.
pub struct Orchestrator {
    config: OrchestratorConfig,
    negotiator: Negotiator,
    prover: Arc<dyn ProofCapability>,
    settlement: Arc<dyn SettlementCapability>,
    metrics: Arc<MetricsRecorder>,
    signer: Arc<Signer>,
    cache: Option<Arc<ResultCache>>,
    proof_cache: Option<Arc<ProofCache>>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        negotiator: Negotiator,
        prover: Arc<dyn ProofCapability>,
        settlement: Arc<dyn SettlementCapability>,
        metrics: Arc<MetricsRecorder>,
        signer: Arc<Signer>,
    ) -> Self {
        Self {
            config,
            negotiator,
            prover,
            settlement,
            metrics,
            signer,
            cache: None,
            proof_cache: None,
        }
    }

    /// Attach a result cache. Consulted only while `enable_cache` is set.
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_proof_cache(mut self, cache: Arc<ProofCache>) -> Self {
        self.proof_cache = Some(cache);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn recorder(&self) -> &Arc<MetricsRecorder> {
        &self.metrics
    }

    /// Metrics as a flat map, or `{"metrics_disabled": true}` when turned off.
    pub fn metrics(&self) -> BTreeMap<String, Value> {
        if !self.config.enable_metrics {
            return BTreeMap::from([("metrics_disabled".to_string(), Value::Bool(true))]);
        }
        self.metrics.snapshot().to_map()
    }

    /// Execute `intent` within the configured overall timeout.
    pub async fn execute(&self, intent: &TransferIntent) -> Result<TransactionResult, RelayError> {
        self.run(intent, CallContext::with_timeout(self.config.overall_timeout()))
            .await
            .outcome
    }

    /// Execute `intent` under `ctx`, returning the outcome and the state trace.
    ///
    /// Metrics are recorded for every terminal state. The result cache is
    /// written only after a settlement succeeds.
    pub async fn run(&self, intent: &TransferIntent, ctx: CallContext) -> Execution {
        let start = Instant::now();
        let mut trace = Trace::new(&intent.reference_id);
        info!(
            reference_id = %intent.reference_id,
            kind = %intent.kind,
            amount = %intent.amount,
            asset = %intent.asset,
            shielded = intent.shielded,
            "Starting orchestration"
        );

        let driven = self.drive(intent, &ctx, &mut trace).await;
        let elapsed = start.elapsed();
        let mut cache_hit = false;

        let outcome = match driven {
            Ok(Completed::Cached(result)) => {
                cache_hit = true;
                if self.config.enable_metrics {
                    self.metrics.record_cache_hit(elapsed);
                }
                trace.advance(PipelineState::Recorded);
                Ok(result)
            }
            Ok(Completed::Settled { result, key }) => {
                if let (Some(cache), Some(key)) = (self.active_cache(), key) {
                    cache.set(key.as_str(), result.clone());
                }
                if self.config.enable_metrics {
                    self.metrics
                        .record_outcome(true, result.fee_used.amount, elapsed);
                }
                trace.advance(PipelineState::Recorded);
                Ok(result)
            }
            Err(err) => {
                if self.config.enable_metrics {
                    self.metrics.record_outcome(false, Decimal::ZERO, elapsed);
                }
                Err(err)
            }
        };

        match &outcome {
            Ok(result) => {
                trace.advance(PipelineState::Done);
                info!(
                    reference_id = %intent.reference_id,
                    tx_hash = %result.tx_hash,
                    fee = %result.fee_used,
                    cache_hit,
                    elapsed_ms = elapsed.as_millis(),
                    "Orchestration complete"
                );
            }
            Err(err) => {
                trace.advance(PipelineState::Failed(err.kind()));
                warn!(
                    reference_id = %intent.reference_id,
                    kind = %err.kind(),
                    stage = %err.stage(),
                    error = %err,
                    elapsed_ms = elapsed.as_millis(),
                    "Orchestration failed"
                );
            }
        }

        Execution {
            outcome,
            states: trace.states,
            elapsed,
            cache_hit,
        }
    }

    fn active_cache(&self) -> Option<&Arc<ResultCache>> {
        self.cache.as_ref().filter(|_| self.config.enable_cache)
    }

    async fn drive(
        &self,
        intent: &TransferIntent,
        ctx: &CallContext,
        trace: &mut Trace<'_>,
    ) -> Result<Completed, RelayError> {
        let amount = validate_intent(intent).map_err(RelayError::from_validation)?;
        trace.advance(PipelineState::Validated);

        let key = self.active_cache().map(|_| CacheKey::for_intent(intent));
        if let (Some(cache), Some(key)) = (self.active_cache(), &key) {
            if let Some(hit) = cache.get(key.as_str()) {
                trace.advance(PipelineState::CacheChecked);
                info!(reference_id = %intent.reference_id, %key, "Served from result cache");
                return Ok(Completed::Cached(hit));
            }
        }
        trace.advance(PipelineState::CacheChecked);

        let proof = if intent.shielded && self.config.enable_proofs {
            let proof = self.prove(&amount, ctx).await?;
            trace.advance(PipelineState::ProofGenerated);
            Some(proof)
        } else {
            trace.advance(PipelineState::ProofSkipped);
            None
        };

        let quotes = self
            .negotiator
            .collect_quotes(intent, ctx.deadline, &ctx.cancel)
            .await
            .map_err(|e| RelayError::from_negotiation(Stage::QuoteCollection, e))?;
        trace.advance(PipelineState::QuotesCollected);

        let route = self
            .negotiator
            .select_route(&quotes, &self.config.selection_policy)
            .map_err(|e| RelayError::from_negotiation(Stage::RouteSelection, e))?;
        trace.advance(PipelineState::RouteSelected);

        let result = self.settle(&route, intent, proof.as_ref(), ctx).await?;
        trace.advance(PipelineState::Settled);

        Ok(Completed::Settled { result, key })
    }

    async fn prove(&self, amount: &Decimal, ctx: &CallContext) -> Result<ProofArtifact, RelayError> {
        let minimum = &self.config.proof_required_minimum;

        let cached = match &self.proof_cache {
            Some(cache) => cache.get(amount, minimum).await,
            None => None,
        };
        let from_cache = cached.is_some();
        let proof = match cached {
            Some(proof) => proof,
            None => ctx
                .bound(Stage::Proof, self.prover.generate_proof(amount, minimum))
                .await?
                .map_err(RelayError::from_proof)?,
        };

        if !self.prover.verify_proof(&proof) {
            if let (Some(cache), true) = (&self.proof_cache, from_cache) {
                cache.invalidate(amount, minimum).await;
            }
            return Err(RelayError::from_proof(ProofError::Verification));
        }

        if let (Some(cache), false) = (&self.proof_cache, from_cache) {
            cache.insert(amount, minimum, proof.clone()).await;
        }
        debug!(proof = %proof.short(), from_cache, "Proof ready");
        Ok(proof)
    }

    async fn settle(
        &self,
        route: &RouteQuote,
        intent: &TransferIntent,
        proof: Option<&ProofArtifact>,
        ctx: &CallContext,
    ) -> Result<TransactionResult, RelayError> {
        let payload = self
            .signer
            .sign_settlement(route, intent, proof)
            .map_err(RelayError::from_signing)?;
        debug!(
            reference_id = %intent.reference_id,
            signature = %payload.signature,
            "Signed settlement payload"
        );

        let settlement = ctx
            .bound(
                Stage::Settlement,
                self.settlement.submit(route, intent, proof, &payload),
            )
            .await?
            .map_err(RelayError::from_settlement)?;

        Ok(TransactionResult {
            tx_hash: settlement.tx_hash,
            status: TxStatus::Confirmed,
            block_height: settlement.block_height,
            fee_used: settlement.fee_used,
        })
    }
}
