//! Multi-criteria route selection.
//!
//! Each quote gets `w_fee * fee + w_time * time + w_security * security`.
//! Fee and time are normalized inversely against the quote set:
//! `(max - x) / (max - min)`, so the cheapest/fastest quote scores 1.0 and the
//! most expensive/slowest 0.0. When every quote has the same value on a
//! dimension (`max == min`) all of them score 1.0 there.

use std::cmp::Ordering;

use relay_models::policy::SelectionPolicy;
use relay_models::quote::RouteQuote;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::NegotiationError;

/// Totals closer than this count as a tie.
const SCORE_RESOLUTION: f64 = 1e-9;

/// A quote with its sub-scores under a policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredQuote<'a> {
    pub quote: &'a RouteQuote,
    pub fee_score: f64,
    pub time_score: f64,
    /// The quote's own security score, clamped to [0, 1].
    pub security_score: f64,
    pub total: f64,
}

impl ScoredQuote<'_> {
    fn total_bucket(&self) -> i64 {
        (self.total / SCORE_RESOLUTION).round() as i64
    }
}

/// Exact when the spread fits in a `Decimal`, floating point otherwise.
fn normalize_fee(value: Decimal, min: Decimal, max: Decimal) -> f64 {
    if max == min {
        return 1.0;
    }
    let exact = max
        .checked_sub(value)
        .zip(max.checked_sub(min))
        .and_then(|(num, den)| num.checked_div(den));
    match exact {
        Some(ratio) => ratio.to_f64().unwrap_or(0.0),
        None => normalize_inverse(as_f64(value), as_f64(min), as_f64(max)),
    }
}

fn as_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn normalize_inverse(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 1.0;
    }
    (max - value) / (max - min)
}

/// Score every quote under `policy`, in input order.
pub fn score_quotes<'a>(quotes: &'a [RouteQuote], policy: &SelectionPolicy) -> Vec<ScoredQuote<'a>> {
    let Some(first) = quotes.first() else {
        return Vec::new();
    };

    let weights = policy.weights();

    let (mut fee_min, mut fee_max) = (first.estimated_fee.amount, first.estimated_fee.amount);
    let first_time = first.estimated_time.as_secs_f64();
    let (mut time_min, mut time_max) = (first_time, first_time);
    for quote in quotes {
        fee_min = fee_min.min(quote.estimated_fee.amount);
        fee_max = fee_max.max(quote.estimated_fee.amount);
        let time = quote.estimated_time.as_secs_f64();
        time_min = time_min.min(time);
        time_max = time_max.max(time);
    }

    quotes
        .iter()
        .map(|quote| {
            let fee_score = normalize_fee(quote.estimated_fee.amount, fee_min, fee_max);
            let time_score =
                normalize_inverse(quote.estimated_time.as_secs_f64(), time_min, time_max);
            let security_score = if quote.security_score.is_nan() {
                0.0
            } else {
                quote.security_score.clamp(0.0, 1.0)
            };
            let total = weights.fee() * fee_score
                + weights.time() * time_score
                + weights.security() * security_score;
            ScoredQuote {
                quote,
                fee_score,
                time_score,
                security_score,
                total,
            }
        })
        .collect()
}

/// `Less` means `a` is the better route.
fn rank(a: &ScoredQuote<'_>, b: &ScoredQuote<'_>) -> Ordering {
    b.total_bucket()
        .cmp(&a.total_bucket())
        .then_with(|| b.security_score.total_cmp(&a.security_score))
        .then_with(|| a.quote.agent_id.cmp(&b.quote.agent_id))
}

/// Pick the best quote under `policy`.
///
/// Ties on the composite score go to the higher security score, then to the
/// lexicographically smaller agent id, so the choice never depends on the
/// order quotes arrived in.
pub fn select_route(
    quotes: &[RouteQuote],
    policy: &SelectionPolicy,
) -> Result<RouteQuote, NegotiationError> {
    score_quotes(quotes, policy)
        .into_iter()
        .min_by(rank)
        .map(|best| best.quote.clone())
        .ok_or(NegotiationError::NoQuotesAvailable)
}
