use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::intent::ChainId;

/// A fee amount in a given currency. Never a float.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Fee {
    pub amount: Decimal,
    pub currency: String,
}

impl Fee {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Fee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// An agent's non-binding offer for executing an intent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteQuote {
    pub agent_id: String,
    pub estimated_fee: Fee,
    #[serde(rename = "estimated_time_ms", with = "crate::serde_duration")]
    pub estimated_time: Duration,
    /// Ordered chain hops, source first.
    pub route: Vec<ChainId>,
    /// 0.0 to 1.0, higher is safer.
    pub security_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn roundtrip_route_quote() {
        let quote = RouteQuote {
            agent_id: "agent-001".to_string(),
            estimated_fee: Fee::new(dec!(0.05), "USDC"),
            estimated_time: Duration::from_secs(15),
            route: vec![ChainId::base(), ChainId::ethereum()],
            security_score: 0.98,
        };

        let json = serde_json::to_string(&quote).unwrap();
        assert!(json.contains(r#""estimated_time_ms":15000"#));
        assert!(json.contains(r#""amount":"0.05""#));

        let deserialized: RouteQuote = serde_json::from_str(&json).unwrap();
        assert_eq!(quote, deserialized);
    }

    #[test]
    fn fee_display() {
        assert_eq!(Fee::new(dec!(0.03), "USDC").to_string(), "0.03 USDC");
    }
}
