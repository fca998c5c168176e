use std::fmt;

use serde::{Deserialize, Serialize};

/// Chains the relay knows how to route through.
pub const SUPPORTED_CHAINS: [&str; 3] = ["ethereum", "base", "solana"];

/// Classification of the requested operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Transfer,
    Swap,
    Shield,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Transfer => "transfer",
            IntentKind::Swap => "swap",
            IntentKind::Shield => "shield",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a blockchain network (e.g. "base").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn ethereum() -> Self {
        Self::new("ethereum")
    }

    pub fn base() -> Self {
        Self::new("base")
    }

    pub fn solana() -> Self {
        Self::new("solana")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_CHAINS.contains(&self.0.as_str())
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A caller's declarative request to move value.
///
/// The amount is kept as the caller's decimal string so no precision is lost
/// before validation. Orchestration only ever borrows an intent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferIntent {
    /// Caller-supplied identifier used for tracing.
    pub reference_id: String,
    pub kind: IntentKind,
    /// Positive decimal, e.g. "5000.00".
    pub amount: String,
    /// Asset symbol, e.g. "USDC".
    pub asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    pub source_chain: ChainId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_chain: Option<ChainId>,
    /// Privacy mode: a proof accompanies the settlement.
    #[serde(default)]
    pub shielded: bool,
}

impl TransferIntent {
    pub fn new(
        reference_id: impl Into<String>,
        kind: IntentKind,
        amount: impl Into<String>,
        asset: impl Into<String>,
        source_chain: ChainId,
    ) -> Self {
        Self {
            reference_id: reference_id.into(),
            kind,
            amount: amount.into(),
            asset: asset.into(),
            recipient: None,
            source_chain,
            target_chain: None,
            shielded: false,
        }
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_target_chain(mut self, chain: ChainId) -> Self {
        self.target_chain = Some(chain);
        self
    }

    pub fn shielded(mut self) -> Self {
        self.shielded = true;
        self
    }

    /// Chains the transfer touches: source, then target when it differs.
    pub fn endpoints(&self) -> Vec<ChainId> {
        let mut chains = vec![self.source_chain.clone()];
        if let Some(target) = &self.target_chain {
            if target != &self.source_chain {
                chains.push(target.clone());
            }
        }
        chains
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_json_uses_snake_case_kind() {
        let intent = TransferIntent::new(
            "ref_pay_salary_001",
            IntentKind::Transfer,
            "5000.00",
            "USDC",
            ChainId::base(),
        )
        .with_recipient("0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0")
        .shielded();

        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["kind"], "transfer");
        assert_eq!(json["source_chain"], "base");
        assert_eq!(json["amount"], "5000.00");
        assert!(json.get("target_chain").is_none());
    }

    #[test]
    fn minimal_intent_deserializes_with_defaults() {
        let json = r#"{
            "reference_id": "r1",
            "kind": "swap",
            "amount": "1.5",
            "asset": "ETH",
            "source_chain": "ethereum"
        }"#;
        let intent: TransferIntent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.kind, IntentKind::Swap);
        assert!(!intent.shielded);
        assert!(intent.recipient.is_none());
        assert!(intent.target_chain.is_none());
    }

    #[test]
    fn supported_chains() {
        assert!(ChainId::base().is_supported());
        assert!(ChainId::solana().is_supported());
        assert!(!ChainId::new("polygon").is_supported());
        assert!(!ChainId::new("").is_supported());
    }

    #[test]
    fn endpoints_skip_same_chain_target() {
        let same = TransferIntent::new("r", IntentKind::Transfer, "1", "USDC", ChainId::base())
            .with_target_chain(ChainId::base());
        assert_eq!(same.endpoints(), vec![ChainId::base()]);

        let cross = TransferIntent::new("r", IntentKind::Transfer, "1", "USDC", ChainId::base())
            .with_target_chain(ChainId::solana());
        assert_eq!(cross.endpoints(), vec![ChainId::base(), ChainId::solana()]);
    }
}
