use std::fmt;

use relay_models::intent::TransferIntent;

/// Cache key for a settled intent.
///
/// Built from the intent's economic shape only: kind, amount and asset. The
/// caller's reference id is left out, so two intents that differ
/// only by reference id share one cached result (pattern-level dedup). The
/// amount is used verbatim, so "5000" and "5000.00" are distinct patterns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_intent(intent: &TransferIntent) -> Self {
        Self(format!("{}-{}-{}", intent.kind, intent.amount, intent.asset))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_models::intent::{ChainId, IntentKind};

    fn intent(reference_id: &str, kind: IntentKind, amount: &str, asset: &str) -> TransferIntent {
        TransferIntent::new(reference_id, kind, amount, asset, ChainId::base())
    }

    #[test]
    fn key_format() {
        let key = CacheKey::for_intent(&intent("r1", IntentKind::Transfer, "5000.00", "USDC"));
        assert_eq!(key.as_str(), "transfer-5000.00-USDC");
    }

    #[test]
    fn reference_id_does_not_affect_key() {
        let a = CacheKey::for_intent(&intent("ref-a", IntentKind::Transfer, "10", "USDC"));
        let b = CacheKey::for_intent(
            &intent("ref-b", IntentKind::Transfer, "10", "USDC")
                .with_recipient("0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0")
                .shielded(),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn economic_shape_changes_key() {
        let base = CacheKey::for_intent(&intent("r", IntentKind::Transfer, "10", "USDC"));
        assert_ne!(
            base,
            CacheKey::for_intent(&intent("r", IntentKind::Swap, "10", "USDC"))
        );
        assert_ne!(
            base,
            CacheKey::for_intent(&intent("r", IntentKind::Transfer, "11", "USDC"))
        );
        assert_ne!(
            base,
            CacheKey::for_intent(&intent("r", IntentKind::Transfer, "10", "USDT"))
        );
    }
}
