//! Structural and semantic checks on a transfer intent.
//!
//! Rules run in a fixed order and the first failure wins: amount, source
//! chain, target chain, recipient.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use relay_models::intent::{ChainId, TransferIntent};
use rust_decimal::Decimal;
use thiserror::Error;

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("address pattern is valid"));
static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("amount pattern is valid"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("amount: invalid amount format: {0}")]
    AmountFormat(String),

    #[error("amount: must be positive, got {0}")]
    AmountNotPositive(String),

    #[error("{field}: unsupported chain: {chain}")]
    UnsupportedChain { field: &'static str, chain: String },

    #[error("recipient: invalid address format: {0}")]
    Address(String),
}

/// Parse a positive decimal amount. Exponents, signs and separators are rejected.
pub fn validate_amount(amount: &str) -> Result<Decimal, ValidationError> {
    if !AMOUNT_RE.is_match(amount) {
        return Err(ValidationError::AmountFormat(amount.to_string()));
    }
    // Grammar matched but the value may still overflow 96-bit precision
    let value = Decimal::from_str(amount)
        .map_err(|e| ValidationError::AmountFormat(format!("{amount} ({e})")))?;
    if value <= Decimal::ZERO {
        return Err(ValidationError::AmountNotPositive(amount.to_string()));
    }
    Ok(value)
}

pub fn validate_chain(chain: &ChainId, field: &'static str) -> Result<(), ValidationError> {
    if !chain.is_supported() {
        return Err(ValidationError::UnsupportedChain {
            field,
            chain: chain.to_string(),
        });
    }
    Ok(())
}

/// `0x` followed by 40 hex digits, any case.
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if !ADDRESS_RE.is_match(address) {
        return Err(ValidationError::Address(address.to_string()));
    }
    Ok(())
}

/// Validate an intent, returning its parsed amount.
pub fn validate_intent(intent: &TransferIntent) -> Result<Decimal, ValidationError> {
    let amount = validate_amount(&intent.amount)?;
    validate_chain(&intent.source_chain, "source_chain")?;
    if let Some(target) = &intent.target_chain {
        validate_chain(target, "target_chain")?;
    }
    if let Some(recipient) = &intent.recipient {
        validate_address(recipient)?;
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_models::intent::IntentKind;
    use rust_decimal_macros::dec;

    const VALID_ADDRESS: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0";

    fn intent(amount: &str) -> TransferIntent {
        TransferIntent::new("ref", IntentKind::Transfer, amount, "USDC", ChainId::base())
    }

    #[test]
    fn addresses() {
        let cases = [
            ("valid address", VALID_ADDRESS, true),
            ("lowercase", "0x742d35cc6634c0532925a3b844bc9e7595f0beb0", true),
            ("39 digits", "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb", false),
            ("invalid prefix", "742d35Cc6634C0532925a3b844Bc9e7595f0bEb0", false),
            ("invalid length", "0x742d35Cc", false),
            ("invalid chars", "0xZZZZ35Cc6634C0532925a3b844Bc9e7595f0bEb", false),
            ("empty", "", false),
        ];
        for (name, address, ok) in cases {
            assert_eq!(validate_address(address).is_ok(), ok, "{name}");
        }
    }

    #[test]
    fn amounts() {
        assert_eq!(validate_amount("100"), Ok(dec!(100)));
        assert_eq!(validate_amount("100.50"), Ok(dec!(100.50)));
        assert_eq!(validate_amount("0.000001"), Ok(dec!(0.000001)));

        assert!(matches!(
            validate_amount("0"),
            Err(ValidationError::AmountNotPositive(_))
        ));
        assert!(matches!(
            validate_amount("0.00"),
            Err(ValidationError::AmountNotPositive(_))
        ));
        for bad in ["-100", "abc", "", "1.", ".5", "1e5", "1,000", " 1"] {
            assert!(
                matches!(validate_amount(bad), Err(ValidationError::AmountFormat(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn amount_beyond_decimal_range_is_format_error() {
        let huge = "9".repeat(40);
        assert!(matches!(
            validate_amount(&huge),
            Err(ValidationError::AmountFormat(_))
        ));
    }

    #[test]
    fn chains() {
        assert!(validate_chain(&ChainId::base(), "source_chain").is_ok());
        assert!(validate_chain(&ChainId::ethereum(), "source_chain").is_ok());
        assert_eq!(
            validate_chain(&ChainId::new("invalid"), "source_chain"),
            Err(ValidationError::UnsupportedChain {
                field: "source_chain",
                chain: "invalid".to_string()
            })
        );
    }

    #[test]
    fn full_intent_passes() {
        let intent = intent("5000.00")
            .with_recipient(VALID_ADDRESS)
            .with_target_chain(ChainId::solana())
            .shielded();
        assert_eq!(validate_intent(&intent), Ok(dec!(5000.00)));
    }

    #[test]
    fn first_failure_wins() {
        // Bad amount and bad chain: the amount is reported.
        let mut both = intent("0");
        both.source_chain = ChainId::new("nowhere");
        assert!(matches!(
            validate_intent(&both),
            Err(ValidationError::AmountNotPositive(_))
        ));

        let bad_target = intent("1").with_target_chain(ChainId::new("polygon"));
        let err = validate_intent(&bad_target).unwrap_err();
        assert_eq!(err.to_string(), "target_chain: unsupported chain: polygon");

        let bad_recipient = intent("1").with_recipient("0xZZZZ");
        assert!(matches!(
            validate_intent(&bad_recipient),
            Err(ValidationError::Address(_))
        ));
    }
}
