use serde::{Deserialize, Serialize};

use crate::quote::Fee;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Confirmed,
    Failed,
}

/// Outcome of a settled intent. Returned unchanged on cache hits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionResult {
    pub tx_hash: String,
    pub status: TxStatus,
    pub block_height: u64,
    pub fee_used: Fee,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn roundtrip_transaction_result() {
        let result = TransactionResult {
            tx_hash: "0xabc".to_string(),
            status: TxStatus::Confirmed,
            block_height: 1_948_201,
            fee_used: Fee::new(dec!(0.05), "USDC"),
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""status":"confirmed""#));
        let deserialized: TransactionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, deserialized);
    }
}
