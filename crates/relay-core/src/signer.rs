//! ECDSA P-256 signing of settlement payloads.
//!
//! Messages are hashed with SHA-256 before signing. Signatures travel as
//! `0x`-prefixed hex of the 64-byte `r || s` encoding, public keys as hex of
//! the compressed SEC1 point.

use p256::ecdsa::signature::{Signer as _, Verifier as _};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use relay_models::intent::TransferIntent;
use relay_models::proof::ProofArtifact;
use relay_models::quote::RouteQuote;
use serde_json::json;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("Signing key error: {0}")]
    Key(String),

    #[error("Signing error: {0}")]
    Signing(String),
}

/// Holds the private key settlement payloads are signed with.
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    /// A signer over a raw 32-byte secret scalar.
    pub fn from_bytes(secret: &[u8]) -> Result<Self, SignerError> {
        let key = SigningKey::from_slice(secret).map_err(|e| SignerError::Key(e.to_string()))?;
        Ok(Self { key })
    }

    /// A signer whose secret is SHA-256 of `seed`.
    pub fn from_seed(seed: &str) -> Result<Self, SignerError> {
        if seed.is_empty() {
            return Err(SignerError::Key("empty signing seed".to_string()));
        }
        Self::from_bytes(&Sha256::digest(seed.as_bytes()))
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.key.verifying_key()
    }

    /// Compressed SEC1 public key as hex.
    pub fn public_key_hex(&self) -> String {
        encode_public_key(self.verifying_key())
    }

    /// Sign `message`, returning `0x`-prefixed hex of `r || s`.
    pub fn sign_message(&self, message: &[u8]) -> Result<String, SignerError> {
        let signature: Signature = self
            .key
            .try_sign(message)
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        Ok(format!("0x{}", hex::encode(signature.to_bytes())))
    }

    /// Sign the canonical settlement message for a route.
    pub fn sign_settlement(
        &self,
        route: &RouteQuote,
        intent: &TransferIntent,
        proof: Option<&ProofArtifact>,
    ) -> Result<SignedPayload, SignerError> {
        let message = settlement_message(route, intent, proof);
        let signature = self.sign_message(&message)?;
        Ok(SignedPayload {
            message,
            signature,
            public_key: self.public_key_hex(),
        })
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

/// Whether `signature` is a valid signature by `key` over `message`.
///
/// Malformed hex, a missing `0x` prefix or a wrong length all count as invalid.
pub fn verify_signature(key: &VerifyingKey, message: &[u8], signature: &str) -> bool {
    let Some(digits) = signature.strip_prefix("0x") else {
        return false;
    };
    let Ok(bytes) = hex::decode(digits) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(&bytes) else {
        return false;
    };
    key.verify(message, &signature).is_ok()
}

fn encode_public_key(key: &VerifyingKey) -> String {
    hex::encode(key.to_encoded_point(true).as_bytes())
}

/// Canonical bytes a settlement submission is signed over.
pub fn settlement_message(
    route: &RouteQuote,
    intent: &TransferIntent,
    proof: Option<&ProofArtifact>,
) -> Vec<u8> {
    let hops: Vec<&str> = route.route.iter().map(|c| c.as_str()).collect();
    json!({
        "reference_id": intent.reference_id,
        "amount": intent.amount,
        "asset": intent.asset,
        "recipient": intent.recipient,
        "agent_id": route.agent_id,
        "fee": route.estimated_fee.amount.to_string(),
        "currency": route.estimated_fee.currency,
        "route": hops,
        "proof": proof.map(ProofArtifact::to_hex),
    })
    .to_string()
    .into_bytes()
}

/// A settlement message together with its signature and the signer's key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    pub message: Vec<u8>,
    pub signature: String,
    pub public_key: String,
}

impl SignedPayload {
    /// Check the signature against the embedded public key.
    pub fn verify(&self) -> bool {
        let Ok(bytes) = hex::decode(&self.public_key) else {
            return false;
        };
        match VerifyingKey::from_sec1_bytes(&bytes) {
            Ok(key) => verify_signature(&key, &self.message, &self.signature),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_models::intent::{ChainId, IntentKind};
    use relay_models::quote::Fee;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn signer() -> Signer {
        Signer::from_seed("unit-test").unwrap()
    }

    fn route() -> RouteQuote {
        RouteQuote {
            agent_id: "agent-001".to_string(),
            estimated_fee: Fee::new(dec!(0.05), "USDC"),
            estimated_time: Duration::from_secs(15),
            route: vec![ChainId::base(), ChainId::base()],
            security_score: 0.98,
        }
    }

    #[test]
    fn signature_round_trip() {
        let signer = signer();
        let signature = signer.sign_message(b"transfer 5000 USDC").unwrap();

        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 2 + 128);
        assert!(verify_signature(
            signer.verifying_key(),
            b"transfer 5000 USDC",
            &signature
        ));
    }

    #[test]
    fn tampered_message_fails_verification() {
        let signer = signer();
        let signature = signer.sign_message(b"transfer 5000 USDC").unwrap();
        assert!(!verify_signature(
            signer.verifying_key(),
            b"transfer 9000 USDC",
            &signature
        ));
    }

    #[test]
    fn tampered_signature_fails_verification() {
        let signer = signer();
        let signature = signer.sign_message(b"payload").unwrap();
        let mut bytes = hex::decode(&signature[2..]).unwrap();
        bytes[10] ^= 0x01;
        let tampered = format!("0x{}", hex::encode(bytes));

        assert!(!verify_signature(signer.verifying_key(), b"payload", &tampered));
    }

    #[test]
    fn malformed_signatures_are_rejected() {
        let signer = signer();
        let signature = signer.sign_message(b"payload").unwrap();
        let key = signer.verifying_key();

        assert!(!verify_signature(key, b"payload", &signature[2..]));
        assert!(!verify_signature(key, b"payload", "0xnothex"));
        assert!(!verify_signature(key, b"payload", &signature[..66]));
        assert!(!verify_signature(key, b"payload", ""));
    }

    #[test]
    fn other_key_cannot_verify() {
        let signature = signer().sign_message(b"payload").unwrap();
        let other = Signer::from_seed("someone-else").unwrap();
        assert!(!verify_signature(other.verifying_key(), b"payload", &signature));
    }

    #[test]
    fn seed_derivation_is_deterministic() {
        assert_eq!(signer().public_key_hex(), signer().public_key_hex());
        assert_eq!(signer().public_key_hex().len(), 66);
        assert!(matches!(Signer::from_seed(""), Err(SignerError::Key(_))));
        assert!(matches!(Signer::from_bytes(&[0u8; 32]), Err(SignerError::Key(_))));
        assert!(matches!(Signer::from_bytes(&[7u8; 33]), Err(SignerError::Key(_))));
    }

    #[test]
    fn settlement_payload_binds_route_and_proof() {
        let signer = signer();
        let intent = TransferIntent::new("ref-9", IntentKind::Transfer, "10", "USDC", ChainId::base());
        let proof = ProofArtifact::new(vec![0xab; 32]);

        let payload = signer.sign_settlement(&route(), &intent, Some(&proof)).unwrap();
        assert!(payload.verify());

        let message: serde_json::Value = serde_json::from_slice(&payload.message).unwrap();
        assert_eq!(message["agent_id"], "agent-001");
        assert_eq!(message["fee"], "0.05");
        assert_eq!(message["proof"], proof.to_hex());

        let mut rerouted = payload.clone();
        rerouted.message = settlement_message(
            &RouteQuote {
                agent_id: "agent-002".to_string(),
                ..route()
            },
            &intent,
            Some(&proof),
        );
        assert!(!rerouted.verify());

        let mut rekeyed = payload;
        rekeyed.public_key = Signer::from_seed("someone-else").unwrap().public_key_hex();
        assert!(!rekeyed.verify());
    }
}
