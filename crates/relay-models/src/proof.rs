use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque proof bytes produced by the proof capability.
///
/// The relay never interprets the contents; it only threads them from the
/// prover to settlement.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ProofArtifact(#[serde(with = "hex::serde")] Vec<u8>);

impl ProofArtifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `0x`-prefixed hex encoding.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    /// Short prefix for log lines.
    pub fn short(&self) -> String {
        let full = self.to_hex();
        full.chars().take(10).collect()
    }
}

impl fmt::Debug for ProofArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProofArtifact({}.., {} bytes)", self.short(), self.len())
    }
}
