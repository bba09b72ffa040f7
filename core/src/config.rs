use serde::{Deserialize, Serialize};

/// Parameters of the signature hash and block signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    /// Signature width F in bits, at most 64.
    pub width: u32,
    /// Terms per block signature (D).
    pub block_size: usize,
    /// Minimum number of set bits per term hash (m).
    pub min_bits: u32,
    /// Upper bound of the prime sieve feeding the hash rounds.
    pub prime_limit: usize,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self { width: 64, block_size: 4, min_bits: 3, prime_limit: 1000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub signature: SignatureConfig,
    /// Buckley-Lewit cut-off; `gamma + 1` results are returned.
    pub gamma: usize,
    /// How many hits a host shows per query.
    pub output_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { signature: SignatureConfig::default(), gamma: 9, output_k: 10 }
    }
}

impl EngineConfig {
    /// Clamps values the index builders cannot honour.
    pub fn sanitized(mut self) -> Self {
        self.signature.width = self.signature.width.clamp(1, 64);
        self.signature.min_bits = self.signature.min_bits.min(self.signature.width);
        self.signature.block_size = self.signature.block_size.max(1);
        self.gamma = self.gamma.max(1);
        self
    }
}
