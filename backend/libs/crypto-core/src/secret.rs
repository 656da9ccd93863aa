//! Signing secret strength checks
//!
//! HMAC tokens are only as strong as the shared secret, so the configured
//! secret is classified at startup before the token service is built.

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::{rngs::OsRng, RngCore};

pub const MIN_SECRET_LENGTH: usize = 32;
pub const RECOMMENDED_SECRET_LENGTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretStrength {
    /// Too short, too uniform or patterned
    Weak,
    Acceptable,
    Strong,
}

/// Classify an HMAC signing secret.
///
/// **Criteria**:
/// - At least 32 bytes, 64 recommended
/// - Shannon entropy of at least 4 bits/byte
/// - No runs of four repeated or sequential bytes
pub fn validate_secret_strength(secret: &str) -> SecretStrength {
    let bytes = secret.as_bytes();

    if bytes.len() < MIN_SECRET_LENGTH {
        return SecretStrength::Weak;
    }

    let entropy = shannon_entropy(bytes);
    if entropy < 4.0 || has_obvious_patterns(bytes) {
        return SecretStrength::Weak;
    }

    if bytes.len() >= RECOMMENDED_SECRET_LENGTH && entropy >= 5.0 {
        SecretStrength::Strong
    } else {
        SecretStrength::Acceptable
    }
}

/// Bits per byte, 0 to 8.
fn shannon_entropy(data: &[u8]) -> f64 {
    let mut freq = [0u32; 256];
    for &byte in data {
        freq[byte as usize] += 1;
    }

    let len = data.len() as f64;
    freq.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

fn has_obvious_patterns(data: &[u8]) -> bool {
    let mut repeated = 1;
    let mut sequential = 1;

    for window in data.windows(2) {
        repeated = if window[0] == window[1] { repeated + 1 } else { 1 };
        sequential = if window[1] as i16 - window[0] as i16 == 1 {
            sequential + 1
        } else {
            1
        };

        if repeated >= 4 || sequential >= 4 {
            return true;
        }
    }

    false
}

/// Generate a random base64 secret from `bytes` bytes of OS randomness.
///
/// Used by local tooling and tests to produce secrets that pass
/// [`validate_secret_strength`].
pub fn generate_secret(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes.max(MIN_SECRET_LENGTH)];
    OsRng.fill_bytes(&mut buffer);
    STANDARD.encode(&buffer)
}
