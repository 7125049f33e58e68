//! Alias derivation from a target URL.
//!
//! A candidate is 6 bytes sampled with replacement from the SHA-256 digest of
//! the URL, encoded as URL-safe base64 without padding, which always yields 8
//! characters. The digest is computed once per allocation; every retry draws
//! fresh bytes from it.

use base64::Engine as _;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of digest bytes in one candidate.
pub const SAMPLED_BYTES: usize = 6;

/// Length of every generated alias.
pub const GENERATED_ALIAS_LEN: usize = 8;

static SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Candidate source bound to one original URL.
pub struct AliasGenerator {
    digest: [u8; 32],
    rng: StdRng,
}

impl AliasGenerator {
    /// Hashes the URL and seeds the sampler from the wall clock.
    pub fn new(original_url: &str) -> Self {
        Self::with_rng(original_url, StdRng::seed_from_u64(clock_seed()))
    }

    /// Same as [`AliasGenerator::new`] with an explicit sampler, for
    /// reproducible sequences.
    pub fn with_rng(original_url: &str, rng: StdRng) -> Self {
        Self {
            digest: Sha256::digest(original_url.as_bytes()).into(),
            rng,
        }
    }

    /// Draws the next candidate alias.
    pub fn candidate(&mut self) -> String {
        let mut sampled = [0u8; SAMPLED_BYTES];
        for byte in sampled.iter_mut() {
            *byte = self.digest[self.rng.random_range(0..self.digest.len())];
        }

        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(sampled)
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }
}

/// Nanoseconds since the epoch, mixed with a process-wide counter so two
/// generators created within the same clock tick still diverge.
fn clock_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let sequence = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    nanos ^ sequence.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Returns true if every character belongs to the URL-safe base64 alphabet.
pub fn is_alias_alphabet(alias: &str) -> bool {
    alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_candidate_length_and_alphabet() {
        let mut generator = AliasGenerator::new("https://example.com");

        for _ in 0..200 {
            let alias = generator.candidate();
            assert_eq!(alias.len(), GENERATED_ALIAS_LEN);
            assert!(is_alias_alphabet(&alias), "unexpected char in {alias}");
        }
    }

    #[test]
    fn test_candidate_bytes_come_from_digest() {
        let mut generator = AliasGenerator::new("https://rust-lang.org");
        let digest: HashSet<u8> = generator.digest().iter().copied().collect();

        for _ in 0..50 {
            let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
                .decode(generator.candidate())
                .unwrap();
            assert_eq!(decoded.len(), SAMPLED_BYTES);
            assert!(decoded.iter().all(|b| digest.contains(b)));
        }
    }

    #[test]
    fn test_seeded_generators_are_reproducible() {
        let mut a = AliasGenerator::with_rng("https://example.com", StdRng::seed_from_u64(42));
        let mut b = AliasGenerator::with_rng("https://example.com", StdRng::seed_from_u64(42));

        for _ in 0..10 {
            assert_eq!(a.candidate(), b.candidate());
        }
    }

    #[test]
    fn test_retries_draw_different_candidates() {
        let mut generator = AliasGenerator::new("https://example.com");
        let aliases: HashSet<String> = (0..20).map(|_| generator.candidate()).collect();

        assert!(aliases.len() > 1);
    }

    #[test]
    fn test_separate_generators_diverge() {
        let first = AliasGenerator::new("https://example.com").candidate();
        let second = AliasGenerator::new("https://example.com").candidate();
        let third = AliasGenerator::new("https://example.com").candidate();

        assert!(first != second || second != third);
    }

    #[test]
    fn test_is_alias_alphabet() {
        assert!(is_alias_alphabet("aZ09-_"));
        assert!(!is_alias_alphabet("abc def"));
        assert!(!is_alias_alphabet("abc+/"));
        assert!(!is_alias_alphabet("ключ"));
    }
}
