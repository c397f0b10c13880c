//! Seed commitments for provably fair matches.
//!
//! Every match draws its randomness from a 32-byte seed. Before the first move the host
//! publishes `commit = sha256(seed)`; once the match completes it discloses the seed itself.
//! Anyone holding both can check the commitment and replay every shuffle and dice roll.
//!
//! ```text
//! seed[match]   = sha256(master_secret || match_id)
//! commit[match] = sha256(seed[match])
//! ```

use crate::minigame::Seed;
use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use thiserror::Error;

/// Length of commit and seed values in bytes.
pub const COMMIT_LEN: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommitRevealError {
    #[error("invalid commit length: {0} (expected 32)")]
    InvalidCommitLength(usize),
    #[error("invalid reveal length: {0} (expected 32)")]
    InvalidRevealLength(usize),
    #[error("commit-reveal verification failed")]
    VerificationFailed,
}

/// A match seed together with its published commitment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedCommitment {
    pub commit: [u8; COMMIT_LEN],
    pub seed: Seed,
}

impl SeedCommitment {
    pub fn from_seed(seed: Seed) -> Self {
        Self {
            commit: compute_commit(&seed),
            seed,
        }
    }

    pub fn verify(&self) -> bool {
        verify_commit_reveal(&self.commit, &self.seed)
    }
}

/// Computes `sha256(reveal)`.
pub fn compute_commit(reveal: &[u8; COMMIT_LEN]) -> [u8; COMMIT_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(reveal);
    hasher.finalize().0
}

pub fn verify_commit_reveal(commit: &[u8; COMMIT_LEN], reveal: &[u8; COMMIT_LEN]) -> bool {
    commit == &compute_commit(reveal)
}

/// Verifies a commitment received as raw bytes, returning the seed on success.
pub fn verify_commit_reveal_slices(
    commit: &[u8],
    reveal: &[u8],
) -> Result<Seed, CommitRevealError> {
    let commit: [u8; COMMIT_LEN] = commit
        .try_into()
        .map_err(|_| CommitRevealError::InvalidCommitLength(commit.len()))?;
    let reveal: [u8; COMMIT_LEN] = reveal
        .try_into()
        .map_err(|_| CommitRevealError::InvalidRevealLength(reveal.len()))?;
    if verify_commit_reveal(&commit, &reveal) {
        Ok(reveal)
    } else {
        Err(CommitRevealError::VerificationFailed)
    }
}

/// Derives per-match seeds from a single host secret.
#[derive(Clone)]
pub struct SeedChain {
    master_secret: [u8; COMMIT_LEN],
}

impl SeedChain {
    pub fn from_secret(master_secret: [u8; COMMIT_LEN]) -> Self {
        Self { master_secret }
    }

    /// Builds a chain from an arbitrary passphrase (used for local play and tests).
    pub fn from_phrase(phrase: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(phrase.as_bytes());
        hasher.update(b"pengu_seed_chain");
        Self {
            master_secret: hasher.finalize().0,
        }
    }

    pub fn derive_seed(&self, match_id: u64) -> Seed {
        let mut hasher = Sha256::new();
        hasher.update(&self.master_secret);
        hasher.update(&match_id.to_be_bytes());
        hasher.finalize().0
    }

    pub fn commitment(&self, match_id: u64) -> SeedCommitment {
        SeedCommitment::from_seed(self.derive_seed(match_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_deterministic() {
        let a = SeedChain::from_phrase("arcade");
        let b = SeedChain::from_phrase("arcade");
        assert_eq!(a.commitment(7), b.commitment(7));
        assert_ne!(a.derive_seed(7), a.derive_seed(8));
        assert_ne!(
            a.derive_seed(7),
            SeedChain::from_phrase("other").derive_seed(7)
        );
    }

    #[test]
    fn test_commitment_verifies() {
        let chain = SeedChain::from_secret([9; COMMIT_LEN]);
        for match_id in 0..20 {
            let commitment = chain.commitment(match_id);
            assert!(commitment.verify(), "match {match_id}");
        }
    }

    #[test]
    fn test_tampered_seed_fails() {
        let commitment = SeedChain::from_phrase("arcade").commitment(1);
        let mut bad = commitment.seed;
        bad[0] ^= 0xFF;
        assert!(!verify_commit_reveal(&commitment.commit, &bad));
    }

    #[test]
    fn test_verify_slices() {
        let commitment = SeedChain::from_phrase("arcade").commitment(3);
        assert_eq!(
            verify_commit_reveal_slices(&commitment.commit, &commitment.seed),
            Ok(commitment.seed)
        );
        assert_eq!(
            verify_commit_reveal_slices(&[0u8; 16], &commitment.seed),
            Err(CommitRevealError::InvalidCommitLength(16))
        );
        assert_eq!(
            verify_commit_reveal_slices(&commitment.commit, &[0u8; 8]),
            Err(CommitRevealError::InvalidRevealLength(8))
        );
        assert_eq!(
            verify_commit_reveal_slices(&[0u8; 32], &[1u8; 32]),
            Err(CommitRevealError::VerificationFailed)
        );
    }
}
