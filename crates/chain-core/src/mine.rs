use std::time::Instant;
use tracing::info;

use crate::{error::MineError, hash::meets_difficulty, SolvedBlock, UnsolvedBlock};

/// Caller-imposed bound on the nonce search. The search itself is unbounded
/// by construction (any finite difficulty is eventually satisfied, after
/// roughly `16^difficulty` attempts); callers needing bounded latency set a
/// maximum attempt count, a wall-clock deadline, or both.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchLimit {
    pub max_attempts: Option<u64>,
    pub deadline: Option<Instant>,
}

impl SearchLimit {
    /// No bound: the reference behavior.
    pub const NONE: SearchLimit = SearchLimit {
        max_attempts: None,
        deadline: None,
    };

    pub fn attempts(max: u64) -> Self {
        SearchLimit {
            max_attempts: Some(max),
            deadline: None,
        }
    }

    pub fn until(deadline: Instant) -> Self {
        SearchLimit {
            max_attempts: None,
            deadline: Some(deadline),
        }
    }
}

/// Brute-force nonce search: starting at 0 and incrementing by 1, computes
/// the candidate digest each iteration and accepts the first nonce whose
/// digest starts with `difficulty` consecutive `'0'` hex chars. Blocking and
/// CPU-bound; difficulty 0 accepts nonce 0 on the first attempt.
///
/// Returns the sealed block and its accepted digest, or a [`MineError`] when
/// `limit` runs out first.
pub fn search(block: UnsolvedBlock, limit: &SearchLimit) -> Result<(SolvedBlock, String), MineError> {
    let difficulty = block.difficulty;
    let mut attempts: u64 = 0;
    let mut nonce: u64 = 0;
    loop {
        if let Some(max) = limit.max_attempts {
            if attempts >= max {
                return Err(MineError::AttemptsExhausted { attempts });
            }
        }
        if let Some(deadline) = limit.deadline {
            if Instant::now() >= deadline {
                return Err(MineError::DeadlinePassed { attempts });
            }
        }

        let digest = block.digest(nonce)?;
        attempts += 1;
        if meets_difficulty(&digest, difficulty) {
            info!(nonce, difficulty, attempts, digest = %digest, "block solved");
            return Ok((block.seal(nonce), digest));
        }
        nonce += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transaction;

    #[test]
    fn difficulty_zero_accepts_nonce_zero_first_try() {
        let block = UnsolvedBlock::new(vec![], "", 0);
        let (solved, digest) = search(block, &SearchLimit::NONE).unwrap();
        assert_eq!(solved.nonce(), 0);
        assert_eq!(solved.digest().unwrap(), digest);
    }

    #[test]
    fn solved_digest_carries_leading_zeros() {
        let txns = vec![Transaction::new(vec![], vec![], Some(1_600_000_000))];
        let (solved, digest) = search(UnsolvedBlock::new(txns, "", 2), &SearchLimit::NONE).unwrap();
        assert!(digest.starts_with("00"));
        assert!(meets_difficulty(&digest, 2));
        assert!(solved.check_difficulty().is_ok());
    }

    #[test]
    fn attempt_cap_is_reported_not_swallowed() {
        // Difficulty 64 demands an all-zero digest; ten attempts won't do it.
        let block = UnsolvedBlock::new(vec![], "", 64);
        let err = search(block, &SearchLimit::attempts(10)).unwrap_err();
        assert!(matches!(err, MineError::AttemptsExhausted { attempts: 10 }));
    }

    #[test]
    fn expired_deadline_stops_the_search() {
        let block = UnsolvedBlock::new(vec![], "", 64);
        let err = search(block, &SearchLimit::until(Instant::now())).unwrap_err();
        assert!(matches!(err, MineError::DeadlinePassed { .. }));
    }
}
