//! Source of candidate short codes.
//!
//! Services draw candidates from this port and check them against the
//! repository, which keeps generation deterministic in tests.

use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::domain::ShortCode;

/// Produces candidate short codes.
#[cfg_attr(test, mockall::automock)]
pub trait ShortCodeSource: Send + Sync {
    fn next_code(&self) -> ShortCode;
}

/// Short codes drawn from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomShortCodes;

impl ShortCodeSource for RandomShortCodes {
    fn next_code(&self) -> ShortCode {
        ShortCode::random(&mut rand::thread_rng())
    }
}

/// Short codes drawn from a seeded RNG, for reproducible runs.
#[derive(Debug)]
pub struct SeededShortCodes(Mutex<SmallRng>);

impl SeededShortCodes {
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(SmallRng::seed_from_u64(seed)))
    }
}

impl ShortCodeSource for SeededShortCodes {
    fn next_code(&self) -> ShortCode {
        let mut rng = self
            .0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        ShortCode::random(&mut *rng)
    }
}
