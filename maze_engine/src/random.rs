// random.rs - Fallible uniform choices backed by OS entropy or a fixed seed

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error_handling::Result;

/// Source of unbiased choices. Failing to draw is fatal for the caller.
pub trait RandomSource: Send {
    /// Uniform index in `0..upper`; `upper` must be non-zero.
    fn index(&mut self, upper: usize) -> Result<usize>;

    fn coin(&mut self) -> Result<bool> {
        Ok(self.index(2)? == 0)
    }
}

/// Rejection-sampled choices over any `RngCore`, propagating its failures.
pub struct EntropySource<R> {
    rng: R,
}

impl EntropySource<OsRng> {
    /// Cryptographic source reading the operating system's entropy pool.
    pub fn os() -> Self {
        Self { rng: OsRng }
    }
}

impl EntropySource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: RngCore + Send> RandomSource for EntropySource<R> {
    fn index(&mut self, upper: usize) -> Result<usize> {
        debug_assert!(upper > 0, "empty choice");
        let upper = upper as u64;
        // largest multiple of `upper` that fits, so every residue is equally likely
        let zone = u64::MAX - u64::MAX % upper;

        loop {
            let mut buf = [0u8; 8];
            self.rng.try_fill_bytes(&mut buf)?;
            let value = u64::from_le_bytes(buf);
            if value < zone {
                return Ok((value % upper) as usize);
            }
        }
    }
}

/// Hands out one independent source per concurrent consumer.
pub trait SourceFactory: Send + Sync {
    fn source(&self, stream: u64) -> Box<dyn RandomSource>;
}

/// Which entropy backs a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Entropy {
    #[default]
    Os,
    Seeded(u64),
}

impl SourceFactory for Entropy {
    fn source(&self, stream: u64) -> Box<dyn RandomSource> {
        match *self {
            Entropy::Os => Box::new(EntropySource::os()),
            Entropy::Seeded(seed) => Box::new(EntropySource::seeded(
                seed.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
            )),
        }
    }
}
