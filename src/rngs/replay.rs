use anyhow::anyhow;
use rand::RngCore;
use rand_core::{
    impls::{next_u32_via_fill, next_u64_via_fill},
    SeedableRng,
};

#[derive(Clone, Debug)]
/// An RNG that replays its seed bytes front to back instead of expanding them.
///
/// Running out of bytes is an error on [`RngCore::try_fill_bytes`] and a panic on the
/// infallible paths, which makes an empty `ReplayRng` a cheap way to show that a call drew
/// nothing: `ReplayRng::from_seed(vec![])` panics on the first draw.
pub struct ReplayRng {
    seed: Vec<u8>,
}

impl ReplayRng {
    /// Bytes left before the generator is exhausted
    pub fn remaining(&self) -> usize {
        self.seed.len()
    }
}

impl RngCore for ReplayRng {
    fn next_u32(&mut self) -> u32 {
        next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.try_fill_bytes(dest)
            .expect("ReplayRng::fill_bytes failed");
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        if self.seed.len() < dest.len() {
            return Err(rand_core::Error::new(anyhow!(
                "ReplayRng::try_fill_bytes unable to fill bytes: {} bytes left filling destination of size {}",
                self.seed.len(),
                dest.len()
            )));
        }
        dest.iter_mut().for_each(|b| {
            // length checked above
            *b = self.seed.pop().unwrap_or_default();
        });
        Ok(())
    }
}

impl SeedableRng for ReplayRng {
    type Seed = Vec<u8>;

    fn from_seed(mut seed: Self::Seed) -> Self {
        // Stored reversed so that popping takes from the front of the caller's seed
        seed.reverse();
        Self { seed }
    }
}
