//! Seeded randomness for a session.
//!
//! Market returns and scam picks are drawn here and nowhere else, so a
//! session seed plus its action log replays to the same wealth history.
//! Market and scam draws come from separate streams; a scam roll never
//! shifts the next month's return.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// One seeded stream, labelled for log output.
pub struct SimRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SimRng {
    /// Mixes `slot_index` into `master_seed` with a Fibonacci-hash
    /// multiplier, so neighbouring slots start far apart.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Top 53 bits of the next word, scaled into [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform draw from the half-open range [min, max).
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Pick an index into a non-empty slice of length `len`.
    pub fn pick(&mut self, len: usize) -> usize {
        self.next_u64_below(len as u64) as usize
    }
}

/// Hands out the per-slot streams for one session.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_slot(&self, slot: RngSlot) -> SimRng {
        SimRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Which stream a consumer draws from. The discriminant feeds the seed,
/// so renumbering a slot changes every replay recorded before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    Market = 0,
    Scam = 1,
}

impl RngSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Scam => "scam",
        }
    }
}
