//! Deterministic random number generation for synthetic data.
//!
//! RULE: Synthetic generators never call a platform RNG.
//! Every stream is seeded from (master_seed, stream slot), so adding a
//! stream never shifts the values another stream produces.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n). `n` of 0 yields 0.
    pub fn below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.next_u64() % n
    }

    /// Roll an integer in [lo, hi] inclusive.
    pub fn between(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.below(hi.saturating_sub(lo) + 1)
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Simplified Pareto draw. Higher `alpha` means less skew.
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.below(items.len() as u64) as usize)
    }
}

pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn stream(&self, slot: StreamSlot) -> StreamRng {
        StreamRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream assignments. Append only: reordering changes every
/// stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Customers = 0,
    Orders = 1,
    Categories = 2,
    Statuses = 3,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Orders => "orders",
            Self::Categories => "categories",
            Self::Statuses => "statuses",
        }
    }
}
