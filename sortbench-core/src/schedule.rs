//! Work-size Scheduling
//!
//! Pure mapping from a 1-based run index to a sample size under a growth
//! policy. The policy is stateless; the maximum size of a planned sweep is
//! just the size at the last index, since every growth type is monotonically
//! non-decreasing for growth ≥ 1.

/// How the sample size grows between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthKind {
    /// `base * (index * growth)`
    Linear,
    /// `base * growth ^ index`
    Exponential,
    /// `base + base * log10(growth * index)`, truncated
    Logarithmic,
}

impl GrowthKind {
    /// Map the numeric CLI tag (1=linear, 2=exponential, 3=logarithmic).
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(GrowthKind::Linear),
            2 => Some(GrowthKind::Exponential),
            3 => Some(GrowthKind::Logarithmic),
            _ => None,
        }
    }

    /// The numeric tag this kind is selected by.
    pub fn tag(self) -> u8 {
        match self {
            GrowthKind::Linear => 1,
            GrowthKind::Exponential => 2,
            GrowthKind::Logarithmic => 3,
        }
    }
}

/// Deterministic run-index → sample-size function.
#[derive(Debug, Clone, Copy)]
pub struct WorkSizePolicy {
    base: u64,
    growth: u64,
    kind: GrowthKind,
}

/// Saturating integer power; sizes clamp instead of wrapping on overflow.
fn ipow(base: u64, exp: u32) -> u64 {
    let mut acc = 1u64;
    for _ in 0..exp {
        acc = acc.saturating_mul(base);
    }
    acc
}

impl WorkSizePolicy {
    /// Build a policy from base size, growth amount and growth type.
    pub fn new(base: u64, growth: u64, kind: GrowthKind) -> Self {
        Self { base, growth, kind }
    }

    /// Sample size for the 1-based run index `run`.
    pub fn size_for(&self, run: u32) -> u64 {
        match self.kind {
            GrowthKind::Linear => self
                .base
                .saturating_mul((run as u64).saturating_mul(self.growth)),
            GrowthKind::Exponential => self.base.saturating_mul(ipow(self.growth, run)),
            GrowthKind::Logarithmic => {
                let scaled = self.growth.saturating_mul(run as u64);
                if scaled == 0 {
                    return self.base;
                }
                self.base + (self.base as f64 * (scaled as f64).log10()) as u64
            }
        }
    }

    /// Largest size in a sweep of `runs` runs (the size at the last index).
    pub fn max_size(&self, runs: u32) -> u64 {
        self.size_for(runs.max(1))
    }
}
