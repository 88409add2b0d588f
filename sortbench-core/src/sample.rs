//! Benchmark Input Shapes
//!
//! Each shape owns an immutable baseline array generated once at the maximum
//! sweep size; every trial sorts a fresh copy of the baseline's first `n`
//! elements, so all trials of a run start from bit-identical input.

use rand::Rng;

/// Input distribution a plugin is benchmarked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Already-ascending values; the best-case baseline.
    PreSorted,
    /// Uniformly random values.
    Random,
}

impl Shape {
    /// Display name used in console section headers.
    pub fn label(self) -> &'static str {
        match self {
            Shape::PreSorted => "Pre-Sorted",
            Shape::Random => "Random",
        }
    }

    /// Short tag used in data file names.
    pub fn file_tag(self) -> &'static str {
        match self {
            Shape::PreSorted => "sorted",
            Shape::Random => "random",
        }
    }
}

/// Immutable baseline array for one shape.
#[derive(Debug, Clone)]
pub struct Baseline {
    shape: Shape,
    values: Vec<i32>,
}

impl Baseline {
    /// Generate a baseline of `max_size` elements for `shape`.
    pub fn generate(shape: Shape, max_size: usize) -> Self {
        let values = match shape {
            Shape::PreSorted => (0..max_size).map(|i| i as i32).collect(),
            Shape::Random => {
                let mut rng = rand::rng();
                (0..max_size).map(|_| rng.random_range(0..i32::MAX)).collect()
            }
        };
        Self { shape, values }
    }

    /// The shape this baseline was generated for.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Number of elements generated.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the baseline is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fresh working buffer holding the baseline's first `n` elements.
    ///
    /// Panics if `n` exceeds the generated size; the scheduler guarantees
    /// every run size fits the maximum computed up front.
    pub fn working_copy(&self, n: usize) -> Vec<i32> {
        assert!(
            n <= self.values.len(),
            "requested {} elements from a baseline of {}",
            n,
            self.values.len()
        );
        self.values[..n].to_vec()
    }
}

/// The baselines of a sweep, in execution order (pre-sorted first).
pub fn generate_baselines(max_size: usize) -> Vec<Baseline> {
    vec![
        Baseline::generate(Shape::PreSorted, max_size),
        Baseline::generate(Shape::Random, max_size),
    ]
}
