// Random draws shared by the catalog builder and population initializer

use rand::Rng;
use rand::distr::weighted::WeightedIndex;

use crate::error::{GeosError, Result};

/// A weighted yes/no trial. `weights` are `[no, yes]`.
#[derive(Debug, Clone)]
pub struct WeightedCoin {
    index: WeightedIndex<f64>,
}

impl WeightedCoin {
    pub fn new(weights: [f64; 2]) -> Result<Self> {
        Ok(Self {
            index: WeightedIndex::new(weights)?,
        })
    }

    pub fn flip<R: Rng>(&self, rng: &mut R) -> bool {
        rng.sample(&self.index) == 1
    }
}

/// Pick one of `options` with the given relative weights.
pub fn choose_weighted<T: Copy, R: Rng>(
    rng: &mut R,
    options: &[T],
    weights: &[f64],
) -> Result<T> {
    if options.len() != weights.len() {
        return Err(GeosError::InvalidWeights(format!(
            "expected {} weights, got {}",
            options.len(),
            weights.len()
        )));
    }
    let index = WeightedIndex::new(weights)?;
    Ok(options[rng.sample(&index)])
}

/// Draw `count` distinct items without replacement, in draw order.
pub fn sample_distinct<T: Clone, R: Rng>(
    rng: &mut R,
    items: &[T],
    count: usize,
) -> Result<Vec<T>> {
    if count > items.len() {
        return Err(GeosError::InvalidSampleSize {
            requested: count,
            available: items.len(),
        });
    }
    Ok(rand::seq::index::sample(rng, items.len(), count)
        .into_iter()
        .map(|i| items[i].clone())
        .collect())
}

/// Draw a non-empty subset whose size is uniform over `1..=items.len()`.
pub fn sample_nonempty_subset<T: Clone, R: Rng>(
    rng: &mut R,
    items: &[T],
) -> Result<Vec<T>> {
    if items.is_empty() {
        return Err(GeosError::InvalidSampleSize {
            requested: 1,
            available: 0,
        });
    }
    let count = rng.random_range(1..=items.len());
    sample_distinct(rng, items, count)
}
