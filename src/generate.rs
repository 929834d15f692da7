use rand::{Rng, SeedableRng, rngs::StdRng};

/// Source of organic variation for seeds, geometry and timing.
///
/// The default generator draws from thread-local entropy on every call, so
/// two landscapes never look alike. [`Gen::seeded`] gives a reproducible
/// stream for tests and `--seed`.
#[derive(Debug, Clone)]
pub struct Gen {
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    Entropy,
    Seeded(StdRng),
}

impl Default for Gen {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl Gen {
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            source: Source::Entropy,
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            source: Source::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    /// Uniform sample in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        match &mut self.source {
            Source::Entropy => rand::rng().random::<f64>(),
            Source::Seeded(rng) => rng.random::<f64>(),
        }
    }

    /// Uniform value between `low` and `high`.
    ///
    /// Without `integer` the result lies in `[low, high)`; reversed bounds are
    /// accepted and yield a value between them. With `integer` the result is
    /// drawn from the integers inside the closed range; when no integer fits,
    /// `low` rounded is returned.
    pub fn random(&mut self, low: f64, high: f64, integer: bool) -> f64 {
        let u = self.unit();
        if !integer {
            return spread(u, low, high);
        }

        let (lo, hi) = if low <= high { (low, high) } else { (high, low) };
        let (lo, hi) = (lo.ceil(), hi.floor());
        if hi < lo {
            return low.round();
        }
        (lo + (u * (hi - lo + 1.0)).floor()).min(hi)
    }

    pub fn random_range(&mut self, range: crate::config::Span) -> f64 {
        self.random(range.min, range.max, false)
    }
}

/// Maps `u` in `[0, 1)` onto the span from `low` towards `high`, never landing on `high`.
fn spread(u: f64, low: f64, high: f64) -> f64 {
    let value = low + u * (high - low);
    if low < high && value >= high {
        high.next_down()
    } else if low > high && value <= high {
        high.next_up()
    } else {
        value
    }
}
