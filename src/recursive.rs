use std::{
    cell::RefCell,
    fmt::{Debug, Display},
};

use tracing::trace;

use crate::{BarIndex, BarSeries, BoundedIndexedBuffer, CacheConfig, CacheMode, Formula, Indicator, Num};

/// Full-window cache for formulas defined in terms of their own previous
/// value, such as [`Ema`](crate::Ema).
///
/// On a miss at index `i` the missing range is filled forward, from just
/// after the last cached index (or the series' begin index) up to `i - 1`,
/// one value at a time. Each step finds its predecessor already cached, so a
/// cold read deep into history costs O(window) work and constant stack depth
/// instead of one nested call per bar.
///
/// When the series has evicted everything the cache held, the cache restarts
/// at the series' begin index, where the formula has to seed itself.
///
/// # Panics
///
/// [`new`](Self::new) panics unless the config uses [`CacheMode::Full`].
///
/// # Example
///
/// ```
/// use quantedge_series::{Bar, BarSeries, CacheConfig, Ema, Indicator, PriceSource, RecursiveCached};
/// use std::num::NonZero;
///
/// let mut series = BarSeries::builder()
///     .maximum_bar_count(NonZero::new(1000).unwrap())
///     .build();
/// for t in 1..=1000 {
///     let c = 100.0.into();
///     series.add_bar(Bar::new(t - 1, t, c, c, c, c, 1.0.into()), false).unwrap();
/// }
///
/// let ema = RecursiveCached::new(
///     Ema::new(PriceSource::Close, NonZero::new(20).unwrap()),
///     CacheConfig::for_series(&series),
/// );
///
/// // Cold read at the tail: backfills 999 values iteratively.
/// assert_eq!(ema.value(&series, 999).to_f64(), 100.0);
/// ```
#[derive(Debug)]
pub struct RecursiveCached<F> {
    formula: F,
    config: CacheConfig,
    values: RefCell<BoundedIndexedBuffer<Num>>,
}

impl<F: Formula> RecursiveCached<F> {
    #[must_use]
    pub fn new(formula: F, config: CacheConfig) -> Self {
        let CacheMode::Full(window) = config.mode() else {
            panic!("recursive caching requires a full-window cache, got {config}");
        };

        Self {
            formula,
            config,
            values: RefCell::new(BoundedIndexedBuffer::new(window)),
        }
    }

    #[must_use]
    pub fn formula(&self) -> &F {
        &self.formula
    }

    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn cached(&self, index: BarIndex) -> Option<Num> {
        let values = self.values.borrow();
        values.contains(index).then(|| *values.get(index))
    }

    /// Positions the cache for a fill starting after its last value, or at
    /// `begin` when that value has left the series. Returns the first index
    /// to compute.
    fn fill_start(&self, begin: BarIndex) -> BarIndex {
        let mut values = self.values.borrow_mut();
        let next = values.end_index() + 1;

        if values.is_empty() || next < begin {
            values.restart_at(begin);
            begin
        } else {
            next
        }
    }
}

impl<F: Formula> Indicator for RecursiveCached<F> {
    fn value(&self, series: &BarSeries, index: BarIndex) -> Num {
        series.check_index(index);

        if let Some(value) = self.cached(index) {
            return value;
        }

        let start = self.fill_start(series.begin_index());

        if index < start {
            // Below a cache window narrower than the series.
            return self.formula.calculate(series, index, self);
        }

        if start < index {
            trace!(from = start, to = index - 1, "backfilling recursive cache");
        }

        for i in start..index {
            let value = self.formula.calculate(series, i, self);
            let mut values = self.values.borrow_mut();
            debug_assert_eq!(values.end_index() + 1, i, "recursive cache lost alignment");
            values.add(value);
        }

        let value = self.formula.calculate(series, index, self);
        if self.config.retains(series, index) {
            self.values.borrow_mut().add(value);
        }

        value
    }
}

impl<F: Display> Display for RecursiveCached<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.formula, f)
    }
}
