use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt::{Debug, Display},
    num::NonZero,
};

use tracing::trace;

use crate::{BarIndex, BarSeries, BoundedIndexedBuffer, Formula, Indicator, Num};

/// Slots in the default mini-cache.
pub const DEFAULT_MINI_SLOTS: usize = 2;

/// How a cached indicator retains computed values.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum CacheMode {
    /// The last `n` computed `(index, value)` pairs, newest checked first.
    ///
    /// Cheap; pays off when one evaluation pass asks for the same or an
    /// adjacent index several times.
    Mini(usize),
    /// Every computed value over a sliding window of `n` indices.
    ///
    /// For indicators read at random historical indices or very often. Size
    /// it to the series' maximum bar count.
    Full(usize),
}

impl Display for CacheMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mini(slots) => write!(f, "Mini({slots})"),
            Self::Full(window) => write!(f, "Full({window})"),
        }
    }
}

/// Configuration for [`Cached`] and [`RecursiveCached`] indicators.
///
/// `cache_tail` decides whether the value at the series' end index is kept.
/// That bar may still be forming, so by default its value is recomputed on
/// every request. Values of closed bars are always cached once computed.
/// The setting changes what is retained, never what is returned, as long as
/// a tail bar is not modified after its value was cached.
///
/// # Example
///
/// ```
/// use quantedge_series::{CacheConfig, CacheMode};
/// use std::num::NonZero;
///
/// let config = CacheConfig::builder()
///     .full(NonZero::new(500).unwrap())
///     .cache_tail(true)
///     .build();
///
/// assert_eq!(config.mode(), CacheMode::Full(500));
/// assert!(config.cache_tail());
/// assert_eq!(CacheConfig::mini().mode(), CacheMode::Mini(2));
/// ```
///
/// [`RecursiveCached`]: crate::RecursiveCached
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct CacheConfig {
    mode: CacheMode,
    cache_tail: bool,
}

impl CacheConfig {
    /// Returns a new builder with default values.
    #[must_use]
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::new()
    }

    /// Mini-cache with [`DEFAULT_MINI_SLOTS`] slots.
    #[must_use]
    pub fn mini() -> Self {
        Self::builder()
            .mini(NonZero::new(DEFAULT_MINI_SLOTS).expect("default slot count is non-zero"))
            .build()
    }

    /// Full-window cache over `window` indices.
    #[must_use]
    pub fn full(window: NonZero<usize>) -> Self {
        Self::builder().full(window).build()
    }

    /// Full-window cache sized to the series' maximum bar count.
    ///
    /// # Panics
    ///
    /// Never panics: a series always retains at least one bar.
    #[must_use]
    pub fn for_series(series: &BarSeries) -> Self {
        Self::full(
            NonZero::new(series.maximum_bar_count()).expect("series capacity is non-zero"),
        )
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub fn cache_tail(&self) -> bool {
        self.cache_tail
    }

    /// Whether the value at `index` may be retained.
    #[inline]
    pub(crate) fn retains(&self, series: &BarSeries, index: BarIndex) -> bool {
        self.cache_tail || index != series.end_index()
    }
}

impl Display for CacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CacheConfig({}, tail: {})", self.mode, self.cache_tail)
    }
}

/// Builder for [`CacheConfig`].
///
/// Defaults: `cache_tail = false`.
/// A mode must be set before calling [`build`](Self::build).
pub struct CacheConfigBuilder {
    mode: Option<CacheMode>,
    cache_tail: bool,
}

impl CacheConfigBuilder {
    fn new() -> Self {
        Self {
            mode: None,
            cache_tail: false,
        }
    }

    #[must_use]
    pub fn mini(mut self, slots: NonZero<usize>) -> Self {
        self.mode.replace(CacheMode::Mini(slots.get()));
        self
    }

    #[must_use]
    pub fn full(mut self, window: NonZero<usize>) -> Self {
        self.mode.replace(CacheMode::Full(window.get()));
        self
    }

    #[must_use]
    pub fn cache_tail(mut self, cache_tail: bool) -> Self {
        self.cache_tail = cache_tail;
        self
    }

    /// Builds the config. Panics if no mode was set.
    #[must_use]
    pub fn build(self) -> CacheConfig {
        CacheConfig {
            mode: self.mode.expect("cache mode is required"),
            cache_tail: self.cache_tail,
        }
    }
}

/// Evaluates its formula on every request.
///
/// No memo, no re-entrancy check: a self-referential formula recurses all
/// the way down to the series' begin index. Useful for cheap formulas and as
/// a reference for cached ones.
#[derive(Clone, Debug)]
pub struct Uncached<F> {
    formula: F,
}

impl<F: Formula> Uncached<F> {
    #[must_use]
    pub fn new(formula: F) -> Self {
        Self { formula }
    }

    #[must_use]
    pub fn formula(&self) -> &F {
        &self.formula
    }
}

impl<F: Formula> Indicator for Uncached<F> {
    #[inline]
    fn value(&self, series: &BarSeries, index: BarIndex) -> Num {
        series.check_index(index);
        self.formula.calculate(series, index, self)
    }
}

impl<F: Display> Display for Uncached<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.formula, f)
    }
}

#[derive(Clone, Debug)]
enum Memo {
    Mini {
        slots: usize,
        entries: VecDeque<(BarIndex, Num)>,
    },
    Full(BoundedIndexedBuffer<Option<Num>>),
}

impl Memo {
    fn new(mode: CacheMode) -> Self {
        match mode {
            CacheMode::Mini(slots) => Self::Mini {
                slots,
                entries: VecDeque::with_capacity(slots),
            },
            CacheMode::Full(window) => Self::Full(BoundedIndexedBuffer::new(window)),
        }
    }

    #[inline]
    fn lookup(&self, index: BarIndex) -> Option<Num> {
        match self {
            Self::Mini { entries, .. } => entries
                .iter()
                .rev()
                .find_map(|&(i, value)| (i == index).then_some(value)),
            Self::Full(values) => {
                if values.contains(index) {
                    *values.get(index)
                } else {
                    None
                }
            }
        }
    }

    /// Retains `value` at `index`. `floor` is the oldest index the series
    /// still holds; a full cache never restarts below it.
    fn store(&mut self, index: BarIndex, value: Num, floor: BarIndex) {
        match self {
            Self::Mini { slots, entries } => {
                if let Some(entry) = entries.iter_mut().find(|(i, _)| *i == index) {
                    entry.1 = value;
                    return;
                }
                if entries.len() == *slots {
                    entries.pop_front();
                }
                entries.push_back((index, value));
            }
            Self::Full(values) => {
                if values.contains(index) {
                    values.set(index, Some(value));
                    return;
                }
                if index <= values.end_index() {
                    // Older than the cached window.
                    return;
                }

                #[allow(clippy::cast_possible_wrap)]
                let window = values.window() as BarIndex;
                if values.is_empty() || index - values.end_index() > window {
                    let start = floor.max(index + 1 - window);
                    trace!(index, start, "full cache restarted");
                    values.restart_at(start);
                }
                while values.end_index() + 1 < index {
                    values.add(None);
                }
                values.add(Some(value));
            }
        }
    }
}

/// Memoizing wrapper for formulas that do not read their own values.
///
/// Each distinct closed index is computed at most once while it stays in
/// the cache (see [`CacheMode`] for the two retention strategies).
///
/// # Panics
///
/// Evaluation panics if the formula asks this same indicator for a value
/// while it is being computed. That is the signature of a self-referential
/// formula, which must be wrapped in [`RecursiveCached`] instead.
///
/// # Example
///
/// ```
/// use quantedge_series::{Bar, BarSeries, CacheConfig, Cached, Indicator, PriceSource, Sma};
/// use std::num::NonZero;
///
/// let mut series = BarSeries::builder()
///     .maximum_bar_count(NonZero::new(100).unwrap())
///     .build();
/// for (t, close) in [(1, 2.0), (2, 4.0), (3, 6.0)] {
///     let c = close.into();
///     series.add_bar(Bar::new(t - 1, t, c, c, c, c, 1.0.into()), false).unwrap();
/// }
///
/// let sma = Cached::new(
///     Sma::new(PriceSource::Close, NonZero::new(2).unwrap()),
///     CacheConfig::for_series(&series),
/// );
///
/// assert_eq!(sma.value(&series, 1).to_f64(), 3.0);
/// assert_eq!(sma.value(&series, 2).to_f64(), 5.0);
/// ```
///
/// [`RecursiveCached`]: crate::RecursiveCached
#[derive(Debug)]
pub struct Cached<F> {
    formula: F,
    config: CacheConfig,
    memo: RefCell<Memo>,
    evaluating: Cell<bool>,
}

impl<F: Formula> Cached<F> {
    #[must_use]
    pub fn new(formula: F, config: CacheConfig) -> Self {
        Self {
            formula,
            config,
            memo: RefCell::new(Memo::new(config.mode())),
            evaluating: Cell::new(false),
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
}

impl<F: Formula> Indicator for Cached<F> {
    fn value(&self, series: &BarSeries, index: BarIndex) -> Num {
        series.check_index(index);
        let _guard = Evaluating::enter(&self.evaluating, index);

        if let Some(value) = self.memo.borrow().lookup(index) {
            return value;
        }

        let value = self.formula.calculate(series, index, self);

        if self.config.retains(series, index) {
            self.memo
                .borrow_mut()
                .store(index, value, series.begin_index());
        }

        value
    }
}

impl<F: Display> Display for Cached<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.formula, f)
    }
}

/// Marks an indicator as mid-evaluation for the lifetime of the guard.
struct Evaluating<'a>(&'a Cell<bool>);

impl<'a> Evaluating<'a> {
    fn enter(flag: &'a Cell<bool>, index: BarIndex) -> Self {
        assert!(
            !flag.replace(true),
            "indicator re-entered while computing index {index}: \
             self-referential formulas must be wrapped in RecursiveCached"
        );
        Self(flag)
    }
}

impl Drop for Evaluating<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
