use std::{
    cell::Cell,
    fmt::{Debug, Display},
    num::NonZero,
};

use tracing::trace;

use crate::{BarIndex, BarSeries, Formula, Indicator, Num};

/// Which extreme a [`RollingExtrema`] tracks.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Extremum {
    Max,
    Min,
}

impl Extremum {
    /// Strict comparison: ties keep the incumbent. NaN never wins, and any
    /// number displaces a NaN incumbent.
    #[inline]
    fn beats(self, candidate: Num, incumbent: Num) -> bool {
        if candidate.is_nan() {
            return false;
        }
        if incumbent.is_nan() {
            return true;
        }
        match self {
            Self::Max => candidate > incumbent,
            Self::Min => candidate < incumbent,
        }
    }
}

impl Display for Extremum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Max => f.write_str("MAX"),
            Self::Min => f.write_str("MIN"),
        }
    }
}

/// Best value seen over the closed bars of an earlier tail scan.
#[derive(Clone, Copy, Debug)]
struct Memo {
    /// Last index covered by the scan.
    zone_end: BarIndex,
    value: Num,
    index: BarIndex,
}

/// Rolling maximum or minimum of an input indicator over the last
/// `bar_count` bars, clipped to the series' begin index.
///
/// Historical indices are answered by a direct scan of the window. The
/// series' end index, which streaming code asks for after every new bar,
/// reuses the best value found by the previous tail query: only bars closed
/// since then are scanned, so the cost per appended bar is O(1) amortized.
/// The memo is dropped as soon as its extreme leaves the window, falling
/// back to one full scan.
///
/// The memo only ever covers closed bars. The tail value itself is read on
/// every call, so replacing or updating the forming bar is always reflected.
///
/// NaN inputs are skipped: a NaN never becomes the extremum while any number
/// is in the window, and the result is NaN only when every value is NaN. A
/// plain strict `>`/`<` scan would instead keep a NaN met first, at the
/// tail.
///
/// # Example
///
/// ```
/// use quantedge_series::{Bar, BarSeries, Indicator, PriceSource, RollingExtrema, Uncached};
/// use std::num::NonZero;
///
/// let mut series = BarSeries::builder()
///     .maximum_bar_count(NonZero::new(100).unwrap())
///     .build();
/// let highest = Uncached::new(RollingExtrema::max(PriceSource::Close, NonZero::new(3).unwrap()));
///
/// let mut seen = Vec::new();
/// for (t, close) in [(1, 5.0), (2, 3.0), (3, 8.0), (4, 1.0), (5, 1.0)] {
///     let c = close.into();
///     series.add_bar(Bar::new(t - 1, t, c, c, c, c, 1.0.into()), false).unwrap();
///     seen.push(highest.value(&series, series.end_index()).to_f64());
/// }
///
/// assert_eq!(seen, vec![5.0, 5.0, 8.0, 8.0, 8.0]);
/// ```
#[derive(Debug)]
pub struct RollingExtrema<I> {
    input: I,
    bar_count: usize,
    extremum: Extremum,
    memo: Cell<Option<Memo>>,
}

impl<I: Indicator> RollingExtrema<I> {
    #[must_use]
    pub fn new(input: I, bar_count: NonZero<usize>, extremum: Extremum) -> Self {
        Self {
            input,
            bar_count: bar_count.get(),
            extremum,
            memo: Cell::new(None),
        }
    }

    /// Highest value over the window.
    #[must_use]
    pub fn max(input: I, bar_count: NonZero<usize>) -> Self {
        Self::new(input, bar_count, Extremum::Max)
    }

    /// Lowest value over the window.
    #[must_use]
    pub fn min(input: I, bar_count: NonZero<usize>) -> Self {
        Self::new(input, bar_count, Extremum::Min)
    }

    #[must_use]
    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    #[must_use]
    pub fn extremum(&self) -> Extremum {
        self.extremum
    }

    #[inline]
    fn window_start(&self, series: &BarSeries, index: BarIndex) -> BarIndex {
        let span = BarIndex::try_from(self.bar_count).unwrap_or(BarIndex::MAX);
        series.begin_index().max(index - span + 1)
    }

    /// Best `(value, index)` over `[from, to]`, scanning newest first.
    fn scan(&self, series: &BarSeries, from: BarIndex, to: BarIndex) -> Option<(Num, BarIndex)> {
        let mut best: Option<(Num, BarIndex)> = None;

        for i in (from..=to).rev() {
            let value = self.input.value(series, i);
            match best {
                Some((incumbent, _)) if !self.extremum.beats(value, incumbent) => {}
                _ => best = Some((value, i)),
            }
        }

        best
    }

    fn tail(&self, series: &BarSeries, index: BarIndex) -> Num {
        let window_start = self.window_start(series, index);

        let mut memo = self.memo.get();
        if let Some(expired) = memo.filter(|m| m.index < window_start) {
            trace!(
                expired_index = expired.index,
                window_start, "rolling extrema memo expired"
            );
            memo = None;
        }

        let scan_from = memo.map_or(window_start, |m| window_start.max(m.zone_end + 1));
        let closed = self.scan(series, scan_from, index - 1);

        let best = match (memo, closed) {
            // Ties go to the newer index so the memo expires as late as possible.
            (Some(m), Some((value, i))) if !self.extremum.beats(m.value, value) => {
                Some((value, i))
            }
            (Some(m), _) => Some((m.value, m.index)),
            (None, closed) => closed,
        };

        self.memo.set(best.map(|(value, i)| Memo {
            zone_end: index - 1,
            value,
            index: i,
        }));

        let current = self.input.value(series, index);
        match best {
            Some((value, _)) if !self.extremum.beats(current, value) => value,
            _ => current,
        }
    }
}

impl<I: Indicator> Formula for RollingExtrema<I> {
    fn calculate(&self, series: &BarSeries, index: BarIndex, _this: &dyn Indicator) -> Num {
        if index == series.end_index() {
            return self.tail(series, index);
        }

        let window_start = self.window_start(series, index);
        self.scan(series, window_start, index)
            .map_or(Num::NAN, |(value, _)| value)
    }
}

impl<I: Display> Display for RollingExtrema<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}, {})", self.extremum, self.bar_count, self.input)
    }
}
