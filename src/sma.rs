use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{BarIndex, BarSeries, Formula, Indicator, Num};

/// Simple Moving Average (SMA).
///
/// Unweighted mean of the input over the last *n* bars. Near the series'
/// begin index the window is clipped to the bars that are available, so the
/// first value equals the input and no index yields `NaN` for lack of
/// history.
///
/// # Example
///
/// ```rust
/// use quantedge_series::{Bar, BarSeries, Cached, CacheConfig, Indicator, PriceSource, Sma};
/// use std::num::NonZero;
///
/// let mut series = BarSeries::builder()
///     .maximum_bar_count(NonZero::new(10).unwrap())
///     .build();
/// for (t, close) in [(1, 10.0), (2, 20.0), (3, 30.0), (4, 40.0)] {
///     let c = close.into();
///     series.add_bar(Bar::new(t - 1, t, c, c, c, c, 1.0.into()), false).unwrap();
/// }
///
/// let sma = Cached::new(Sma::new(PriceSource::Close, NonZero::new(3).unwrap()), CacheConfig::mini());
///
/// assert_eq!(sma.value(&series, 0).to_f64(), 10.0);
/// assert_eq!(sma.value(&series, 1).to_f64(), 15.0);
/// assert_eq!(sma.value(&series, 3).to_f64(), 30.0);
/// ```
#[derive(Clone, Debug)]
pub struct Sma<I> {
    input: I,
    length: usize,
}

impl<I: Indicator> Sma<I> {
    #[must_use]
    pub fn new(input: I, length: NonZero<usize>) -> Self {
        Self {
            input,
            length: length.get(),
        }
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn input(&self) -> &I {
        &self.input
    }
}

impl<I: Indicator> Formula for Sma<I> {
    fn calculate(&self, series: &BarSeries, index: BarIndex, _this: &dyn Indicator) -> Num {
        let span = BarIndex::try_from(self.length).unwrap_or(BarIndex::MAX);
        let from = series.begin_index().max(index - span + 1);

        let sum = (from..=index).fold(Num::ZERO, |sum, i| sum + self.input.value(series, i));

        let count = u32::try_from(index - from + 1).expect("SMA window must fit in u32");
        sum / Num::from(count)
    }
}

impl<I: Display> Display for Sma<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SMA({}, {})", self.length, self.input)
    }
}
