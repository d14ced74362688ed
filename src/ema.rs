use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{BarIndex, BarSeries, Formula, Indicator, Num};

/// Exponential Moving Average (EMA).
///
/// Seeded with the input value at the series' begin index, then
/// `ema(i) = ema(i - 1) + alpha * (input(i) - ema(i - 1))`.
///
/// The formula reads its own previous value, so wrap it in
/// [`RecursiveCached`](crate::RecursiveCached). Under
/// [`Uncached`](crate::Uncached) it recurses down to the begin index on
/// every call; under [`Cached`](crate::Cached) it panics.
///
/// # Example
///
/// ```rust
/// use quantedge_series::{Bar, BarSeries, CacheConfig, Ema, Indicator, PriceSource, RecursiveCached};
/// use std::num::NonZero;
///
/// let mut series = BarSeries::builder()
///     .maximum_bar_count(NonZero::new(10).unwrap())
///     .build();
/// let ema = RecursiveCached::new(
///     Ema::new(PriceSource::Close, NonZero::new(3).unwrap()),
///     CacheConfig::for_series(&series),
/// );
///
/// for (t, close) in [(1, 10.0), (2, 20.0), (3, 30.0)] {
///     let c = close.into();
///     series.add_bar(Bar::new(t - 1, t, c, c, c, c, 1.0.into()), false).unwrap();
/// }
///
/// // alpha = 0.5: 10, 15, 22.5
/// assert_eq!(ema.value(&series, 2).to_f64(), 22.5);
/// ```
#[derive(Clone, Debug)]
pub struct Ema<I> {
    input: I,
    length: usize,
    alpha: Num,
}

impl<I: Indicator> Ema<I> {
    /// Standard smoothing: `alpha = 2 / (length + 1)`.
    #[must_use]
    pub fn new(input: I, length: NonZero<usize>) -> Self {
        Self::with_alpha(input, length, Num::from(2) / (Num::from(to_u32(length)) + Num::ONE))
    }

    /// Wilder's smoothing (RMA): `alpha = 1 / length`.
    #[must_use]
    pub fn wilder(input: I, length: NonZero<usize>) -> Self {
        Self::with_alpha(input, length, Num::ONE / Num::from(to_u32(length)))
    }

    fn with_alpha(input: I, length: NonZero<usize>, alpha: Num) -> Self {
        Self {
            input,
            length: length.get(),
            alpha,
        }
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn alpha(&self) -> Num {
        self.alpha
    }
}

fn to_u32(length: NonZero<usize>) -> u32 {
    u32::try_from(length.get()).expect("EMA length must fit in u32")
}

impl<I: Indicator> Formula for Ema<I> {
    fn calculate(&self, series: &BarSeries, index: BarIndex, this: &dyn Indicator) -> Num {
        let value = self.input.value(series, index);
        if index == series.begin_index() {
            return value;
        }

        let prev = this.value(series, index - 1);
        prev + self.alpha * (value - prev)
    }
}

impl<I: Display> Display for Ema<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EMA({}, {})", self.length, self.input)
    }
}
