use std::rc::Rc;

use crate::{BarIndex, BarSeries, Num};

/// A technical indicator: a pure projection of a [`BarSeries`] at an index.
///
/// For a closed bar the value is stable: asking again for the same index
/// returns the same result. The value at the series' end index may change
/// while the newest bar is still forming.
///
/// Implementations may memoize internally (see [`Cached`] and
/// [`RecursiveCached`]), which is why evaluation takes `&self`. Always pass
/// the same series an indicator was built for: caches are keyed by index
/// only.
///
/// # Panics
///
/// Caching wrappers panic when `index` is outside
/// `[series.begin_index(), series.end_index()]`.
///
/// # Example
///
/// ```
/// use quantedge_series::{Bar, BarSeries, Indicator, Num, PriceSource};
/// use std::num::NonZero;
///
/// let mut series = BarSeries::builder()
///     .maximum_bar_count(NonZero::new(10).unwrap())
///     .build();
/// series
///     .add_bar(Bar::new(0, 60, 1.0.into(), 4.0.into(), 0.5.into(), 3.0.into(), 10.0.into()), false)
///     .unwrap();
///
/// assert_eq!(PriceSource::Close.value(&series, 0), Num::from(3.0));
/// assert_eq!(PriceSource::HL2.value(&series, 0), Num::from(2.25));
/// ```
///
/// [`Cached`]: crate::Cached
/// [`RecursiveCached`]: crate::RecursiveCached
pub trait Indicator {
    /// Value at `index`.
    fn value(&self, series: &BarSeries, index: BarIndex) -> Num;
}

/// The per-index computation behind a cached indicator.
///
/// `this` is the wrapper evaluating the formula. A self-referential formula
/// (EMA, Wilder smoothing) reads its own earlier values through
/// `this.value(series, index - 1)`; only [`RecursiveCached`] allows that.
/// Under [`Cached`] the same call is detected and panics.
///
/// A recursive formula must not read `this` at `series.begin_index()`:
/// there is no earlier value to read.
///
/// [`Cached`]: crate::Cached
/// [`RecursiveCached`]: crate::RecursiveCached
pub trait Formula {
    fn calculate(&self, series: &BarSeries, index: BarIndex, this: &dyn Indicator) -> Num;
}

impl<I: Indicator + ?Sized> Indicator for &I {
    #[inline]
    fn value(&self, series: &BarSeries, index: BarIndex) -> Num {
        (**self).value(series, index)
    }
}

impl<I: Indicator + ?Sized> Indicator for Box<I> {
    #[inline]
    fn value(&self, series: &BarSeries, index: BarIndex) -> Num {
        (**self).value(series, index)
    }
}

impl<I: Indicator + ?Sized> Indicator for Rc<I> {
    #[inline]
    fn value(&self, series: &BarSeries, index: BarIndex) -> Num {
        (**self).value(series, index)
    }
}
