//! Bounded bar series with cached, index-addressed technical indicators.
//!
//! A [`BarSeries`] keeps the newest `maximum_bar_count` bars of a market
//! feed. Bars carry a global [`BarIndex`] that never shifts: once the oldest
//! bars are evicted, [`begin_index`](BarSeries::begin_index) moves forward
//! while every retained bar keeps its index.
//!
//! Indicators are projections of a series at an index. Pure per-index logic
//! is written as a [`Formula`] and wrapped in one of three evaluators:
//!
//! - [`Uncached`] evaluates on every call.
//! - [`Cached`] memoizes into a small recent-values cache or a full sliding
//!   window ([`CacheConfig`]).
//! - [`RecursiveCached`] serves formulas defined in terms of their own
//!   previous value ([`Ema`]), filling missing history iteratively.
//!
//! The value at the series' end index belongs to a bar that may still
//! change, so it is recomputed on each call unless tail caching is enabled.
//! [`RollingExtrema`] keeps streaming tail reads O(1) amortized without
//! caching the tail itself.

mod bar;
mod cache;
mod ema;
mod error;
mod extrema;
mod indicator;
mod num;
mod price_source;
mod recursive;
mod ring_buffer;
mod series;
mod sma;

pub use crate::bar::{Bar, Timestamp};
pub use crate::error::SeriesError;
pub use crate::indicator::{Formula, Indicator};
pub use crate::num::Num;
pub use crate::price_source::PriceSource;
pub use crate::ring_buffer::{BarIndex, BoundedIndexedBuffer, capacity_for};
pub use crate::series::{BarSeries, BarSeriesBuilder};

pub use crate::cache::{
    CacheConfig, CacheConfigBuilder, CacheMode, Cached, DEFAULT_MINI_SLOTS, Uncached,
};
pub use crate::recursive::RecursiveCached;

pub use crate::ema::Ema;
pub use crate::extrema::{Extremum, RollingExtrema};
pub use crate::sma::Sma;

#[cfg(test)]
mod test_util;

#[cfg(test)]
mod composition {
    use super::{
        BarSeries, CacheConfig, Cached, Ema, Indicator, PriceSource, RecursiveCached,
        RollingExtrema, Sma, Uncached,
    };
    use crate::test_util::{assert_approx, nz, oscillating, push, series};
    use std::rc::Rc;

    #[test]
    fn shared_input_feeds_several_consumers() {
        let mut s: BarSeries = series(32);
        let sma = Rc::new(Cached::new(
            Sma::new(PriceSource::Close, nz(3)),
            CacheConfig::full(nz(32)),
        ));
        let highest = Uncached::new(RollingExtrema::max(Rc::clone(&sma), nz(5)));
        let smoothed = RecursiveCached::new(
            Ema::new(Rc::clone(&sma), nz(4)),
            CacheConfig::full(nz(32)),
        );

        for close in oscillating(20) {
            push(&mut s, close);
            let end = s.end_index();
            let from = s.begin_index().max(end - 4);
            let expected = (from..=end)
                .map(|i| sma.value(&s, i).to_f64())
                .fold(f64::NEG_INFINITY, f64::max);
            assert_approx!(highest.value(&s, end).to_f64(), expected);
            assert!(!smoothed.value(&s, end).is_nan());
        }
    }

    #[test]
    fn boxed_indicators_are_interchangeable() {
        let s = crate::test_util::series_of(8, &[1.0, 2.0, 3.0]);
        let all: Vec<Box<dyn Indicator>> = vec![
            Box::new(PriceSource::Close),
            Box::new(Uncached::new(Sma::new(PriceSource::Close, nz(3)))),
            Box::new(Uncached::new(RollingExtrema::min(PriceSource::Close, nz(3)))),
        ];
        let values: Vec<f64> = all.iter().map(|ind| ind.value(&s, 2).to_f64()).collect();
        assert_eq!(values, vec![3.0, 2.0, 1.0]);
    }
}
