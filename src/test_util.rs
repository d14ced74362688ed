// src/test_util.rs

use std::{cell::Cell, num::NonZero};

use crate::{Bar, BarIndex, BarSeries, Formula, Indicator, Num, PriceSource, Timestamp};

/// Asserts that two `f64` values are approximately equal using a
/// relative epsilon of `4 * f64::EPSILON`.
macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {{
        let (a, e): (f64, f64) = ($actual, $expected);
        assert!(
            (a - e).abs() <= e.abs() * 4.0 * f64::EPSILON,
            "assert_approx failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_approx;

pub fn nz(n: usize) -> NonZero<usize> {
    NonZero::new(n).unwrap()
}

/// Convenience: bar with just a close price (OHLC all equal) ending at `end_time`.
pub fn bar(close: f64, end_time: Timestamp) -> Bar {
    let price = Num::from(close);
    Bar::new(
        end_time.saturating_sub(1),
        end_time,
        price,
        price,
        price,
        price,
        Num::ONE,
    )
}

pub fn ohlc(open: f64, high: f64, low: f64, close: f64, end_time: Timestamp) -> Bar {
    Bar::new(
        end_time.saturating_sub(1),
        end_time,
        open.into(),
        high.into(),
        low.into(),
        close.into(),
        Num::ONE,
    )
}

pub fn series(maximum_bar_count: usize) -> BarSeries {
    BarSeries::builder()
        .maximum_bar_count(nz(maximum_bar_count))
        .build()
}

/// Series holding one close-only bar per value, end times `1..`.
pub fn series_of(maximum_bar_count: usize, closes: &[f64]) -> BarSeries {
    let mut s = series(maximum_bar_count);
    for &close in closes {
        push(&mut s, close);
    }
    s
}

/// Appends a close-only bar one millisecond after the current last bar.
pub fn push(series: &mut BarSeries, close: f64) {
    let end_time = series.last_bar().map_or(1, |b| b.end_time() + 1);
    series
        .add_bar(bar(close, end_time), false)
        .expect("bars are pushed in order");
}

/// Replaces the newest bar with a close-only bar at the same end time.
pub fn repaint(series: &mut BarSeries, close: f64) {
    let end_time = series.last_bar().expect("series has a bar").end_time();
    series
        .add_bar(bar(close, end_time), true)
        .expect("replacement keeps end time");
}

/// Close price formula that counts how often it is evaluated.
#[derive(Default)]
pub struct Probe {
    calls: Cell<usize>,
}

impl Probe {
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Formula for Probe {
    fn calculate(&self, series: &BarSeries, index: BarIndex, _this: &dyn Indicator) -> Num {
        self.calls.set(self.calls.get() + 1);
        PriceSource::Close.value(series, index)
    }
}

/// Deterministic zig-zag closes around 100 for window tests.
pub fn oscillating(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let step = f64::from(u32::try_from(i % 7).unwrap());
            if i % 2 == 0 { 100.0 + step } else { 100.0 - step }
        })
        .collect()
}
