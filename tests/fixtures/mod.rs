#![allow(dead_code)]

use quantedge_series::{Bar, BarSeries, Num, Timestamp};
use serde::{Deserialize, de::DeserializeOwned};
use std::num::NonZero;

/// One hour in milliseconds.
pub const HOUR: Timestamp = 3_600_000;

/// OHLCV bar parsed from the hourly CSV fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct RefBar {
    pub open_time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub buy_volume: f64,
}

impl RefBar {
    pub fn to_bar(&self) -> Bar {
        Bar::new(
            self.open_time,
            self.open_time + HOUR,
            self.open.into(),
            self.high.into(),
            self.low.into(),
            self.close.into(),
            self.volume.into(),
        )
        .with_buy_volume(self.buy_volume.into())
    }
}

/// Reference value with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefValue {
    pub open_time: u64,
    pub expected: f64,
}

const OHLCV_PATH: &str = "tests/fixtures/data/btcusdt-1h.csv";

/// Load the hourly OHLCV fixture.
pub fn load_reference_ohlcvs() -> Vec<RefBar> {
    load_records(OHLCV_PATH, "invalid OHLCV record")
}

/// Load single-value reference data, one row per fixture bar.
pub fn load_ref_values(path: &str) -> Vec<RefValue> {
    load_records(path, "invalid reference record")
}

pub fn series(maximum_bar_count: usize) -> BarSeries {
    BarSeries::builder()
        .name("btcusdt-1h")
        .maximum_bar_count(NonZero::new(maximum_bar_count).expect("non zero value"))
        .build()
}

/// Series holding the whole fixture.
pub fn full_series() -> BarSeries {
    let bars = load_reference_ohlcvs();
    let mut s = series(bars.len());
    for bar in &bars {
        s.add_bar(bar.to_bar(), false).expect("fixture bars are ordered");
    }
    s
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Creates perturbed versions of a bar to simulate live repaints.
///
/// Returns 2 intermediate bars (with shifted close/high/low) followed
/// by the original bar. All share the same begin and end time.
pub fn repaint_sequence(bar: &RefBar) -> Vec<RefBar> {
    vec![
        // First tick: only open is known, close near open
        RefBar {
            high: bar.open * 1.001,
            low: bar.open * 0.999,
            close: bar.open * 1.0005,
            volume: bar.volume - 2.0,
            ..bar.clone()
        },
        // Mid-bar: partial movement toward final values
        RefBar {
            high: bar.open.midpoint(bar.high),
            low: bar.open.midpoint(bar.low),
            close: bar.open.midpoint(bar.close),
            volume: bar.volume - 1.0,
            ..bar.clone()
        },
        // Final: real OHLCV values
        bar.clone(),
    ]
}

/// Feeds `bar` into the series as a live bar: appended on its first tick,
/// replaced in place on the following ones.
pub fn stream_with_repaints(series: &mut BarSeries, bar: &RefBar, mut on_tick: impl FnMut(&BarSeries)) {
    for (tick, update) in repaint_sequence(bar).iter().enumerate() {
        series
            .add_bar(update.to_bar(), tick > 0)
            .expect("repaint keeps end time");
        on_tick(series);
    }
}

pub fn num(value: f64) -> Num {
    Num::from(value)
}

/// Generate a full-history reference test for a single-value indicator.
///
/// Usage: `reference_test!(sma_20, Cached::new(Sma::new(..), ..), "tests/fixtures/data/sma-20-close.csv", 1e-6);`
#[allow(unused_macros)]
macro_rules! reference_test {
    ($name:ident, $indicator:expr, $ref_path:expr, $tolerance:expr) => {
        mod $name {
            use super::fixtures::*;
            use quantedge_series::*;
            use std::num::NonZero;

            fn nz(n: usize) -> NonZero<usize> {
                NonZero::new(n).unwrap()
            }

            #[test]
            fn matches_reference_streaming() {
                let bars = load_reference_ohlcvs();
                let reference = load_ref_values($ref_path);
                assert_eq!(bars.len(), reference.len());

                let mut s = series(bars.len());
                let ind = $indicator;

                for (bar, expected) in bars.iter().zip(&reference) {
                    assert_eq!(bar.open_time, expected.open_time);
                    s.add_bar(bar.to_bar(), false).unwrap();
                    assert_near(
                        ind.value(&s, s.end_index()).to_f64(),
                        expected.expected,
                        $tolerance,
                        &format!("{} at t={}", stringify!($name), bar.open_time),
                    );
                }
            }

            #[test]
            fn matches_reference_cold() {
                let reference = load_ref_values($ref_path);
                let s = full_series();
                let ind = $indicator;

                for i in (0..reference.len()).rev().step_by(7) {
                    let index = BarIndex::try_from(i).unwrap();
                    assert_near(
                        ind.value(&s, index).to_f64(),
                        reference[i].expected,
                        $tolerance,
                        &format!("{} at index {i}", stringify!($name)),
                    );
                }
            }

            #[test]
            fn repaint_matches_closed() {
                let bars = load_reference_ohlcvs();
                let mut closed_series = series(bars.len());
                let mut live_series = series(bars.len());
                let closed = $indicator;
                let live = $indicator;

                for (i, bar) in bars.iter().enumerate() {
                    closed_series.add_bar(bar.to_bar(), false).unwrap();
                    stream_with_repaints(&mut live_series, bar, |s| {
                        let _ = live.value(s, s.end_index());
                    });

                    let end = closed_series.end_index();
                    assert_near(
                        live.value(&live_series, end).to_f64(),
                        closed.value(&closed_series, end).to_f64(),
                        $tolerance,
                        &format!("{} repainted bar {i}", stringify!($name)),
                    );
                }
            }
        }
    };
}

#[allow(unused_imports)]
pub(crate) use reference_test;

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
