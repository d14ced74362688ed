use std::{
    fmt::{Debug, Display},
    time::Duration,
};

use crate::Num;

/// Bar boundary timestamp in epoch milliseconds.
pub type Timestamp = u64;

/// One aggregated OHLCV observation over `[begin_time, end_time)`.
///
/// Closed bars are immutable. The newest bar of a [`BarSeries`] may still be
/// forming: [`add_price`](Bar::add_price) folds live ticks into it until the
/// next bar is appended.
///
/// # Example
///
/// ```
/// use quantedge_series::{Bar, Num};
///
/// let bar = Bar::new(0, 60_000, 10.0.into(), 12.0.into(), 9.0.into(), 11.0.into(), 5.0.into());
///
/// assert!(bar.is_bullish());
/// assert_eq!(bar.period().as_secs(), 60);
/// assert!(bar.in_period(59_999));
/// assert!(!bar.in_period(60_000));
/// ```
///
/// [`BarSeries`]: crate::BarSeries
#[derive(Clone, PartialEq, Debug)]
pub struct Bar {
    begin_time: Timestamp,
    end_time: Timestamp,
    open: Num,
    high: Num,
    low: Num,
    close: Num,
    volume: Num,
    buy_volume: Num,
}

impl Bar {
    #[must_use]
    pub fn new(
        begin_time: Timestamp,
        end_time: Timestamp,
        open: Num,
        high: Num,
        low: Num,
        close: Num,
        volume: Num,
    ) -> Self {
        Self {
            begin_time,
            end_time,
            open,
            high,
            low,
            close,
            volume,
            buy_volume: Num::ZERO,
        }
    }

    /// Empty bar for the given period: prices are NaN until the first tick.
    #[must_use]
    pub fn empty(begin_time: Timestamp, end_time: Timestamp) -> Self {
        Self::new(
            begin_time,
            end_time,
            Num::NAN,
            Num::NAN,
            Num::NAN,
            Num::NAN,
            Num::ZERO,
        )
    }

    /// Sets the taker buy volume.
    #[must_use]
    pub fn with_buy_volume(mut self, buy_volume: Num) -> Self {
        self.buy_volume = buy_volume;
        self
    }

    #[inline]
    #[must_use]
    pub fn begin_time(&self) -> Timestamp {
        self.begin_time
    }

    #[inline]
    #[must_use]
    pub fn end_time(&self) -> Timestamp {
        self.end_time
    }

    #[inline]
    #[must_use]
    pub fn open(&self) -> Num {
        self.open
    }

    #[inline]
    #[must_use]
    pub fn high(&self) -> Num {
        self.high
    }

    #[inline]
    #[must_use]
    pub fn low(&self) -> Num {
        self.low
    }

    #[inline]
    #[must_use]
    pub fn close(&self) -> Num {
        self.close
    }

    #[inline]
    #[must_use]
    pub fn volume(&self) -> Num {
        self.volume
    }

    #[inline]
    #[must_use]
    pub fn buy_volume(&self) -> Num {
        self.buy_volume
    }

    /// Length of the bar period. Zero if `end_time` precedes `begin_time`.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.end_time.saturating_sub(self.begin_time))
    }

    /// Whether `timestamp` falls inside `[begin_time, end_time)`.
    #[must_use]
    pub fn in_period(&self, timestamp: Timestamp) -> bool {
        self.begin_time <= timestamp && timestamp < self.end_time
    }

    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.open < self.close
    }

    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Folds a live tick into the bar.
    ///
    /// The first tick of an empty bar sets the open. Every tick moves the
    /// close and widens high/low.
    pub fn add_price(&mut self, price: Num) {
        if self.open.is_nan() {
            self.open = price;
        }
        self.close = price;
        if self.high.is_nan() || self.high < price {
            self.high = price;
        }
        if self.low.is_nan() || self.low > price {
            self.low = price;
        }
    }
}

impl Display for Bar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bar(end: {}, O: {}, H: {}, L: {}, C: {}, V: {})",
            self.end_time, self.open, self.high, self.low, self.close, self.volume
        )
    }
}
