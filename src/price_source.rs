use crate::{Bar, BarIndex, BarSeries, Indicator, Num};

use std::fmt::{Debug, Display};

/// Value extracted from each [`Bar`] of a series.
///
/// Stateless leaf indicator: reads the bar at the requested index (and the
/// previous close for [`TrueRange`](PriceSource::TrueRange)). Feed it into
/// smoothing formulas such as [`Sma`](crate::Sma) and [`Ema`](crate::Ema).
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub enum PriceSource {
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Closing price.
    #[default]
    Close,
    /// Lowest price.
    Low,
    /// Traded volume.
    Volume,
    /// Taker buy volume.
    BuyVolume,
    /// Median price: `(high + low) / 2`.
    HL2,
    /// Typical price: `(high + low + close) / 3`.
    HLC3,
    /// Average price: `(open + high + low + close) / 4`.
    OHLC4,
    /// Weighted close: `(high + low + close + close) / 4`.
    HLCC4,
    /// True range: `max(high - low, |high - prev_close|, |low - prev_close|)`.
    ///
    /// On the oldest retained bar (no previous close), falls back to `high - low`.
    TrueRange,
}

impl Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl PriceSource {
    #[inline]
    pub(crate) fn extract(self, bar: &Bar, prev_close: Option<Num>) -> Num {
        match self {
            Self::Open => bar.open(),
            Self::High => bar.high(),
            Self::Close => bar.close(),
            Self::Low => bar.low(),
            Self::Volume => bar.volume(),
            Self::BuyVolume => bar.buy_volume(),
            Self::HL2 => (bar.high() + bar.low()) / Num::from(2),
            Self::HLC3 => (bar.high() + bar.low() + bar.close()) / Num::from(3),
            Self::OHLC4 => (bar.open() + bar.high() + bar.low() + bar.close()) / Num::from(4),
            Self::HLCC4 => (bar.high() + bar.low() + bar.close() + bar.close()) / Num::from(4),
            Self::TrueRange => {
                let hl = bar.high() - bar.low();

                match prev_close {
                    Some(prev_close) => {
                        let hc = (bar.high() - prev_close).abs();
                        let lc = (bar.low() - prev_close).abs();
                        hl.max(hc.max(lc))
                    }
                    None => hl,
                }
            }
        }
    }
}

impl Indicator for PriceSource {
    #[inline]
    fn value(&self, series: &BarSeries, index: BarIndex) -> Num {
        let bar = series.get_bar(index);
        let prev_close = (*self == Self::TrueRange && index > series.begin_index())
            .then(|| series.get_bar(index - 1).close());

        self.extract(bar, prev_close)
    }
}
