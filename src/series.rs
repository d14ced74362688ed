use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use tracing::{debug, trace};

use crate::{Bar, BarIndex, BoundedIndexedBuffer, Num, SeriesError};

const UNNAMED_SERIES: &str = "unnamed_series";

/// Time-ordered, capacity-bounded sequence of [`Bar`]s.
///
/// Bars are addressed by a global index that keeps increasing for the life of
/// the series. Once [`maximum_bar_count`](Self::maximum_bar_count) bars are
/// held, each append evicts the oldest one, so memory stays fixed while
/// indicators can still read any bar in `[begin_index, end_index]`.
///
/// The newest bar may still be forming. Replace it with
/// [`add_bar(bar, true)`](Self::add_bar) or feed ticks through
/// [`add_price`](Self::add_price); every older bar is final.
///
/// # Example
///
/// ```
/// use quantedge_series::{Bar, BarSeries, Num};
/// use std::num::NonZero;
///
/// let mut series = BarSeries::builder()
///     .name("btcusdt-1m")
///     .maximum_bar_count(NonZero::new(2).unwrap())
///     .build();
///
/// for end in [60, 120, 180] {
///     series.add_bar(Bar::empty(end - 60, end), false).unwrap();
/// }
///
/// assert_eq!(series.bar_count(), 2);
/// assert_eq!(series.begin_index(), 1);
/// assert_eq!(series.end_index(), 2);
/// assert!(series.add_bar(Bar::empty(120, 180), false).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct BarSeries {
    name: String,
    bars: BoundedIndexedBuffer<Bar>,
}

impl BarSeries {
    #[must_use]
    pub fn builder() -> BarSeriesBuilder {
        BarSeriesBuilder::new()
    }

    /// Appends a bar, or replaces the newest one when `replace` is set.
    ///
    /// # Errors
    ///
    /// Without `replace`: [`SeriesError::NotAfterLastBar`] unless the bar ends
    /// strictly after the current last bar.
    ///
    /// With `replace`: [`SeriesError::NotAfterPreviousBar`] when at least two
    /// bars are held and the replacement does not end strictly after the
    /// second-to-last bar. Replacing never moves the index window. On an empty
    /// series the bar is simply appended.
    pub fn add_bar(&mut self, bar: Bar, replace: bool) -> Result<(), SeriesError> {
        let end_index = self.end_index();

        if replace && !self.bars.is_empty() {
            if self.bars.len() >= 2 {
                let previous_end_time = self.bars.get(end_index - 1).end_time();
                if bar.end_time() <= previous_end_time {
                    debug!(
                        series = %self.name,
                        end_time = bar.end_time(),
                        previous_end_time,
                        "rejected bar replacement"
                    );
                    return Err(SeriesError::NotAfterPreviousBar {
                        end_time: bar.end_time(),
                        previous_end_time,
                    });
                }
            }

            trace!(series = %self.name, index = end_index, "replaced last bar");
            self.bars.set(end_index, bar);
            return Ok(());
        }

        if let Some(last) = self.bars.last() {
            let series_end_time = last.end_time();
            if bar.end_time() <= series_end_time {
                debug!(
                    series = %self.name,
                    end_time = bar.end_time(),
                    series_end_time,
                    "rejected out of order bar"
                );
                return Err(SeriesError::NotAfterLastBar {
                    end_time: bar.end_time(),
                    series_end_time,
                });
            }
        }

        self.bars.add(bar);
        trace!(series = %self.name, index = self.end_index(), "appended bar");

        Ok(())
    }

    /// Folds a live tick into the newest bar.
    ///
    /// # Errors
    ///
    /// [`SeriesError::Empty`] when the series holds no bar.
    pub fn add_price(&mut self, price: Num) -> Result<(), SeriesError> {
        if self.bars.is_empty() {
            return Err(SeriesError::Empty);
        }

        let end_index = self.end_index();
        self.bars.get_mut(end_index).add_price(price);

        Ok(())
    }

    /// # Panics
    ///
    /// Panics if `index` is outside `[begin_index, end_index]`. Evicted bars
    /// are never served.
    #[inline]
    #[must_use]
    pub fn get_bar(&self, index: BarIndex) -> &Bar {
        self.bars.get(index)
    }

    #[inline]
    #[must_use]
    pub fn first_bar(&self) -> Option<&Bar> {
        (!self.is_empty()).then(|| self.get_bar(self.begin_index()))
    }

    #[inline]
    #[must_use]
    pub fn last_bar(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Snapshot of all retained bars, oldest first.
    #[must_use]
    pub fn bar_data(&self) -> Vec<Bar> {
        self.bars.iter().cloned().collect()
    }

    /// Number of retained bars.
    #[inline]
    #[must_use]
    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Index of the oldest retained bar, `-1` when empty.
    #[inline]
    #[must_use]
    pub fn begin_index(&self) -> BarIndex {
        self.bars.begin_index()
    }

    /// Index of the newest bar, `-1` when empty.
    #[inline]
    #[must_use]
    pub fn end_index(&self) -> BarIndex {
        self.bars.end_index()
    }

    #[inline]
    #[must_use]
    pub fn contains_index(&self, index: BarIndex) -> bool {
        self.bars.contains(index)
    }

    #[inline]
    #[must_use]
    pub fn maximum_bar_count(&self) -> usize {
        self.bars.window()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `"<first end time> - <last end time>"`, empty for an empty series.
    #[must_use]
    pub fn period_description(&self) -> String {
        match (self.first_bar(), self.last_bar()) {
            (Some(first), Some(last)) => format!("{} - {}", first.end_time(), last.end_time()),
            _ => String::new(),
        }
    }

    #[inline]
    pub(crate) fn check_index(&self, index: BarIndex) {
        assert!(
            self.contains_index(index),
            "index {index} outside series window [{}, {}]",
            self.begin_index(),
            self.end_index(),
        );
    }
}

impl Display for BarSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BarSeries({}, {}/{})",
            self.name,
            self.bar_count(),
            self.maximum_bar_count()
        )
    }
}

/// Builder for [`BarSeries`].
///
/// Defaults: name = `"unnamed_series"`.
/// Maximum bar count must be set before calling [`build`](Self::build).
pub struct BarSeriesBuilder {
    name: String,
    maximum_bar_count: Option<usize>,
}

impl BarSeriesBuilder {
    fn new() -> Self {
        Self {
            name: UNNAMED_SERIES.to_owned(),
            maximum_bar_count: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of bars retained before the oldest is evicted.
    #[must_use]
    pub fn maximum_bar_count(mut self, count: NonZero<usize>) -> Self {
        self.maximum_bar_count.replace(count.get());
        self
    }

    /// Builds an empty series. Panics if the maximum bar count is missing.
    #[must_use]
    pub fn build(self) -> BarSeries {
        let maximum_bar_count = self
            .maximum_bar_count
            .expect("maximum_bar_count is required");

        BarSeries {
            name: self.name,
            bars: BoundedIndexedBuffer::new(maximum_bar_count),
        }
    }
}
