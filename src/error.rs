//! Bar series error types.

use thiserror::Error;

use crate::Timestamp;

/// Rejected [`BarSeries`](crate::BarSeries) mutation.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum SeriesError {
    /// Appended bar does not end strictly after the current last bar.
    #[error("cannot add a bar with end time {end_time} that is <= series end time {series_end_time}")]
    NotAfterLastBar {
        /// End time of the rejected bar.
        end_time: Timestamp,
        /// End time of the current last bar.
        series_end_time: Timestamp,
    },

    /// Replacement bar does not end strictly after the bar before the one it
    /// replaces.
    #[error(
        "cannot replace the last bar with end time {end_time} that is <= previous bar end time {previous_end_time}"
    )]
    NotAfterPreviousBar {
        /// End time of the rejected replacement.
        end_time: Timestamp,
        /// End time of the second-to-last bar.
        previous_end_time: Timestamp,
    },

    /// Operation needs a last bar but the series holds none.
    #[error("series is empty")]
    Empty,
}
