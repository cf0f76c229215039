//! Interval Lookup Engine
//!
//! Stream records extracted from a parsed document, and the query that maps a
//! simulation timestamp to the output interval active at that time.

use std::fmt;

use roxmltree::Node;
use serde::{Deserialize, Serialize};

use crate::document::{STREAM_TAG, child, children};

/// Fixed-width timestamp such as `0005_00:00:00`.
///
/// Ordering is plain byte-wise comparison; callers pad to a consistent width.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeString(String);

impl TimeString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TimeString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for TimeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `[start, end)` window paired with the interval active inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRange {
    pub start: TimeString,
    /// `None` extends to the end of the simulation
    pub end: Option<TimeString>,
    pub interval: String,
}

impl IntervalRange {
    pub fn contains(&self, time: &str) -> bool {
        time >= self.start.as_str() && self.end.as_ref().is_none_or(|end| time < end.as_str())
    }

    fn from_node(range: Node<'_, '_>) -> Self {
        Self {
            start: TimeString::new(range.attribute("start").unwrap_or_default()),
            end: range
                .attribute("end")
                .filter(|end| !end.is_empty())
                .map(TimeString::from),
            interval: range.attribute("interval").unwrap_or_default().to_string(),
        }
    }
}

/// Interval configuration of one `<stream>` element
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamRecord {
    pub name: String,
    /// Raw `type` attribute; not validated here
    pub stream_type: String,
    pub filename_template: String,
    pub static_interval: Option<String>,
    /// Authoring order is preserved and significant
    pub ranges: Vec<IntervalRange>,
}

impl StreamRecord {
    pub fn from_node(stream: Node<'_, '_>) -> Self {
        let text = |attribute: &str| stream.attribute(attribute).unwrap_or_default().to_string();
        let ranges = child(stream, "output_interval")
            .map(|block| children(block, "range").map(IntervalRange::from_node).collect())
            .unwrap_or_default();

        Self {
            name: text("name"),
            stream_type: text("type"),
            filename_template: text("filename_template"),
            static_interval: stream.attribute("output_interval").map(str::to_string),
            ranges,
        }
    }

    /// Both a static interval and dynamic ranges are configured
    pub fn has_interval_conflict(&self) -> bool {
        self.static_interval.is_some() && !self.ranges.is_empty()
    }

    /// Interval active at `time`.
    ///
    /// Without ranges this is the static interval, or `""` when none is set.
    /// With ranges it is the interval of the first range, in stored order,
    /// containing `time`; `None` when no range does.
    pub fn get_output_interval(&self, time: &str) -> Option<&str> {
        if self.ranges.is_empty() {
            return Some(self.static_interval.as_deref().unwrap_or_default());
        }
        self.ranges
            .iter()
            .find(|range| range.contains(time))
            .map(|range| range.interval.as_str())
    }
}

/// Extract a record for every `<stream>` child of `root`, in document order.
///
/// `immutable_stream` elements carry no output cadence and are skipped.
pub fn parse_streams(root: Node<'_, '_>) -> Vec<StreamRecord> {
    children(root, STREAM_TAG).map(StreamRecord::from_node).collect()
}
