//! Interval Reference Resolver
//!
//! An interval attribute either holds a literal interval or borrows the value
//! of another stream's interval attribute through `stream:NAME:ATTR`. Exactly
//! one level of indirection is followed; a reference whose target is not a
//! concrete literal is an error rather than a further lookup.

use std::sync::OnceLock;

use regex::Regex;
use roxmltree::Node;

use crate::document::find_stream;
use crate::error::ReferenceError;

/// Attributes that may carry an interval or a reference to one
pub const INTERVAL_ATTRIBUTES: [&str; 2] = ["input_interval", "output_interval"];

/// Cached regex for `stream:NAME:ATTR` references
static REFERENCE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Cached regex for `[[[[Y-]M-]D_]h:]m:s` intervals
static INTERVAL_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_reference_regex() -> &'static Regex {
    REFERENCE_REGEX.get_or_init(|| {
        Regex::new(r"^stream:([^:]+):([^:]+)$").expect("Failed to compile reference regex")
    })
}

fn get_interval_regex() -> &'static Regex {
    INTERVAL_REGEX.get_or_init(|| {
        Regex::new(r"^(\d+-)?(\d+-)?(\d+_)?(\d+:)?(\d+:)?\d+(\.\d+)?$")
            .expect("Failed to compile interval regex")
    })
}

/// A parsed `stream:NAME:ATTR` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamReference<'a> {
    pub stream: &'a str,
    pub attribute: &'a str,
}

/// Split `value` into its stream and attribute parts, if it is a reference.
pub fn parse_reference(value: &str) -> Option<StreamReference<'_>> {
    let captures = get_reference_regex().captures(value)?;
    let stream = captures.get(1)?.as_str();
    let attribute = captures.get(2)?.as_str();
    Some(StreamReference { stream, attribute })
}

/// `none`, `initial_only`, or a time interval such as `0_06:00:00`
pub fn is_interval_literal(value: &str) -> bool {
    matches!(value, "none" | "initial_only") || get_interval_regex().is_match(value)
}

pub fn is_interval_attribute(attribute: &str) -> bool {
    INTERVAL_ATTRIBUTES.contains(&attribute)
}

/// Resolve the interval attribute `attribute` of `current_stream`, whose raw
/// value is `value`, against the streams under `root`.
///
/// Literals come back unchanged. A reference yields the referenced stream's
/// literal attribute value.
pub fn extract_stream_interval<'a>(
    value: &'a str,
    attribute: &str,
    current_stream: &str,
    root: Node<'a, '_>,
) -> Result<&'a str, ReferenceError> {
    let Some(reference) = parse_reference(value) else {
        return Ok(value);
    };

    if reference.stream == current_stream {
        return Err(ReferenceError::SelfReference {
            stream: current_stream.to_string(),
        });
    }

    let target = find_stream(root, reference.stream).ok_or_else(|| ReferenceError::UndefinedStream {
        stream: reference.stream.to_string(),
    })?;

    if !is_interval_attribute(reference.attribute) {
        return Err(ReferenceError::NotAnIntervalAttribute {
            attribute: reference.attribute.to_string(),
        });
    }

    let resolved = target
        .attribute(reference.attribute)
        .ok_or_else(|| ReferenceError::MissingAttribute {
            stream: reference.stream.to_string(),
            attribute: reference.attribute.to_string(),
        })?;

    if !is_interval_literal(resolved) {
        return Err(ReferenceError::Unexpandable {
            stream: reference.stream.to_string(),
            value: resolved.to_string(),
        });
    }

    tracing::trace!(
        stream = current_stream,
        attribute,
        target = reference.stream,
        resolved,
        "interval reference resolved"
    );
    Ok(resolved)
}
