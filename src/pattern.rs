//! Anchored pattern matching used for filename template legality.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::PatternError;

/// Longest anchored pattern the matcher accepts, in bytes
pub const MAX_PATTERN_LEN: usize = 1024;

/// Substitution letters a filename template may use after `$`:
/// year, month, day of month, day of year, hour, minute, second.
pub const FILENAME_VARIABLES: &str = "YMDdhms";

/// Allow-list for filename templates. Any `$` followed by a letter must be
/// one of [`FILENAME_VARIABLES`]; other characters are unconstrained.
pub const FILENAME_TEMPLATE_PATTERN: &str = r"(?:[^$]|\$[YMDdhms]|\$[^A-Za-z]|\$$)*";

/// Cached anchored form of [`FILENAME_TEMPLATE_PATTERN`]
static FILENAME_TEMPLATE_REGEX: OnceLock<Result<Regex, PatternError>> = OnceLock::new();

fn get_filename_template_regex() -> Result<&'static Regex, PatternError> {
    FILENAME_TEMPLATE_REGEX
        .get_or_init(|| compile_anchored(FILENAME_TEMPLATE_PATTERN))
        .as_ref()
        .map_err(Clone::clone)
}

/// Compile `pattern` anchored at both ends, enforcing [`MAX_PATTERN_LEN`].
fn compile_anchored(pattern: &str) -> Result<Regex, PatternError> {
    let length = pattern.len() + 2;
    if length > MAX_PATTERN_LEN {
        return Err(PatternError::TooLong {
            length,
            limit: MAX_PATTERN_LEN,
        });
    }

    Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| PatternError::Invalid {
        details: e.to_string(),
    })
}

/// Match `subject` against `pattern` anchored at both ends.
///
/// `Ok(false)` is a plain non-match. A pattern that fails to compile, or
/// whose anchored form exceeds [`MAX_PATTERN_LEN`], is an error.
pub fn check_regex_match(pattern: &str, subject: &str) -> Result<bool, PatternError> {
    Ok(compile_anchored(pattern)?.is_match(subject))
}

/// Whether every `$` variable in `template` is a legal time substitution.
///
/// The allow-list is compiled once and shared by every call.
pub fn filename_template_is_legal(template: &str) -> Result<bool, PatternError> {
    if !template.contains('$') {
        return Ok(true);
    }
    Ok(get_filename_template_regex()?.is_match(template))
}
