//! # validate-streams Library
//!
//! Validation of the XML "streams" files that configure simulation input and
//! output: a lexical syntax check, per-stream attribute rules, cross-stream
//! uniqueness, `stream:NAME:ATTR` interval references, and lookup of the
//! output interval active at a given simulation time.

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod file_discovery;
pub mod inquiry;
pub mod interval;
pub mod output;
pub mod pattern;
pub mod reference;
pub mod scanner;
pub mod streams;
pub mod syntax;
pub mod validator;

pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use error::{PatternError, ReferenceError, StreamError, StreamsError, SyntaxError};
pub use file_discovery::{DiscoveryStats, FileDiscovery};
pub use inquiry::{StreamsFile, query_streams_file};
pub use interval::{IntervalRange, StreamRecord, TimeString, parse_streams};
pub use output::Output;
pub use pattern::{check_regex_match, filename_template_is_legal};
pub use reference::{extract_stream_interval, parse_reference};
pub use scanner::{TagScan, Tags, next_tag};
pub use streams::{
    FileSystem, LocalFileSystem, StreamIssue, StreamReport, StreamType, StreamValidator,
    resolve_intervals, uniqueness_check,
};
pub use syntax::{check_syntax, is_well_formed};
pub use validator::{
    ActiveInterval, Diagnostic, FileValidationResult, PerformanceMetrics, StreamSummary, ValidationConfig,
    ValidationEngine, ValidationResults, ValidationStatus, validate_document,
};
