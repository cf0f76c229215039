use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum StreamsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("XML parse error: {file}:{line} - {details}")]
    XmlParse {
        file: PathBuf,
        line: usize,
        details: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Concurrent operation error: {details}")]
    Concurrency { details: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Lexical failures reported by the syntax checker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("tag starting on line {line} is missing its closing '>'")]
    UnterminatedTag { line: usize },

    #[error("comment starting on line {line} is never terminated")]
    UnterminatedComment { line: usize },

    #[error("unmatched '>' on line {line}")]
    StrayCloseBracket { line: usize },

    #[error("unexpected '<' inside tag starting on line {line}")]
    BracketInTag { line: usize },

    #[error("unbalanced quotes in tag starting on line {line}")]
    UnbalancedQuotes { line: usize },

    #[error("empty tag on line {line}")]
    EmptyTag { line: usize },

    #[error("closing tag </{found}> on line {line} does not match opening tag <{expected}>")]
    MismatchedClosingTag {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("closing tag </{found}> on line {line} has no matching opening tag")]
    UnexpectedClosingTag { found: String, line: usize },

    #[error("tag <{name}> opened on line {line} is never closed")]
    UnclosedTag { name: String, line: usize },
}

impl SyntaxError {
    /// Line on which the offending construct starts
    pub fn line(&self) -> usize {
        match self {
            SyntaxError::UnterminatedTag { line }
            | SyntaxError::UnterminatedComment { line }
            | SyntaxError::StrayCloseBracket { line }
            | SyntaxError::BracketInTag { line }
            | SyntaxError::UnbalancedQuotes { line }
            | SyntaxError::EmptyTag { line }
            | SyntaxError::MismatchedClosingTag { line, .. }
            | SyntaxError::UnexpectedClosingTag { line, .. }
            | SyntaxError::UnclosedTag { line, .. } => *line,
        }
    }
}

/// Structural and referential problems found on a single stream element
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("stream is missing the '{attribute}' attribute")]
    MissingAttribute { attribute: &'static str },

    #[error("stream type '{value}' must be one of input, output, input;output or none")]
    InvalidType { value: String },

    #[error("stream of type '{stream_type}' is missing '{attribute}'")]
    MissingInterval {
        stream_type: String,
        attribute: &'static str,
    },

    #[error("stream has both an output_interval attribute and an <output_interval> range block")]
    ConflictingIntervals,

    #[error("filename template '{template}' uses an illegal substitution variable")]
    IllegalFilenameVariable { template: String },

    #[error("filename template '{template}' could not be checked: {source}")]
    PatternFailure {
        template: String,
        #[source]
        source: PatternError,
    },

    #[error("file '{path}' referenced by the stream does not exist")]
    MissingReferencedFile { path: PathBuf },

    #[error("immutable stream may not contain a <{element}> element")]
    FieldInImmutableStream { element: String },

    #[error("stream name '{name}' is used by more than one stream")]
    DuplicateName { name: String },

    #[error("output streams '{first}' and '{second}' both write '{template}'")]
    DuplicateOutputFilename {
        first: String,
        second: String,
        template: String,
    },

    #[error("cannot resolve '{attribute}': {source}")]
    Reference {
        attribute: String,
        #[source]
        source: ReferenceError,
    },
}

/// Failures of a `stream:NAME:ATTR` interval reference
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("stream '{stream}' refers to itself")]
    SelfReference { stream: String },

    #[error("referenced stream '{stream}' is not defined")]
    UndefinedStream { stream: String },

    #[error("'{attribute}' is not an interval attribute")]
    NotAnIntervalAttribute { attribute: String },

    #[error("referenced stream '{stream}' has no '{attribute}' attribute")]
    MissingAttribute { stream: String, attribute: String },

    #[error("'{value}' of stream '{stream}' is not a concrete interval")]
    Unexpandable { stream: String, value: String },
}

/// Pattern matcher failures, distinct from a plain non-match
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("anchored pattern is {length} bytes, limit is {limit}")]
    TooLong { length: usize, limit: usize },

    #[error("invalid pattern: {details}")]
    Invalid { details: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, StreamsError>;
