//! Stream Attribute Validator
//!
//! Semantic checks over the `<stream>` and `<immutable_stream>` elements of a
//! parsed streams document:
//! - **attribute check**: required attributes, legal `type`, interval
//!   attributes matching the stream direction, legal filename template
//!   variables, referenced files present, no field selection in immutable
//!   streams
//! - **uniqueness check**: stream names are unique and output streams never
//!   share a target file
//!
//! Every violation is collected; nothing short-circuits.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use roxmltree::Node;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::{child, children, is_immutable, line_of, stream_elements};
use crate::error::StreamError;
use crate::pattern::filename_template_is_legal;
use crate::reference::{INTERVAL_ATTRIBUTES, extract_stream_interval};

/// Child elements that select individual fields; forbidden in immutable streams
pub const FIELD_ELEMENTS: [&str; 4] = ["var", "var_array", "var_struct", "stream"];

/// Filesystem collaborator for referenced-file existence checks
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;
}

/// Filesystem provider backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Direction of a stream, parsed from its `type` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamType {
    Input,
    Output,
    InputOutput,
    None,
}

impl StreamType {
    pub fn reads_input(self) -> bool {
        matches!(self, StreamType::Input | StreamType::InputOutput)
    }

    pub fn writes_output(self) -> bool {
        matches!(self, StreamType::Output | StreamType::InputOutput)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StreamType::Input => "input",
            StreamType::Output => "output",
            StreamType::InputOutput => "input;output",
            StreamType::None => "none",
        }
    }
}

impl FromStr for StreamType {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(StreamType::Input),
            "output" => Ok(StreamType::Output),
            "input;output" | "output;input" => Ok(StreamType::InputOutput),
            "none" => Ok(StreamType::None),
            _ => Err(StreamError::InvalidType {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed check, tied to the stream element it was found on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamIssue {
    /// Stream name, when the element has one
    pub stream: Option<String>,
    /// 1-based line of the stream element
    pub line: u32,
    pub error: StreamError,
}

impl StreamIssue {
    pub fn new(stream: &Node<'_, '_>, error: StreamError) -> Self {
        Self {
            stream: stream.attribute("name").map(str::to_string),
            line: line_of(stream),
            error,
        }
    }
}

impl fmt::Display for StreamIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stream {
            Some(name) => write!(f, "line {}: stream '{}': {}", self.line, name, self.error),
            None => write!(f, "line {}: {}", self.line, self.error),
        }
    }
}

/// All issues found in one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamReport {
    issues: Vec<StreamIssue>,
}

impl StreamReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// 0 when valid, 1 otherwise
    pub fn status_code(&self) -> i32 {
        if self.is_valid() { 0 } else { 1 }
    }

    pub fn issues(&self) -> &[StreamIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<StreamIssue> {
        self.issues
    }

    pub fn push(&mut self, issue: StreamIssue) {
        self.issues.push(issue);
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl Extend<StreamIssue> for StreamReport {
    fn extend<T: IntoIterator<Item = StreamIssue>>(&mut self, iter: T) {
        self.issues.extend(iter);
    }
}

/// Per-stream and cross-stream semantic validation
#[derive(Debug, Clone)]
pub struct StreamValidator<F = LocalFileSystem> {
    fs: F,
    base_dir: Option<PathBuf>,
    check_files: bool,
}

impl Default for StreamValidator<LocalFileSystem> {
    fn default() -> Self {
        Self::new(LocalFileSystem)
    }
}

impl<F: FileSystem> StreamValidator<F> {
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            base_dir: None,
            check_files: true,
        }
    }

    /// Resolve relative `<file name>` references against `dir`
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Enable or disable the referenced-file existence check
    pub fn with_file_check(mut self, enabled: bool) -> Self {
        self.check_files = enabled;
        self
    }

    /// Check one stream element in isolation. An empty result means valid.
    pub fn attribute_check(&self, stream: Node<'_, '_>) -> Vec<StreamError> {
        let mut errors = Vec::new();

        let stream_type = stream.attribute("type");
        let template = stream.attribute("filename_template");
        for (attribute, value) in [
            ("name", stream.attribute("name")),
            ("type", stream_type),
            ("filename_template", template),
        ] {
            if value.is_none() {
                errors.push(StreamError::MissingAttribute { attribute });
            }
        }

        let interval_block = child(stream, "output_interval");

        if let Some(value) = stream_type {
            match value.parse::<StreamType>() {
                Ok(kind) => {
                    if kind.reads_input() && stream.attribute("input_interval").is_none() {
                        errors.push(StreamError::MissingInterval {
                            stream_type: value.to_string(),
                            attribute: "input_interval",
                        });
                    }
                    if kind.writes_output()
                        && stream.attribute("output_interval").is_none()
                        && interval_block.is_none()
                    {
                        errors.push(StreamError::MissingInterval {
                            stream_type: value.to_string(),
                            attribute: "output_interval",
                        });
                    }
                }
                Err(error) => errors.push(error),
            }
        }

        if stream.attribute("output_interval").is_some()
            && interval_block.is_some_and(|block| children(block, "range").next().is_some())
        {
            errors.push(StreamError::ConflictingIntervals);
        }

        if let Some(template) = template {
            match filename_template_is_legal(template) {
                Ok(true) => {}
                Ok(false) => errors.push(StreamError::IllegalFilenameVariable {
                    template: template.to_string(),
                }),
                Err(source) => errors.push(StreamError::PatternFailure {
                    template: template.to_string(),
                    source,
                }),
            }
        }

        if self.check_files {
            for file in children(stream, "file") {
                let Some(name) = file.attribute("name") else {
                    continue;
                };
                let path = self.resolve(name);
                if !self.fs.exists(&path) {
                    errors.push(StreamError::MissingReferencedFile { path });
                }
            }
        }

        if is_immutable(&stream) {
            for field in stream.children().filter(|c| c.is_element()) {
                let tag = field.tag_name().name();
                if FIELD_ELEMENTS.contains(&tag) {
                    errors.push(StreamError::FieldInImmutableStream {
                        element: tag.to_string(),
                    });
                }
            }
        }

        errors
    }

    /// Run every check over the streams under `root`.
    pub fn check_streams(&self, root: Node<'_, '_>) -> StreamReport {
        let streams: Vec<_> = stream_elements(root).collect();
        let mut report = StreamReport::default();

        for stream in &streams {
            report.extend(
                self.attribute_check(*stream)
                    .into_iter()
                    .map(|error| StreamIssue::new(stream, error)),
            );
        }

        for (i, first) in streams.iter().enumerate() {
            for second in &streams[i + 1..] {
                report.extend(
                    uniqueness_check(*first, *second)
                        .into_iter()
                        .map(|error| StreamIssue::new(second, error)),
                );
            }
        }

        debug!(
            streams = streams.len(),
            issues = report.len(),
            "stream checks complete"
        );
        report
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Check two sibling streams against each other. An empty result means valid.
///
/// Input streams may share a filename template; output streams may not.
pub fn uniqueness_check(first: Node<'_, '_>, second: Node<'_, '_>) -> Vec<StreamError> {
    let mut errors = Vec::new();

    if let (Some(a), Some(b)) = (first.attribute("name"), second.attribute("name"))
        && a == b
    {
        errors.push(StreamError::DuplicateName {
            name: a.to_string(),
        });
    }

    let writes_output = |stream: &Node<'_, '_>| {
        stream
            .attribute("type")
            .and_then(|t| t.parse::<StreamType>().ok())
            .is_some_and(StreamType::writes_output)
    };

    if writes_output(&first)
        && writes_output(&second)
        && let (Some(a), Some(b)) = (
            first.attribute("filename_template"),
            second.attribute("filename_template"),
        )
        && a == b
    {
        errors.push(StreamError::DuplicateOutputFilename {
            first: first.attribute("name").unwrap_or_default().to_string(),
            second: second.attribute("name").unwrap_or_default().to_string(),
            template: a.to_string(),
        });
    }

    errors
}

/// Resolve every interval attribute of every stream under `root`.
///
/// A failed reference only affects the attribute it sits on; every other
/// attribute is still resolved.
pub fn resolve_intervals(root: Node<'_, '_>) -> Vec<StreamIssue> {
    let mut issues = Vec::new();
    for stream in stream_elements(root) {
        let current = stream.attribute("name").unwrap_or_default();
        for attribute in INTERVAL_ATTRIBUTES {
            let Some(value) = stream.attribute(attribute) else {
                continue;
            };
            if let Err(source) = extract_stream_interval(value, attribute, current, root) {
                issues.push(StreamIssue::new(
                    &stream,
                    StreamError::Reference {
                        attribute: attribute.to_string(),
                        source,
                    },
                ));
            }
        }
    }
    issues
}
