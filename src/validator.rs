//! Concurrent Validation Engine
//!
//! Runs the full pipeline over many streams files at once:
//! - **Async I/O**: file discovery and reading
//! - **Blocking CPU work**: syntax check, parse tree, stream checks and
//!   interval resolution, offloaded with `spawn_blocking`
//! - **Bounded concurrency**: a semaphore caps the files in flight
//!
//! Every file owns its text and parse tree, so tasks share nothing but the
//! configuration.

use futures::future::try_join_all;
use roxmltree::Node;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::document::parse_document;
use crate::error::{Result, StreamsError};
use crate::file_discovery::FileDiscovery;
use crate::interval::{StreamRecord, parse_streams};
use crate::reference::extract_stream_interval;
use crate::streams::{StreamIssue, StreamValidator, resolve_intervals};
use crate::syntax::check_syntax;

/// Validation configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Number of files validated concurrently
    pub max_concurrent_validations: usize,
    /// Timeout for a single file
    pub validation_timeout: Duration,
    /// Stop scheduling files after the first failure
    pub fail_fast: bool,
    /// Check that files referenced by `<file name>` exist
    pub check_files: bool,
    /// Timestamp at which to report each stream's active output interval
    pub query_time: Option<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_validations: num_cpus::get(),
            validation_timeout: Duration::from_secs(30),
            fail_fast: false,
            check_files: true,
            query_time: None,
        }
    }
}

/// Status of a single file validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    /// No syntax, attribute, uniqueness or reference problem
    Valid,
    /// The document was rejected
    Invalid { error_count: usize },
    /// The file could not be validated at all
    Error { message: String },
    /// Not validated because an earlier file failed under fail-fast
    Skipped { reason: String },
}

impl ValidationStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationStatus::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidationStatus::Invalid { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValidationStatus::Error { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ValidationStatus::Skipped { .. })
    }
}

/// One reported problem, located in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    pub message: String,
}

impl From<&StreamIssue> for Diagnostic {
    fn from(issue: &StreamIssue) -> Self {
        Self {
            line: issue.line as usize,
            stream: issue.stream.clone(),
            message: issue.error.to_string(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.stream {
            Some(stream) => write!(f, "line {}: stream '{}': {}", self.line, stream, self.message),
            None => write!(f, "line {}: {}", self.line, self.message),
        }
    }
}

/// Result of looking up a stream's output interval at the query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveInterval {
    /// Interval in effect; empty when the stream configures none
    Interval(String),
    /// The stream has ranges but none covers the query time
    NoMatchingRange,
}

impl ActiveInterval {
    /// Look up `record` at `time`
    pub fn lookup(record: &StreamRecord, time: &str) -> Self {
        match record.get_output_interval(time) {
            Some(interval) => ActiveInterval::Interval(interval.to_string()),
            None => ActiveInterval::NoMatchingRange,
        }
    }

    pub fn as_interval(&self) -> Option<&str> {
        match self {
            ActiveInterval::Interval(interval) => Some(interval),
            ActiveInterval::NoMatchingRange => None,
        }
    }
}

/// Interval summary of one `<stream>` of a valid file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSummary {
    pub name: String,
    pub stream_type: String,
    pub filename_template: String,
    pub dynamic_ranges: usize,
    /// Lookup at the configured query time; `None` when no time was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_interval: Option<ActiveInterval>,
}

/// Result of validating a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileValidationResult {
    pub path: PathBuf,
    pub status: ValidationStatus,
    pub streams: Vec<StreamSummary>,
    pub diagnostics: Vec<Diagnostic>,
    pub duration: Duration,
}

impl FileValidationResult {
    pub fn valid(path: PathBuf, streams: Vec<StreamSummary>, duration: Duration) -> Self {
        Self {
            path,
            status: ValidationStatus::Valid,
            streams,
            diagnostics: Vec::new(),
            duration,
        }
    }

    pub fn invalid(path: PathBuf, diagnostics: Vec<Diagnostic>, duration: Duration) -> Self {
        Self {
            path,
            status: ValidationStatus::Invalid {
                error_count: diagnostics.len(),
            },
            streams: Vec::new(),
            diagnostics,
            duration,
        }
    }

    pub fn error(path: PathBuf, error: StreamsError, duration: Duration) -> Self {
        Self {
            path,
            status: ValidationStatus::Error {
                message: error.to_string(),
            },
            streams: Vec::new(),
            diagnostics: Vec::new(),
            duration,
        }
    }

    pub fn skipped(path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            path,
            status: ValidationStatus::Skipped {
                reason: reason.into(),
            },
            streams: Vec::new(),
            diagnostics: Vec::new(),
            duration: Duration::ZERO,
        }
    }
}

/// Performance metrics for a validation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_duration: Duration,
    pub discovery_duration: Duration,
    pub validation_duration: Duration,
    pub average_time_per_file: Duration,
    pub throughput_files_per_second: f64,
    pub concurrent_validations: usize,
}

/// Aggregated results of validating multiple files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResults {
    pub total_files: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
    pub error_files: usize,
    pub skipped_files: usize,
    /// Sum of the per-file durations
    pub total_duration: Duration,
    pub average_duration: Duration,
    pub file_results: Vec<FileValidationResult>,
    pub performance_metrics: PerformanceMetrics,
}

impl ValidationResults {
    /// Aggregate individual file results into summary
    pub fn aggregate(file_results: Vec<FileValidationResult>) -> Self {
        let total_files = file_results.len();
        let mut valid_files = 0;
        let mut invalid_files = 0;
        let mut error_files = 0;
        let mut skipped_files = 0;
        let mut total_duration = Duration::ZERO;

        for result in &file_results {
            match result.status {
                ValidationStatus::Valid => valid_files += 1,
                ValidationStatus::Invalid { .. } => invalid_files += 1,
                ValidationStatus::Error { .. } => error_files += 1,
                ValidationStatus::Skipped { .. } => skipped_files += 1,
            }
            total_duration += result.duration;
        }

        let average_duration = if total_files > 0 {
            total_duration / total_files as u32
        } else {
            Duration::ZERO
        };

        let performance_metrics = PerformanceMetrics {
            total_duration,
            discovery_duration: Duration::ZERO,
            validation_duration: total_duration,
            average_time_per_file: average_duration,
            throughput_files_per_second: throughput(total_files, total_duration),
            concurrent_validations: 1,
        };

        Self {
            total_files,
            valid_files,
            invalid_files,
            error_files,
            skipped_files,
            total_duration,
            average_duration,
            file_results,
            performance_metrics,
        }
    }

    /// Create results with detailed performance metrics
    pub fn with_metrics(
        file_results: Vec<FileValidationResult>,
        performance_metrics: PerformanceMetrics,
    ) -> Self {
        let mut results = Self::aggregate(file_results);
        results.performance_metrics = performance_metrics;
        results
    }

    /// Check if all files validated successfully
    pub fn all_valid(&self) -> bool {
        self.valid_files == self.total_files && self.total_files > 0
    }

    /// Check if any file was rejected or could not be validated
    pub fn has_errors(&self) -> bool {
        self.error_files > 0 || self.invalid_files > 0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.valid_files as f64 / self.total_files as f64) * 100.0
        }
    }

    /// Process exit status: 0 when nothing failed, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.has_errors() { 1 } else { 0 }
    }
}

fn throughput(files: usize, elapsed: Duration) -> f64 {
    if elapsed.as_secs_f64() > 0.0 {
        files as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    }
}

/// Validate one streams document held in memory.
///
/// A syntax failure is reported alone: semantic checks never run on text
/// that is not well formed.
pub fn validate_document(path: &Path, text: &str, config: &ValidationConfig) -> FileValidationResult {
    let start = Instant::now();

    if let Err(error) = check_syntax(text) {
        let diagnostic = Diagnostic {
            line: error.line(),
            stream: None,
            message: error.to_string(),
        };
        return FileValidationResult::invalid(path.to_path_buf(), vec![diagnostic], start.elapsed());
    }

    let doc = match parse_document(text, path) {
        Ok(doc) => doc,
        Err(error) => {
            let line = match &error {
                StreamsError::XmlParse { line, .. } => *line,
                _ => 1,
            };
            let diagnostic = Diagnostic {
                line,
                stream: None,
                message: error.to_string(),
            };
            return FileValidationResult::invalid(path.to_path_buf(), vec![diagnostic], start.elapsed());
        }
    };
    let root = doc.root_element();

    let mut validator = StreamValidator::default().with_file_check(config.check_files);
    if let Some(dir) = path.parent() {
        validator = validator.with_base_dir(dir);
    }

    let mut report = validator.check_streams(root);
    report.extend(resolve_intervals(root));

    if !report.is_valid() {
        let diagnostics = report.issues().iter().map(Diagnostic::from).collect();
        return FileValidationResult::invalid(path.to_path_buf(), diagnostics, start.elapsed());
    }

    let streams = resolved_records(root)
        .into_iter()
        .map(|record| StreamSummary {
            active_interval: config
                .query_time
                .as_deref()
                .map(|time| ActiveInterval::lookup(&record, time)),
            dynamic_ranges: record.ranges.len(),
            name: record.name,
            stream_type: record.stream_type,
            filename_template: record.filename_template,
        })
        .collect();

    FileValidationResult::valid(path.to_path_buf(), streams, start.elapsed())
}

/// Stream records whose static interval has been resolved to a literal.
///
/// Only called on documents whose references all resolve.
fn resolved_records(root: Node<'_, '_>) -> Vec<StreamRecord> {
    let mut records = parse_streams(root);
    for record in &mut records {
        let resolved = record.static_interval.as_deref().and_then(|value| {
            extract_stream_interval(value, "output_interval", &record.name, root)
                .ok()
                .map(str::to_string)
        });
        if resolved.is_some() {
            record.static_interval = resolved;
        }
    }
    records
}

/// Concurrent validation of many streams files
pub struct ValidationEngine {
    config: Arc<ValidationConfig>,
}

impl ValidationEngine {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Discover streams files under `path` and validate them all
    pub async fn validate_path(
        &self,
        path: &Path,
        file_discovery: &FileDiscovery,
    ) -> Result<ValidationResults> {
        let workflow_start = Instant::now();

        let discovery_start = Instant::now();
        let files = file_discovery.discover_files(path).await?;
        let discovery_duration = discovery_start.elapsed();
        info!(files = files.len(), path = %path.display(), "discovered streams files");

        let validation_start = Instant::now();
        let results = self.validate_files(files).await?;
        let validation_duration = validation_start.elapsed();

        let total_duration = workflow_start.elapsed();
        let performance_metrics = PerformanceMetrics {
            total_duration,
            discovery_duration,
            validation_duration,
            average_time_per_file: if results.is_empty() {
                Duration::ZERO
            } else {
                validation_duration / results.len() as u32
            },
            throughput_files_per_second: throughput(results.len(), total_duration),
            concurrent_validations: self.config.max_concurrent_validations,
        };

        Ok(ValidationResults::with_metrics(results, performance_metrics))
    }

    /// Validate a list of files concurrently, preserving input order
    pub async fn validate_files(&self, files: Vec<PathBuf>) -> Result<Vec<FileValidationResult>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let semaphore = Arc::new(tokio::sync::Semaphore::new(
            self.config.max_concurrent_validations.max(1),
        ));
        let failed = Arc::new(AtomicBool::new(false));

        let validation_tasks: Vec<_> = files
            .into_iter()
            .map(|file_path| {
                let config = Arc::clone(&self.config);
                let semaphore = Arc::clone(&semaphore);
                let failed = Arc::clone(&failed);

                tokio::spawn(async move {
                    let _permit = semaphore.acquire().await.map_err(|_| StreamsError::Concurrency {
                        details: "Failed to acquire validation semaphore".to_string(),
                    })?;

                    if config.fail_fast && failed.load(Ordering::SeqCst) {
                        return Ok::<FileValidationResult, StreamsError>(FileValidationResult::skipped(
                            file_path,
                            "skipped after an earlier failure (fail-fast)",
                        ));
                    }

                    let timeout = config.validation_timeout;
                    let result = match tokio::time::timeout(
                        timeout,
                        Self::validate_single_file_internal(file_path.clone(), Arc::clone(&config)),
                    )
                    .await
                    {
                        Ok(result) => result,
                        Err(_) => FileValidationResult::error(
                            file_path,
                            StreamsError::Concurrency {
                                details: format!("Validation timeout after {:?}", timeout),
                            },
                            timeout,
                        ),
                    };

                    if !result.status.is_valid() {
                        failed.store(true, Ordering::SeqCst);
                    }
                    Ok(result)
                })
            })
            .collect();

        let task_results =
            try_join_all(validation_tasks)
                .await
                .map_err(|e| StreamsError::Concurrency {
                    details: format!("Task join error: {}", e),
                })?;

        task_results.into_iter().collect()
    }

    async fn validate_single_file_internal(
        file_path: PathBuf,
        config: Arc<ValidationConfig>,
    ) -> FileValidationResult {
        let start_time = Instant::now();

        let text = match tokio::fs::read_to_string(&file_path).await {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %file_path.display(), error = %e, "cannot read streams file");
                return FileValidationResult::error(file_path, e.into(), start_time.elapsed());
            }
        };

        let path = file_path.clone();
        match tokio::task::spawn_blocking(move || validate_document(&path, &text, &config)).await {
            Ok(mut result) => {
                result.duration = start_time.elapsed();
                debug!(path = %result.path.display(), status = ?result.status, "validated");
                result
            }
            Err(e) => FileValidationResult::error(
                file_path,
                StreamsError::Concurrency {
                    details: format!("Join error: {}", e),
                },
                start_time.elapsed(),
            ),
        }
    }

    /// Validate a single file
    pub async fn validate_single_file(&self, file_path: &Path) -> FileValidationResult {
        Self::validate_single_file_internal(file_path.to_path_buf(), Arc::clone(&self.config)).await
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}
