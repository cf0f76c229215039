//! Output and Reporting
//!
//! Renders validation results as human-readable text, a bare summary, or JSON.

use std::time::Duration;

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::error::Result;
use crate::validator::{
    ActiveInterval, FileValidationResult, PerformanceMetrics, ValidationResults, ValidationStatus,
};

/// Output formatter for validation results
pub struct Output {
    verbosity: VerbosityLevel,
    format: OutputFormat,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            format: OutputFormat::Human,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// Render `results` in the configured format
    pub fn render(&self, results: &ValidationResults) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(self.format_results(results)),
            OutputFormat::Summary => Ok(self.format_summary(results)),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(results)?;
                json.push('\n');
                Ok(json)
            }
        }
    }

    pub fn format_results(&self, results: &ValidationResults) -> String {
        let mut output = String::new();

        match self.verbosity {
            VerbosityLevel::Quiet => {
                for file_result in results.file_results.iter().filter(|r| failed(r)) {
                    output.push_str(&self.format_file_result(file_result));
                    output.push('\n');
                }
            }
            VerbosityLevel::Normal | VerbosityLevel::Verbose => {
                for file_result in &results.file_results {
                    if self.verbosity == VerbosityLevel::Verbose || !file_result.status.is_valid() {
                        output.push_str(&self.format_file_result(file_result));
                        output.push('\n');
                    }
                }
                if !results.file_results.is_empty() {
                    output.push('\n');
                }
                output.push_str(&self.format_summary(results));
            }
        }

        output
    }

    pub fn format_file_result(&self, result: &FileValidationResult) -> String {
        let path_display = result.path.display();
        let duration_str = format_duration(result.duration);

        match &result.status {
            ValidationStatus::Valid => {
                let mut output = format!(
                    "{}  {} ({})",
                    self.colorize("✓ VALID", "32"),
                    path_display,
                    duration_str
                );

                if self.verbosity == VerbosityLevel::Verbose {
                    for stream in &result.streams {
                        output.push_str(&format!(
                            "\n    stream '{}' ({}) -> {}",
                            stream.name, stream.stream_type, stream.filename_template
                        ));
                        match &stream.active_interval {
                            Some(ActiveInterval::Interval(interval)) if interval.is_empty() => {
                                output.push_str(", no output interval");
                            }
                            Some(ActiveInterval::Interval(interval)) => {
                                output.push_str(&format!(", interval {}", interval));
                            }
                            Some(ActiveInterval::NoMatchingRange) => {
                                output.push_str(", no matching range");
                            }
                            None => {}
                        }
                    }
                }
                output
            }
            ValidationStatus::Invalid { error_count } => {
                let mut output = format!(
                    "{}  {} ({}) - {} error{}",
                    self.colorize("✗ INVALID", "31"),
                    path_display,
                    duration_str,
                    error_count,
                    if *error_count == 1 { "" } else { "s" }
                );

                if self.verbosity != VerbosityLevel::Quiet {
                    for diagnostic in &result.diagnostics {
                        output.push_str(&format!("\n    {}", diagnostic));
                    }
                }
                output
            }
            ValidationStatus::Error { message } => {
                format!(
                    "{}  {} ({}) - {}",
                    self.colorize("⚠ ERROR", "33"),
                    path_display,
                    duration_str,
                    message
                )
            }
            ValidationStatus::Skipped { reason } => {
                format!(
                    "{}  {} - {}",
                    self.colorize("- SKIPPED", "36"),
                    path_display,
                    reason
                )
            }
        }
    }

    pub fn format_summary(&self, results: &ValidationResults) -> String {
        let mut output = String::new();
        output.push_str("Validation Summary:\n");
        output.push_str(&format!("  Total files: {}\n", results.total_files));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Valid:", "32"),
            results.valid_files
        ));

        if results.invalid_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Invalid:", "31"),
                results.invalid_files
            ));
        }
        if results.error_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Errors:", "33"),
                results.error_files
            ));
        }
        if results.skipped_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Skipped:", "36"),
                results.skipped_files
            ));
        }

        output.push_str(&format!("  Success rate: {:.1}%\n", results.success_rate()));
        output.push_str(&format!(
            "  Duration: {}\n",
            format_duration(results.performance_metrics.total_duration)
        ));

        if self.verbosity == VerbosityLevel::Verbose {
            output.push_str(&self.format_performance_metrics(&results.performance_metrics));
        }

        output
    }

    fn format_performance_metrics(&self, metrics: &PerformanceMetrics) -> String {
        let mut output = String::new();
        output.push_str("\nPerformance Metrics:\n");
        output.push_str(&format!(
            "  Discovery: {}\n",
            format_duration(metrics.discovery_duration)
        ));
        output.push_str(&format!(
            "  Validation: {}\n",
            format_duration(metrics.validation_duration)
        ));
        output.push_str(&format!(
            "  Throughput: {:.1} files/sec\n",
            metrics.throughput_files_per_second
        ));
        output.push_str(&format!(
            "  Concurrent validations: {}\n",
            metrics.concurrent_validations
        ));
        output
    }
}

fn failed(result: &FileValidationResult) -> bool {
    result.status.is_invalid() || result.status.is_error()
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{Diagnostic, StreamSummary};
    use std::path::PathBuf;

    fn create_test_results() -> ValidationResults {
        ValidationResults::with_metrics(
            vec![
                FileValidationResult::valid(
                    PathBuf::from("run/streams.atmosphere"),
                    vec![
                        StreamSummary {
                            name: "history".to_string(),
                            stream_type: "output".to_string(),
                            filename_template: "history.$Y.nc".to_string(),
                            dynamic_ranges: 0,
                            active_interval: Some(ActiveInterval::Interval("6:00:00".to_string())),
                        },
                        StreamSummary {
                            name: "late".to_string(),
                            stream_type: "output".to_string(),
                            filename_template: "late.nc".to_string(),
                            dynamic_ranges: 1,
                            active_interval: Some(ActiveInterval::NoMatchingRange),
                        },
                        StreamSummary {
                            name: "forcing".to_string(),
                            stream_type: "input".to_string(),
                            filename_template: "forcing.nc".to_string(),
                            dynamic_ranges: 0,
                            active_interval: Some(ActiveInterval::Interval(String::new())),
                        },
                    ],
                    Duration::from_millis(3),
                ),
                FileValidationResult::invalid(
                    PathBuf::from("run/streams.ocean"),
                    vec![Diagnostic {
                        line: 4,
                        stream: Some("restart".to_string()),
                        message: "stream is missing the 'type' attribute".to_string(),
                    }],
                    Duration::from_millis(2),
                ),
            ],
            PerformanceMetrics {
                total_duration: Duration::from_millis(100),
                concurrent_validations: 2,
                ..PerformanceMetrics::default()
            },
        )
    }

    #[test]
    fn test_human_output_lists_failures_with_lines() {
        let output = Output::new(VerbosityLevel::Normal).with_colors(false);
        let formatted = output.format_results(&create_test_results());

        assert!(formatted.contains("✗ INVALID  run/streams.ocean"));
        assert!(formatted.contains("line 4: stream 'restart': stream is missing the 'type' attribute"));
        assert!(!formatted.contains("✓ VALID"));
        assert!(formatted.contains("Validation Summary:"));
        assert!(formatted.contains("Success rate: 50.0%"));
    }

    #[test]
    fn test_verbose_output_shows_intervals() {
        let output = Output::new(VerbosityLevel::Verbose).with_colors(false);
        let formatted = output.format_results(&create_test_results());

        assert!(formatted.contains("✓ VALID  run/streams.atmosphere"));
        assert!(formatted.contains("stream 'history' (output) -> history.$Y.nc, interval 6:00:00"));
        assert!(formatted.contains("stream 'late' (output) -> late.nc, no matching range"));
        assert!(formatted.contains("stream 'forcing' (input) -> forcing.nc, no output interval"));
        assert!(formatted.contains("Concurrent validations: 2"));
    }

    #[test]
    fn test_quiet_output_only_failures() {
        let output = Output::new(VerbosityLevel::Quiet).with_colors(false);
        let formatted = output.format_results(&create_test_results());

        assert_eq!(formatted.lines().count(), 1);
        assert!(formatted.starts_with("✗ INVALID  run/streams.ocean"));
    }

    #[test]
    fn test_summary_format() {
        let output = Output::new(VerbosityLevel::Normal)
            .with_colors(false)
            .with_format(OutputFormat::Summary);
        let rendered = output.render(&create_test_results()).unwrap();

        assert!(rendered.starts_with("Validation Summary:"));
        assert!(rendered.contains("Invalid: 1"));
        assert!(!rendered.contains("run/streams.ocean"));
    }

    #[test]
    fn test_json_format() {
        let output = Output::new(VerbosityLevel::Normal).with_format(OutputFormat::Json);
        let rendered = output.render(&create_test_results()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["total_files"], 2);
        assert_eq!(value["invalid_files"], 1);
        assert_eq!(value["file_results"][1]["diagnostics"][0]["line"], 4);
        let streams = &value["file_results"][0]["streams"];
        assert_eq!(streams[0]["active_interval"]["interval"], "6:00:00");
        assert_eq!(streams[1]["active_interval"], "no_matching_range");
        assert_eq!(streams[2]["active_interval"]["interval"], "");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(42)), "42ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30.0s");
    }
}
