use std::path::Path;

use roxmltree::Document;
use validate_streams::{
    ReferenceError, StreamError, StreamValidator, SyntaxError, ValidationConfig, check_syntax,
    extract_stream_interval, resolve_intervals, uniqueness_check, validate_document,
};

use crate::common::test_helpers::{INVALID_OCEAN, MALFORMED_LANDICE, VALID_ATMOSPHERE};

fn no_file_check() -> StreamValidator {
    StreamValidator::default().with_file_check(false)
}

#[test]
fn test_valid_atmosphere_passes_every_stage() {
    assert_eq!(check_syntax(VALID_ATMOSPHERE), Ok(()));

    let doc = Document::parse(VALID_ATMOSPHERE).unwrap();
    let root = doc.root_element();

    assert!(no_file_check().check_streams(root).is_valid());
    assert!(resolve_intervals(root).is_empty());
}

#[test]
fn test_invalid_ocean_reports_each_stream() {
    let doc = Document::parse(INVALID_OCEAN).unwrap();
    let root = doc.root_element();

    let report = no_file_check().check_streams(root);
    let errors: Vec<_> = report
        .issues()
        .iter()
        .map(|issue| (issue.stream.as_deref(), issue.line, issue.error.clone()))
        .collect();

    assert!(errors.contains(&(
        Some("mesh"),
        2,
        StreamError::MissingInterval {
            stream_type: "input".to_string(),
            attribute: "input_interval",
        }
    )));
    assert!(errors.contains(&(
        Some("output"),
        3,
        StreamError::InvalidType {
            value: "sideways".to_string()
        }
    )));
    assert!(errors.contains(&(
        Some("averages"),
        4,
        StreamError::IllegalFilenameVariable {
            template: "avg.$Y.$X.nc".to_string()
        }
    )));
    assert!(errors.contains(&(
        Some("restart"),
        5,
        StreamError::FieldInImmutableStream {
            element: "var".to_string()
        }
    )));
    assert_eq!(report.len(), 4);
    assert_eq!(report.status_code(), 1);

    let references = resolve_intervals(root);
    assert_eq!(references.len(), 1);
    assert_eq!(
        references[0].error,
        StreamError::Reference {
            attribute: "output_interval".to_string(),
            source: ReferenceError::UndefinedStream {
                stream: "missing".to_string()
            },
        }
    );
}

#[test]
fn test_malformed_landice_never_reaches_parser() {
    assert_eq!(
        check_syntax(MALFORMED_LANDICE),
        Err(SyntaxError::BracketInTag { line: 3 })
    );

    let result = validate_document(
        Path::new("streams.landice"),
        MALFORMED_LANDICE,
        &ValidationConfig::default(),
    );
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].line, 3);
}

#[test]
fn test_input_streams_may_share_a_template() {
    let xml = r#"<streams>
  <stream name="a" type="input" filename_template="forcing.nc" input_interval="none"/>
  <stream name="b" type="input" filename_template="forcing.nc" input_interval="none"/>
  <stream name="c" type="input;output" filename_template="restart.nc" input_interval="none" output_interval="none"/>
  <stream name="d" type="output" filename_template="restart.nc" output_interval="none"/>
</streams>"#;
    let doc = Document::parse(xml).unwrap();
    let streams: Vec<_> = doc.root_element().children().filter(|n| n.is_element()).collect();

    assert!(uniqueness_check(streams[0], streams[1]).is_empty());
    assert_eq!(
        uniqueness_check(streams[2], streams[3]),
        vec![StreamError::DuplicateOutputFilename {
            first: "c".to_string(),
            second: "d".to_string(),
            template: "restart.nc".to_string(),
        }]
    );
}

#[test]
fn test_reference_resolution_follows_one_hop() {
    let doc = Document::parse(VALID_ATMOSPHERE).unwrap();
    let root = doc.root_element();

    assert_eq!(
        extract_stream_interval(
            "stream:output:output_interval",
            "output_interval",
            "diagnostics",
            root
        ),
        Ok("6:00:00")
    );
    assert_eq!(
        extract_stream_interval(
            "stream:diagnostics:output_interval",
            "output_interval",
            "adaptive",
            root
        ),
        Err(ReferenceError::Unexpandable {
            stream: "diagnostics".to_string(),
            value: "stream:output:output_interval".to_string(),
        })
    );
    assert_eq!(
        extract_stream_interval(
            "stream:restart:input_interval",
            "input_interval",
            "surface",
            root
        ),
        Ok("initial_only")
    );
}
