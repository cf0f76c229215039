use roxmltree::Document;
use validate_streams::{StreamsFile, parse_streams, query_streams_file};

use crate::common::test_helpers::{VALID_ATMOSPHERE, write_file};

#[test]
fn test_parse_streams_skips_immutable_streams() {
    let doc = Document::parse(VALID_ATMOSPHERE).unwrap();
    let records = parse_streams(doc.root_element());

    let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["output", "diagnostics", "surface", "adaptive"]);
}

#[test]
fn test_adaptive_output_interval_lookup() {
    let doc = Document::parse(VALID_ATMOSPHERE).unwrap();
    let records = parse_streams(doc.root_element());
    let adaptive = records.iter().find(|r| r.name == "adaptive").unwrap();

    assert_eq!(adaptive.ranges.len(), 2);
    assert!(!adaptive.has_interval_conflict());
    assert_eq!(adaptive.get_output_interval("0000-01-01_00:00:00"), Some("1:00:00"));
    assert_eq!(adaptive.get_output_interval("0000-01-04_23:59:59"), Some("1:00:00"));
    assert_eq!(adaptive.get_output_interval("0000-01-05_00:00:00"), Some("1_00:00:00"));
    assert_eq!(adaptive.get_output_interval("0001-01-01_00:00:00"), Some("1_00:00:00"));
    assert_eq!(adaptive.get_output_interval("-0001-01-01_00:00:00"), None);
}

#[test]
fn test_static_output_interval_lookup() {
    let doc = Document::parse(VALID_ATMOSPHERE).unwrap();
    let records = parse_streams(doc.root_element());

    let output = records.iter().find(|r| r.name == "output").unwrap();
    assert_eq!(output.get_output_interval("0000-01-01_00:00:00"), Some("6:00:00"));

    // references are stored unresolved
    let diagnostics = records.iter().find(|r| r.name == "diagnostics").unwrap();
    assert_eq!(
        diagnostics.static_interval.as_deref(),
        Some("stream:output:output_interval")
    );

    let surface = records.iter().find(|r| r.name == "surface").unwrap();
    assert_eq!(surface.get_output_interval("0000-01-01_00:00:00"), Some(""));
}

#[tokio::test]
async fn test_query_streams_file_from_disk() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "streams.atmosphere", VALID_ATMOSPHERE)
        .await
        .unwrap();

    let file = StreamsFile::read(&path).await.unwrap();
    let doc = file.document().unwrap();
    let root = doc.root_element();

    assert_eq!(
        query_streams_file(root, "restart", "output_interval"),
        Some("1_00:00:00")
    );
    assert_eq!(
        query_streams_file(root, "surface", "filename_template"),
        Some("x1.40962.sfc_update.nc")
    );
    assert_eq!(query_streams_file(root, "surface", "output_interval"), None);
}
