use crate::profile_aggregator::RenderedProfile;
use crate::report_writer::{report_text, FileReportWriter, ReportSink};

fn rendered(id: &str) -> RenderedProfile {
    RenderedProfile {
        id: id.to_string(),
        username: format!("user{id}"),
        block: format!("\nblock {id}\n"),
    }
}

#[test]
fn test_report_text_joins_blocks_in_order() {
    let profiles = [rendered("1"), rendered("2")];

    assert_eq!(profiles[0].to_string(), profiles[0].block);
    assert_eq!(report_text(&profiles), "\nblock 1\n\n\nblock 2\n");
}

#[tokio::test]
async fn test_file_writer_creates_parent_dirs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("nested").join("report.txt");
    let writer = FileReportWriter::new(&path);

    writer.write(&[rendered("1")]).await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "\nblock 1\n");
}
