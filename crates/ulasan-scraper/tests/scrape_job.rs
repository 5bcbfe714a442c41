//! End-to-end scrape jobs with a fake harvester script and local storage.

use std::path::Path;

use ulasan_scraper::{
    EventSink, Harvester, JobEvent, JobStore, LocalStore, ObjectStore, ScrapeRequest, Scraper,
};

fn scraper(root: &Path, bin: String) -> Scraper {
    let data_dir = root.join("tweets-data");
    Scraper::new(
        Harvester::new(bin, &data_dir),
        ObjectStore::Local(LocalStore::new(root.join("storage"))),
        JobStore::new(&data_dir),
        2,
    )
}

fn request(token_len: usize) -> ScrapeRequest {
    serde_json::from_value(serde_json::json!({
        "token": "t".repeat(token_len),
        "search_keyword": "ulasan aplikasi",
        "filename": "hasil scrape.csv",
        "limit": 3,
    }))
    .expect("request")
}

async fn collect(scraper: &Scraper, request: ScrapeRequest) -> Vec<JobEvent> {
    let (sink, mut rx) = EventSink::channel();
    let job = scraper.run(request, sink);
    let drain = async {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    };
    let ((), events) = tokio::join!(job, drain);
    events
}

#[cfg(unix)]
fn fake_harvester(dir: &Path, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-harvest");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn invalid_request_still_ends_with_result_and_done() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let scraper = scraper(tmp.path(), "unused".to_string());

    let events = collect(&scraper, request(5)).await;

    let n = events.len();
    assert!(n >= 2);
    match &events[n - 2] {
        JobEvent::Result(Err(message)) => assert!(message.contains("token"), "{message}"),
        other => panic!("expected failed result, got: {other:?}"),
    }
    assert!(matches!(events[n - 1], JobEvent::Done));
}

#[cfg(unix)]
#[tokio::test]
async fn successful_job_uploads_csv_and_saves_meta() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let bin = fake_harvester(
        tmp.path(),
        r#"mkdir -p tweets-data
echo "got $8 tweets"
printf 'id,full_text\n1,bagus\n2,jelek\n3,biasa\n' > "tweets-data/$2""#,
    );
    let scraper = scraper(tmp.path(), bin);

    let events = collect(&scraper, request(32)).await;

    let logs: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            JobEvent::Log(line) => Some(line.as_str()),
            _ => None,
        })
        .collect();
    assert!(logs[0].starts_with("[INIT] Job ID: "), "{logs:?}");
    assert!(logs[1].ends_with("-hasil_scrape.csv"), "{logs:?}");
    assert!(logs.contains(&"[OUT] got 3 tweets"), "{logs:?}");
    assert!(logs.contains(&"[READ] Found 3 rows"), "{logs:?}");
    assert!(logs.contains(&"[SAVE] Metadata saved"), "{logs:?}");

    let n = events.len();
    assert!(matches!(events[n - 1], JobEvent::Done));
    let JobEvent::Result(Ok(summary)) = &events[n - 2] else {
        panic!("expected ok result, got: {:?}", events[n - 2]);
    };
    assert_eq!(summary.count, 3);
    assert_eq!(summary.preview.len(), 2);
    assert_eq!(summary.preview[0].text("full_text"), "bagus");

    let jobs = JobStore::new(tmp.path().join("tweets-data"));
    let meta = jobs.load(&summary.job_id).await.expect("meta saved");
    assert_eq!(meta.file_id, summary.file_id);
    assert_eq!(meta.search_keyword, "ulasan aplikasi");
    assert_eq!(meta.limit, 3);
    assert!(meta.csv_path.exists());
    assert!(tmp.path().join("storage").join(&summary.file_id).exists());
}

#[cfg(unix)]
#[tokio::test]
async fn harvester_failure_reports_stderr() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let bin = fake_harvester(tmp.path(), "echo \"token expired\" >&2\nexit 2");
    let scraper = scraper(tmp.path(), bin);

    let events = collect(&scraper, request(32)).await;

    let n = events.len();
    match &events[n - 2] {
        JobEvent::Result(Err(message)) => assert!(message.contains("token expired"), "{message}"),
        other => panic!("expected failed result, got: {other:?}"),
    }
    assert!(events.iter().any(
        |e| matches!(e, JobEvent::Log(line) if line == "[FAIL] Exit code: 2")
    ));
}
