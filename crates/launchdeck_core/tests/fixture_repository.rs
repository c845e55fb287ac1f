use launchdeck_core::{
    FixtureFetcher, InlinePublisher, Launch, PageRequest, RefreshOutcome, Repository,
    RepositoryOptions,
};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

const LAUNCHES_JSON: &str = r#"[
    {"id": "1", "flight_number": 1, "name": "FalconSat", "date_utc": "2006-03-24T22:30:00.000Z", "success": false},
    {"id": "2", "flight_number": 2, "name": "DemoSat", "date_utc": "2007-03-21T01:10:00.000Z", "success": false},
    {"id": "3", "flight_number": 4, "name": "RatSat", "date_utc": "2008-09-28T23:15:00.000Z", "success": true}
]"#;

fn launch_repository(dir: &std::path::Path, page: PageRequest) -> Repository<Launch> {
    Repository::with_options(
        Arc::new(FixtureFetcher::<Launch>::new(dir)),
        Handle::current(),
        Arc::new(InlinePublisher),
        RepositoryOptions {
            page,
            ..RepositoryOptions::default()
        },
    )
}

async fn settle(repo: &Repository<Launch>) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while repo.is_loading() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn loads_fixture_document_on_construction() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("launches.json"), LAUNCHES_JSON).unwrap();

    let repo = launch_repository(dir.path(), PageRequest::default());
    settle(&repo).await;

    let collection = repo.collection();
    assert_eq!(collection.ids(), vec!["1", "2", "3"]);
    assert_eq!(
        collection.get(&"3".to_string()).and_then(|launch| launch.success),
        Some(true)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn configured_page_reaches_fixture_fetcher() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("launches.json"), LAUNCHES_JSON).unwrap();

    let repo = launch_repository(dir.path(), PageRequest::new(Some(1), Some(1)));
    settle(&repo).await;

    assert_eq!(repo.collection().ids(), vec!["2"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_fixture_leaves_collection_empty() {
    let dir = tempfile::tempdir().unwrap();

    let repo = launch_repository(dir.path(), PageRequest::default());
    settle(&repo).await;

    assert!(repo.collection().is_empty());
    assert!(matches!(
        repo.observe_last_refresh().get(),
        RefreshOutcome::Failed { .. }
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn refresh_picks_up_changed_document_and_delete_stays_local() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("launches.json");
    fs::write(&path, LAUNCHES_JSON).unwrap();

    let repo = launch_repository(dir.path(), PageRequest::default());
    settle(&repo).await;

    repo.delete(&"2".to_string());
    assert_eq!(repo.collection().ids(), vec!["1", "3"]);
    let on_disk: Vec<Launch> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.len(), 3);

    fs::write(
        &path,
        r#"[{"id": "9", "flight_number": 9, "name": "CRS-1", "date_utc": "2012-10-08T00:35:00.000Z"}]"#,
    )
    .unwrap();
    repo.refresh();
    settle(&repo).await;

    assert_eq!(repo.collection().ids(), vec!["9"]);
}
