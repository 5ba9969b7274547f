use std::collections::HashSet;
use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use metrics_util::debugging::DebuggingRecorder;
use noticeboard::application::board::BoardService;
use noticeboard::application::import::BulkImporter;
use noticeboard::application::session::{EphemeralSessionStore, Session};
use noticeboard::cache::PostListCache;
use noticeboard::config::ApiSettings;
use noticeboard::infra::http::ApiClient;
use serde_json::json;
use url::Url;

fn post_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "userId": "u1",
        "title": title,
        "body": "body",
        "category": "FREE",
        "tags": ["sample"],
        "createdAt": "2025-03-01T09:00:00Z"
    })
}

#[tokio::test]
async fn board_and_import_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let server = MockServer::start();
    let listing = server.mock(|when, then| {
        when.method("GET").path("/posts");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "items": [post_json("p1", "Existing")], "nextCursor": null }));
    });
    server.mock(|when, then| {
        when.method("GET").path("/mock/posts").query_param("count", "2");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "items": [
                { "title": "Good", "body": "fine", "category": "FREE", "tags": ["a"] },
                { "title": "Bad", "body": "fine", "category": "FREE", "tags": ["a"] }
            ]}));
    });
    let good = server.mock(|when, then| {
        when.method("POST")
            .path("/posts")
            .json_body_includes(r#"{"title":"Good"}"#);
        then.status(201)
            .header("content-type", "application/json")
            .json_body(post_json("p2", "Good"));
    });
    let bad = server.mock(|when, then| {
        when.method("POST")
            .path("/posts")
            .json_body_includes(r#"{"title":"Bad"}"#);
        then.status(400)
            .header("content-type", "application/json")
            .json_body(json!({ "message": "rejected" }));
    });

    let settings = ApiSettings {
        base_url: Url::parse(&server.base_url()).expect("base url"),
        timeout: Duration::from_secs(5),
        page_size: NonZeroU32::new(10).expect("non-zero"),
    };
    let session = Arc::new(Session::restore(Arc::new(EphemeralSessionStore)));
    let api = Arc::new(ApiClient::new(&settings, session).expect("client"));
    let cache = Arc::new(PostListCache::new(NonZeroUsize::new(8).expect("non-zero")));

    // Miss, then hit.
    let board = BoardService::new(api.clone(), cache.clone(), 10);
    board.refresh().await.expect("first load");
    board.refresh().await.expect("cached load");
    listing.assert_hits(1);

    let importer = BulkImporter::new(api.clone(), api.clone(), cache.clone(), Duration::ZERO);
    let summary = importer.run(2).await.expect("import");
    assert_eq!((summary.created, summary.failed), (1, 1));
    assert_eq!(summary.failures[0].title, "Bad");
    good.assert();
    bad.assert();

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for expected in [
        "noticeboard_cache_hit_total",
        "noticeboard_cache_miss_total",
        "noticeboard_cache_invalidation_total",
        "noticeboard_import_created_total",
        "noticeboard_import_failed_total",
    ] {
        assert!(names.contains(expected), "missing metric {expected}: {names:?}");
    }
}
