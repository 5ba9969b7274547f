#![deny(clippy::all, clippy::pedantic)]

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use httpmock::MockServer;
use noticeboard::application::board::BoardService;
use noticeboard::application::repos::{ApiError, PostsApi};
use noticeboard::cache::PostListCache;
use noticeboard::config::{self, GlobalOverrides};
use noticeboard_api_types::{
    Category, DeleteResponse, Post, PostCreateRequest, PostListQuery, PostListResponse,
    PostUpdateRequest, SortField, SortOrder,
};
use serde_json::json;
use tempfile::{NamedTempFile, TempDir};
use time::OffsetDateTime;
use time::macros::date;

use crate::args::{AdminCmd, CategoryArg, ListFilters, LoginArgs, PostsCmd, SortOrderArg};
use crate::client::{CliError, Ctx};
use crate::handlers::browse::{self, BrowseCommand, parse_command};
use crate::handlers::{admin, auth, posts};

struct Harness {
    ctx: Ctx,
    dir: TempDir,
}

fn harness(server: &MockServer) -> Harness {
    let dir = TempDir::new().expect("tempdir");
    let overrides = GlobalOverrides {
        api_url: Some(server.base_url()),
        session_file: Some(dir.path().join("session.json")),
        import_throttle_ms: Some(0),
        ..GlobalOverrides::default()
    };
    let settings = config::load(None, &overrides).expect("settings");
    let ctx = Ctx::new(settings).expect("ctx");
    Harness { ctx, dir }
}

fn tmp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tmp file");
    std::io::Write::write_all(&mut file, contents.as_bytes()).expect("write tmp");
    file
}

fn post_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "userId": "u1",
        "title": format!("title {id}"),
        "body": "body",
        "category": "FREE",
        "tags": [],
        "createdAt": "2025-03-01T09:00:00Z"
    })
}

#[test]
fn read_value_prefers_file_over_inline() -> Result<(), CliError> {
    let file = tmp_file("from-file");
    let val = crate::io::read_value(Some("inline".into()), Some(file.path().to_path_buf()))?;
    assert_eq!(val, "from-file");
    Ok(())
}

#[test]
fn read_value_requires_some_source() {
    let err = crate::io::read_value(None, None).expect_err("missing body");
    assert!(matches!(err, CliError::InvalidInput(_)));
}

#[test]
fn password_file_wins_and_loses_trailing_newline() -> Result<(), CliError> {
    let file = tmp_file("s3cret\n");
    let password =
        crate::io::read_password(Some(file.path().to_path_buf()), Some("from-env".into()))?;
    assert_eq!(password, "s3cret");
    assert_eq!(
        crate::io::read_password(None, Some("from-env".into()))?,
        "from-env"
    );
    assert!(crate::io::read_password(None, None).is_err());
    Ok(())
}

#[test]
fn query_from_filters_validates_and_normalizes() -> Result<(), CliError> {
    let filters = ListFilters {
        search: Some("  rust  ".into()),
        category: Some(CategoryArg::Notice),
        from: Some("2025-01-01".into()),
        to: Some("2025-01-31".into()),
        order: SortOrderArg::Asc,
        ..ListFilters::default()
    };
    let query = crate::io::query_from_filters(filters, Some(String::new()), 10)?;
    assert_eq!(query.search.as_deref(), Some("rust"));
    assert_eq!(query.category, Some(Category::Notice));
    assert_eq!(query.from, Some(date!(2025 - 01 - 01)));
    assert_eq!(query.order, SortOrder::Asc);
    assert_eq!(query.cursor, None);
    assert_eq!(query.limit, 10);

    let reversed = ListFilters {
        from: Some("2025-02-01".into()),
        to: Some("2025-01-01".into()),
        ..ListFilters::default()
    };
    assert!(matches!(
        crate::io::query_from_filters(reversed, None, 10),
        Err(CliError::InvalidInput(_))
    ));

    let too_big = ListFilters {
        limit: Some(101),
        ..ListFilters::default()
    };
    assert!(crate::io::query_from_filters(too_big, None, 10).is_err());
    Ok(())
}

#[test]
fn parse_command_understands_the_browse_vocabulary() {
    assert_eq!(parse_command("n"), Ok(BrowseCommand::Next));
    assert_eq!(parse_command(" p "), Ok(BrowseCommand::Prev));
    assert_eq!(
        parse_command("/ coffee"),
        Ok(BrowseCommand::Search(Some("coffee".into())))
    );
    assert_eq!(parse_command("/"), Ok(BrowseCommand::Search(None)));
    assert_eq!(
        parse_command("c qna"),
        Ok(BrowseCommand::Category(Some(Category::Qna)))
    );
    assert_eq!(parse_command("c -"), Ok(BrowseCommand::Category(None)));
    assert_eq!(
        parse_command("s title asc"),
        Ok(BrowseCommand::Sort(SortField::Title, SortOrder::Asc))
    );
    assert_eq!(
        parse_command("d 2025-01-01 2025-01-31"),
        Ok(BrowseCommand::Dates(
            Some(date!(2025 - 01 - 01)),
            Some(date!(2025 - 01 - 31))
        ))
    );
    assert_eq!(parse_command("d -"), Ok(BrowseCommand::Dates(None, None)));
    assert_eq!(parse_command("."), Ok(BrowseCommand::Reload));
    assert_eq!(parse_command("r"), Ok(BrowseCommand::Reset));
    assert_eq!(parse_command("q"), Ok(BrowseCommand::Quit));
    assert_eq!(parse_command("?"), Ok(BrowseCommand::Help));

    assert!(parse_command("d 2025-02-01 2025-01-01").is_err());
    assert!(parse_command("c gossip").is_err());
    assert!(parse_command("jump 3").is_err());
}

/// Two pages chained by cursor `c2`.
#[derive(Default)]
struct TwoPages {
    cursors: Mutex<Vec<Option<String>>>,
    fail_once: AtomicBool,
}

fn stub_post(id: &str) -> Post {
    Post {
        id: id.into(),
        user_id: "u1".into(),
        title: format!("title {id}"),
        body: "body".into(),
        category: Category::Free,
        tags: vec!["rust".into()],
        created_at: OffsetDateTime::UNIX_EPOCH,
    }
}

#[async_trait]
impl PostsApi for TwoPages {
    async fn list_posts(&self, query: &PostListQuery) -> Result<PostListResponse, ApiError> {
        self.cursors
            .lock()
            .expect("lock")
            .push(query.cursor.clone());
        if self.fail_once.swap(false, Ordering::SeqCst) {
            return Err(ApiError::Network("offline".into()));
        }
        let (id, next) = match query.cursor.as_deref() {
            None => ("first", Some("c2".to_string())),
            _ => ("second", None),
        };
        Ok(PostListResponse {
            items: vec![stub_post(id)],
            next_cursor: next,
            ..PostListResponse::default()
        })
    }

    async fn get_post(&self, _id: &str) -> Result<Post, ApiError> {
        unreachable!()
    }

    async fn create_post(&self, _payload: &PostCreateRequest) -> Result<Post, ApiError> {
        unreachable!()
    }

    async fn update_post(&self, _id: &str, _patch: &PostUpdateRequest) -> Result<Post, ApiError> {
        unreachable!()
    }

    async fn delete_post(&self, _id: &str) -> Result<DeleteResponse, ApiError> {
        unreachable!()
    }

    async fn delete_all_posts(&self) -> Result<DeleteResponse, ApiError> {
        unreachable!()
    }
}

#[tokio::test]
async fn browse_pages_forward_and_back_from_input() -> Result<(), CliError> {
    let api = Arc::new(TwoPages::default());
    let cache = Arc::new(PostListCache::new(NonZeroUsize::new(4).expect("non-zero")));
    let board = BoardService::new(api.clone(), cache, 10);

    let mut out = Vec::new();
    browse::run(&board, &b"n\nn\nbogus\np\np\nq\nn\n"[..], &mut out).await?;
    let text = String::from_utf8(out).expect("utf8");

    assert!(text.contains("-- Page 1 [n: next] --"));
    assert!(text.contains("-- Page 2 [p: prev] --"));
    assert!(text.contains("title second"));
    assert!(text.contains("#rust"));
    assert!(text.contains("already on the last page"));
    assert!(text.contains("unrecognized command `bogus`"));
    assert!(text.contains("already on the first page"));
    // Page 1 was served from cache on the way back; `n` after `q` is never read.
    assert_eq!(
        *api.cursors.lock().expect("lock"),
        vec![None, Some("c2".to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn browse_reload_retries_the_failed_page() -> Result<(), CliError> {
    let api = Arc::new(TwoPages::default());
    let cache = Arc::new(PostListCache::new(NonZeroUsize::new(4).expect("non-zero")));
    let board = BoardService::new(api.clone(), cache, 10);

    board.refresh().await?;
    api.fail_once.store(true, Ordering::SeqCst);

    // Page 1 now comes from cache; the first `n` fails and `.` fetches page 2 again.
    let mut out = Vec::new();
    browse::run(&board, &b"n\n.\nq\n"[..], &mut out).await?;
    let text = String::from_utf8(out).expect("utf8");

    assert!(text.contains("error: network error: offline (enter . to retry)"));
    assert!(text.contains("-- Page 2 [p: prev] --"));
    assert!(text.contains("title second"));
    assert_eq!(
        *api.cursors.lock().expect("lock"),
        vec![None, Some("c2".to_string()), Some("c2".to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn posts_list_sends_filters() -> Result<(), CliError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/posts")
            .query_param("search", "rust")
            .query_param("category", "NOTICE")
            .query_param("limit", "5")
            .query_param("cursor", "abc");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "items": [post_json("p1")], "nextCursor": null }));
    });

    let h = harness(&server);
    posts::handle(
        &h.ctx,
        PostsCmd::List {
            filters: ListFilters {
                search: Some("rust".into()),
                category: Some(CategoryArg::Notice),
                limit: Some(5),
                ..ListFilters::default()
            },
            cursor: Some("abc".into()),
        },
    )
    .await?;
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn posts_create_reads_body_file() -> Result<(), CliError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST")
            .path("/posts")
            .json_body_includes(r#"{"title":"Hello","body":"BODY","category":"QNA","tags":["a","b"]}"#);
        then.status(201)
            .header("content-type", "application/json")
            .json_body(post_json("new"));
    });

    let h = harness(&server);
    let body = tmp_file("BODY");
    posts::handle(
        &h.ctx,
        PostsCmd::Create {
            title: " Hello ".into(),
            body: None,
            body_file: Some(body.path().to_path_buf()),
            category: CategoryArg::Qna,
            tags: Some("a, b".into()),
        },
    )
    .await?;
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn invalid_create_never_reaches_the_server() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST").path("/posts");
        then.status(201);
    });

    let h = harness(&server);
    let err = posts::handle(
        &h.ctx,
        PostsCmd::Create {
            title: "   ".into(),
            body: Some("body".into()),
            body_file: None,
            category: CategoryArg::Free,
            tags: None,
        },
    )
    .await
    .expect_err("blank title");
    assert!(matches!(err, CliError::App(_)));
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn login_persists_session_for_later_requests() -> Result<(), CliError> {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method("POST")
            .path("/auth/login")
            .json_body(json!({ "email": "me@example.com", "password": "pw" }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "token": "tok-1", "user": { "id": "u1", "email": "me@example.com" } }));
    });

    let h = harness(&server);
    auth::login(
        &h.ctx,
        LoginArgs {
            email: "me@example.com".into(),
            password_file: None,
            password_env: Some("pw".into()),
        },
    )
    .await?;
    login.assert();

    let stored = std::fs::read_to_string(h.dir.path().join("session.json")).expect("session file");
    assert!(stored.contains("tok-1"));

    let health = server.mock(|when, then| {
        when.method("GET")
            .path("/health")
            .header("authorization", "Bearer tok-1");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "status": "ok" }));
    });
    auth::health(&h.ctx).await?;
    health.assert();

    auth::logout(&h.ctx)?;
    assert!(!h.dir.path().join("session.json").exists());
    Ok(())
}

#[tokio::test]
async fn delete_all_requires_confirmation() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("DELETE").path("/posts");
        then.status(200);
    });

    let h = harness(&server);
    let err = admin::handle(&h.ctx, AdminCmd::DeleteAll { yes: false })
        .await
        .expect_err("unconfirmed");
    assert!(matches!(err, CliError::InvalidInput(_)));
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn import_creates_each_generated_post() -> Result<(), CliError> {
    let server = MockServer::start();
    let generated = server.mock(|when, then| {
        when.method("GET").path("/mock/posts").query_param("count", "2");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "data": [
                    { "title": "One", "body": "b", "category": "NOTICE", "tags": ["x"] },
                    { "title": "", "body": "", "category": "weird" }
                ]
            }));
    });
    let created = server.mock(|when, then| {
        when.method("POST").path("/posts");
        then.status(201)
            .header("content-type", "application/json")
            .json_body(post_json("new"));
    });

    let h = harness(&server);
    admin::handle(&h.ctx, AdminCmd::Import { count: Some(2) }).await?;
    generated.assert();
    created.assert_hits(2);
    Ok(())
}

#[tokio::test]
async fn import_rejects_out_of_range_count() {
    let server = MockServer::start();
    let generated = server.mock(|when, then| {
        when.method("GET").path("/mock/posts");
        then.status(200).json_body(json!([]));
    });

    let h = harness(&server);
    let err = admin::handle(&h.ctx, AdminCmd::Import { count: Some(501) })
        .await
        .expect_err("too many");
    assert!(matches!(err, CliError::App(_)));
    assert_eq!(generated.hits(), 0);
}

#[test]
fn unauthorized_errors_suggest_logging_in() {
    let err = CliError::App(ApiError::Unauthorized.into());
    assert!(err.hint().is_some_and(|hint| hint.contains("login")));
    let err = CliError::App(ApiError::Network("down".into()).into());
    assert!(err.hint().is_some_and(|hint| hint.contains("retry")));
}
