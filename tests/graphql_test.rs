use rusqlite::params;
use std::sync::Arc;
use tagfeed::config::PostsConfig;
use tagfeed::db;
use tagfeed::extractors::{CurrentUser, MaybeUser};
use tagfeed::social::repository::{DynPostRepository, SqlitePostRepository};
use tagfeed::social::RequestScope;
use tagfeed::state::DbPool;
use tempfile::TempDir;

// Helper to create a migrated database with two users, bob following alice
fn setup() -> (TempDir, DbPool, DynPostRepository) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let pool = db::create_pool(&db_path).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let conn = pool.get().unwrap();
    for (id, username) in [("u1", "alice"), ("u2", "bob")] {
        conn.execute(
            "INSERT INTO users (id, username, display_name, bio) VALUES (?1, ?2, ?2, 'hi')",
            params![id, username],
        )
        .unwrap();
    }
    conn.execute(
        "INSERT INTO follows (follower_id, following_id) VALUES ('u2', 'u1')",
        [],
    )
    .unwrap();

    let repo: DynPostRepository = Arc::new(SqlitePostRepository::new(pool.clone()));
    (temp_dir, pool, repo)
}

fn viewer(id: &str, username: &str) -> MaybeUser {
    MaybeUser(Some(CurrentUser {
        id: id.to_string(),
        username: username.to_string(),
    }))
}

async fn execute(
    repo: &DynPostRepository,
    viewer: MaybeUser,
    query: &str,
) -> async_graphql::Response {
    let schema = tagfeed::graphql::build_schema();
    let request = async_graphql::Request::new(query)
        .data(repo.clone())
        .data(viewer)
        .data(RequestScope::default())
        .data(PostsConfig::default());
    schema.execute(request).await
}

fn count(pool: &DbPool, table: &str) -> i64 {
    pool.get()
        .unwrap()
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .unwrap()
}

const SUBMIT_GO_GO_RUST: &str = r#"mutation {
    submitPost(input: { content: "hello tags", tagNames: ["go", "go", "rust"] }) {
        id
        content
        tags { id name }
        user { username }
    }
}"#;

#[tokio::test]
async fn test_submit_post_creates_each_distinct_tag_once() {
    let (_temp, pool, repo) = setup();

    let result = execute(&repo, viewer("u1", "alice"), SUBMIT_GO_GO_RUST).await;
    assert!(result.errors.is_empty(), "Expected no errors, got: {:?}", result.errors);

    let data = result.data.into_json().unwrap();
    let post = &data["submitPost"];
    assert_eq!(post["content"], "hello tags");
    assert_eq!(post["user"]["username"], "alice");

    let names: Vec<&str> = post["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["go", "rust"]);
    assert_eq!(count(&pool, "tags"), 2);
    assert_eq!(count(&pool, "post_tags"), 2);
}

#[tokio::test]
async fn test_submit_post_reuses_tags_across_submissions() {
    let (_temp, pool, repo) = setup();

    let first = execute(&repo, viewer("u1", "alice"), SUBMIT_GO_GO_RUST).await;
    let second = execute(&repo, viewer("u2", "bob"), SUBMIT_GO_GO_RUST).await;
    assert!(first.errors.is_empty() && second.errors.is_empty());

    let first = first.data.into_json().unwrap();
    let second = second.data.into_json().unwrap();
    assert_eq!(
        first["submitPost"]["tags"], second["submitPost"]["tags"],
        "Same names should resolve to the same tag ids"
    );
    assert_eq!(count(&pool, "tags"), 2);
    assert_eq!(count(&pool, "posts"), 2);
}

#[tokio::test]
async fn test_submit_post_without_viewer_is_unauthorized() {
    let (_temp, pool, repo) = setup();

    let result = execute(&repo, MaybeUser(None), SUBMIT_GO_GO_RUST).await;

    assert_eq!(result.errors.len(), 1);
    let ext = result.errors[0].extensions.as_ref().unwrap();
    assert_eq!(
        ext.get("code"),
        Some(&async_graphql::Value::from("UNAUTHORIZED"))
    );
    assert_eq!(count(&pool, "posts"), 0);
    assert_eq!(count(&pool, "tags"), 0);
}

#[tokio::test]
async fn test_submit_post_rejects_blank_content_with_field() {
    let (_temp, pool, repo) = setup();

    let result = execute(
        &repo,
        viewer("u1", "alice"),
        r#"mutation { submitPost(input: { content: "   ", tagNames: ["rust"] }) { id } }"#,
    )
    .await;

    assert_eq!(result.errors.len(), 1);
    let ext = result.errors[0].extensions.as_ref().unwrap();
    assert_eq!(
        ext.get("code"),
        Some(&async_graphql::Value::from("VALIDATION_FAILED"))
    );
    assert_eq!(ext.get("field"), Some(&async_graphql::Value::from("content")));
    assert_eq!(count(&pool, "tags"), 0);
}

#[tokio::test]
async fn test_tag_feed_marks_followed_author() {
    let (_temp, _pool, repo) = setup();

    let submitted = execute(&repo, viewer("u1", "alice"), SUBMIT_GO_GO_RUST).await;
    let data = submitted.data.into_json().unwrap();
    let tag_id = data["submitPost"]["tags"][0]["id"].as_str().unwrap().to_string();

    let query = format!(
        r#"{{
            tag(id: "{}") {{
                title
                tag {{ name }}
                posts {{ content user {{ username followerCount isFollowedByUser }} }}
            }}
        }}"#,
        tag_id
    );

    let as_bob = execute(&repo, viewer("u2", "bob"), &query).await;
    assert!(as_bob.errors.is_empty(), "{:?}", as_bob.errors);
    let feed = as_bob.data.into_json().unwrap();
    assert_eq!(feed["tag"]["title"], "Posts for Tag: go");
    let post = &feed["tag"]["posts"][0];
    assert_eq!(post["user"]["username"], "alice");
    assert_eq!(post["user"]["followerCount"], 1);
    assert_eq!(post["user"]["isFollowedByUser"], true);

    let anonymous = execute(&repo, MaybeUser(None), &query).await;
    let feed = anonymous.data.into_json().unwrap();
    assert_eq!(feed["tag"]["posts"][0]["user"]["isFollowedByUser"], false);
}

#[tokio::test]
async fn test_unknown_tag_is_not_found() {
    let (_temp, _pool, repo) = setup();

    let result = execute(
        &repo,
        viewer("u1", "alice"),
        r#"{ tag(id: "does-not-exist") { tag { id } posts { id } } }"#,
    )
    .await;

    assert_eq!(result.errors.len(), 1);
    let ext = result.errors[0].extensions.as_ref().unwrap();
    assert_eq!(ext.get("code"), Some(&async_graphql::Value::from("NOT_FOUND")));
}

#[tokio::test]
async fn test_user_sidebar_hides_follow_button_for_self() {
    let (_temp, _pool, repo) = setup();
    let query = r#"{ user(username: "alice") { showFollowButton user { displayName bio followerCount isFollowedByUser } } }"#;

    let as_bob = execute(&repo, viewer("u2", "bob"), query).await;
    let data = as_bob.data.into_json().unwrap();
    assert_eq!(data["user"]["showFollowButton"], true);
    assert_eq!(data["user"]["user"]["isFollowedByUser"], true);
    assert_eq!(data["user"]["user"]["bio"], "hi");

    let as_alice = execute(&repo, viewer("u1", "alice"), query).await;
    let data = as_alice.data.into_json().unwrap();
    assert_eq!(data["user"]["showFollowButton"], false);
}
