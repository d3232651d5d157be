//! Integration tests for terms placed in vocabularies.
//!
//! Every test drives the HTTP API of a fresh in-memory application.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use croogo_test_utils::{assert, test_term};
use serde_json::json;

#[tokio::test]
async fn adding_same_slug_reuses_term() {
    let app = TestApp::new();
    let tags = app.create_vocabulary("tags").await;
    let categories = app.create_vocabulary("categories").await;

    let first = app.add_term(tags, &test_term("Rust")).await;
    let second = app.add_term(categories, &test_term("Rust Lang").with_slug("rust")).await;

    assert_eq!(first["term_id"], second["term_id"]);
    assert_ne!(first["id"], second["id"]);

    // The existing title wins when no description is supplied.
    let (_, terms) = app.get(&format!("/api/vocabularies/{categories}/terms")).await;
    assert::field_values(&terms, "title", &["Rust"]);
}

#[tokio::test]
async fn term_not_added_twice_to_vocabulary() {
    let app = TestApp::new();
    let tags = app.create_vocabulary("tags").await;
    app.add_term(tags, &test_term("Rust")).await;

    let (status, body) = app
        .post(
            &format!("/api/vocabularies/{tags}/terms"),
            &test_term("Rust").to_json(),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert::has_key(&body, "error");
    assert_eq!(app.state.taxonomy().threaded(tags).await.unwrap().len(), 1);
}

#[tokio::test]
async fn new_description_updates_reused_term() {
    let app = TestApp::new();
    let tags = app.create_vocabulary("tags").await;
    let topics = app.create_vocabulary("topics").await;
    let first = app.add_term(tags, &test_term("Rust")).await;

    app.add_term(topics, &test_term("Rust").with_description("Systems language"))
        .await;

    let term_id = first["term_id"].as_i64().unwrap();
    let term = app.state.taxonomy().term(term_id).await.unwrap().unwrap();
    assert_eq!(term.description.as_deref(), Some("Systems language"));
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let app = TestApp::new();
    let tags = app.create_vocabulary("tags").await;

    let (status, body) = app
        .post(
            &format!("/api/vocabularies/{tags}/terms"),
            &json!({ "title": "  ", "slug": "blank" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["title"][0], "The title cannot be empty");
}

#[tokio::test]
async fn unknown_vocabulary_is_not_found() {
    let app = TestApp::new();
    let (status, _) = app
        .post("/api/vocabularies/999/terms", &test_term("Rust").to_json())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_blocked_while_placed() {
    let app = TestApp::new();
    let tags = app.create_vocabulary("tags").await;
    let row = app.add_term(tags, &test_term("Rust")).await;
    let term_id = row["term_id"].as_i64().unwrap();

    let (status, _) = app.delete(&format!("/api/terms/{term_id}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Removing the placement deletes the now unused term too.
    let (status, body) = app
        .delete(&format!("/api/vocabularies/{tags}/terms/{term_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["term_deleted"], true);

    let (status, _) = app.delete(&format!("/api/terms/{term_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn removal_keeps_term_used_elsewhere() {
    let app = TestApp::new();
    let tags = app.create_vocabulary("tags").await;
    let topics = app.create_vocabulary("topics").await;
    let row = app.add_term(tags, &test_term("Rust")).await;
    app.add_term(topics, &test_term("Rust")).await;
    let term_id = row["term_id"].as_i64().unwrap();

    let (status, body) = app
        .delete(&format!("/api/vocabularies/{tags}/terms/{term_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["term_deleted"], false);

    let (_, terms) = app.get(&format!("/api/vocabularies/{topics}/terms")).await;
    assert::field_values(&terms, "slug", &["rust"]);
    let (_, terms) = app.get(&format!("/api/vocabularies/{tags}/terms")).await;
    assert_eq!(terms, json!([]));
}

#[tokio::test]
async fn removing_parent_removes_subtree() {
    let app = TestApp::new();
    let tags = app.create_vocabulary("tags").await;
    let parent = app.add_term(tags, &test_term("Languages")).await;
    let parent_row = parent["id"].as_i64().unwrap();
    app.add_term(tags, &test_term("Rust").under(parent_row)).await;
    app.add_term(tags, &test_term("Go").under(parent_row)).await;
    app.add_term(tags, &test_term("Editors")).await;

    let parent_term = parent["term_id"].as_i64().unwrap();
    app.delete(&format!("/api/vocabularies/{tags}/terms/{parent_term}"))
        .await;

    let (_, tree) = app.get(&format!("/api/vocabularies/{tags}/tree")).await;
    assert::field_values(&tree, "slug", &["editors"]);
}

#[tokio::test]
async fn tree_lists_children_after_parent() {
    let app = TestApp::new();
    let tags = app.create_vocabulary("tags").await;
    let parent = app.add_term(tags, &test_term("Languages")).await;
    app.add_term(tags, &test_term("Editors")).await;
    app.add_term(tags, &test_term("Rust").under(parent["id"].as_i64().unwrap()))
        .await;

    let (status, tree) = app.get(&format!("/api/vocabularies/{tags}/tree")).await;

    assert_eq!(status, StatusCode::OK);
    assert::field_values(&tree, "slug", &["languages", "rust", "editors"]);
    assert_eq!(tree[1]["depth"], 1);
}

#[tokio::test]
async fn move_up_and_down_reorder_siblings() {
    let app = TestApp::new();
    let tags = app.create_vocabulary("tags").await;
    app.add_term(tags, &test_term("Alpha")).await;
    let beta = app.add_term(tags, &test_term("Beta")).await;
    let beta_term = beta["term_id"].as_i64().unwrap();

    let (status, body) = app
        .post(
            &format!("/api/vocabularies/{tags}/terms/{beta_term}/move-up"),
            &json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moved"], true);
    let (_, terms) = app.get(&format!("/api/vocabularies/{tags}/terms")).await;
    assert::field_values(&terms, "slug", &["beta", "alpha"]);

    // Already first.
    let (_, body) = app
        .post(
            &format!("/api/vocabularies/{tags}/terms/{beta_term}/move-up"),
            &json!({}),
        )
        .await;
    assert_eq!(body["moved"], false);

    app.post(
        &format!("/api/vocabularies/{tags}/terms/{beta_term}/move-down"),
        &json!({}),
    )
    .await;
    let (_, terms) = app.get(&format!("/api/vocabularies/{tags}/terms")).await;
    assert::field_values(&terms, "slug", &["alpha", "beta"]);
}

#[tokio::test]
async fn edit_renames_term() {
    let app = TestApp::new();
    let tags = app.create_vocabulary("tags").await;
    let row = app.add_term(tags, &test_term("Rust")).await;
    let term_id = row["term_id"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/vocabularies/{tags}/terms/{term_id}"),
            &json!({ "title": "Rust 2024", "slug": "rust-2024" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["id"], row["id"]);
    let (_, terms) = app.get(&format!("/api/vocabularies/{tags}/terms")).await;
    assert::field_values(&terms, "slug", &["rust-2024"]);
}

#[tokio::test]
async fn edit_to_taken_slug_is_rejected() {
    let app = TestApp::new();
    let tags = app.create_vocabulary("tags").await;
    app.add_term(tags, &test_term("Go")).await;
    let row = app.add_term(tags, &test_term("Rust")).await;
    let term_id = row["term_id"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/vocabularies/{tags}/terms/{term_id}"),
            &json!({ "title": "Rust", "slug": "go" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["slug"][0], "That slug is already taken");
}

#[tokio::test]
async fn edit_moves_term_to_other_vocabulary() {
    let app = TestApp::new();
    let tags = app.create_vocabulary("tags").await;
    let topics = app.create_vocabulary("topics").await;
    let row = app.add_term(tags, &test_term("Rust")).await;
    let term_id = row["term_id"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/vocabularies/{tags}/terms/{term_id}"),
            &json!({ "title": "Rust", "slug": "rust", "vocabulary_id": topics }),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["vocabulary_id"], topics);
    let (_, terms) = app.get(&format!("/api/vocabularies/{tags}/terms")).await;
    assert_eq!(terms, json!([]));
    let (_, terms) = app.get(&format!("/api/vocabularies/{topics}/terms")).await;
    assert::field_values(&terms, "slug", &["rust"]);
}

#[tokio::test]
async fn parent_must_share_vocabulary() {
    let app = TestApp::new();
    let tags = app.create_vocabulary("tags").await;
    let topics = app.create_vocabulary("topics").await;
    let foreign = app.add_term(topics, &test_term("Languages")).await;

    let (status, body) = app
        .post(
            &format!("/api/vocabularies/{tags}/terms"),
            &test_term("Rust")
                .under(foreign["id"].as_i64().unwrap())
                .to_json(),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["fields"]["parent_id"][0],
        "The parent must belong to the same vocabulary"
    );
}
