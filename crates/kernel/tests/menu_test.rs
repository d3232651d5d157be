//! Integration tests for `[menu:alias]` shortcodes rendered through the
//! layout filter.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use croogo_kernel::models::{CreateLink, CreateMenu};
use croogo_test_utils::assert;
use serde_json::json;

/// Creates the `blogroll` menu with two root links and one child.
async fn blogroll(app: &TestApp) -> i64 {
    let menus = app.state.menus();
    let menu = menus
        .create_menu(&CreateMenu::new("Blogroll", "blogroll"))
        .await
        .unwrap();
    let home = menus
        .create_link(&CreateLink::new(menu.id, "Home", "/"))
        .await
        .unwrap();
    menus
        .create_link(&CreateLink::new(menu.id, "About", "/about"))
        .await
        .unwrap();
    menus
        .create_link(&CreateLink::new(menu.id, "News", "/news").under(home.id))
        .await
        .unwrap();
    menu.id
}

async fn render(app: &TestApp, content: &str, path: &str) -> String {
    let (status, body) = app
        .post("/api/render", &json!({ "content": content, "path": path }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["content"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn shortcode_renders_menu() {
    let app = TestApp::new();
    let id = blogroll(&app).await;

    let html = render(&app, "Before [menu:blogroll] after", "/elsewhere").await;

    assert::contains(&html, &format!(r#"<div id="menu-{id}" class="menu">"#));
    assert!(html.starts_with("Before "));
    assert!(html.ends_with("</div> after"));
    assert::contains(&html, r#">Home</a><ul><li><a href="/news""#);
    assert::not_contains(&html, "[menu:");
}

#[tokio::test]
async fn short_form_and_attributes() {
    let app = TestApp::new();
    blogroll(&app).await;

    let html = render(&app, r#"[m:blogroll tag="ol" class="nav"]"#, "/about").await;

    assert::contains(&html, r#"<ol class="nav">"#);
    assert::contains(&html, r#"<a href="/about" id="#);
    assert::contains(&html, r#"class="selected">About</a>"#);
    assert::not_contains(&html, "<ul");
}

#[tokio::test]
async fn unknown_menu_renders_nothing() {
    let app = TestApp::new();
    blogroll(&app).await;

    let html = render(&app, "x[menu:missing]y", "/").await;
    assert_eq!(html, "xy");
}

#[tokio::test]
async fn inactive_menu_renders_nothing() {
    let app = TestApp::new();
    let mut input = CreateMenu::new("Hidden", "hidden");
    input.status = Some(false);
    app.state.menus().create_menu(&input).await.unwrap();

    let html = render(&app, "[menu:hidden]", "/").await;
    assert_eq!(html, "");
}

#[tokio::test]
async fn content_without_shortcodes_is_untouched() {
    let app = TestApp::new();
    let html = render(&app, "<p>[not a menu]</p>", "/").await;
    assert_eq!(html, "<p>[not a menu]</p>");
}

#[tokio::test]
async fn menu_without_links_renders_wrapper() {
    let app = TestApp::new();
    let menu = app
        .state
        .menus()
        .create_menu(&CreateMenu::new("Footer", "footer"))
        .await
        .unwrap();

    let html = render(&app, "[menu:footer]", "/").await;
    assert_eq!(
        html,
        format!(r#"<div id="menu-{}" class="menu"></div>"#, menu.id)
    );
}

#[tokio::test]
async fn menus_created_over_api_render() {
    let app = TestApp::new();
    let (status, menu) = app
        .post("/api/menus", &json!({ "title": "Main", "alias": "main" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = menu["id"].as_i64().unwrap();

    let (status, link) = app
        .post(
            &format!("/api/menus/{id}/links"),
            &json!({ "title": "Docs", "link": "/docs", "rel": "nofollow" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(link["menu_id"], id);

    let (status, _) = app
        .post("/api/menus", &json!({ "title": "Main again", "alias": "main" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let html = render(&app, "[menu:main]", "/").await;
    assert::contains(&html, r#"rel="nofollow">Docs</a>"#);
}

#[tokio::test]
async fn link_for_unknown_menu_is_not_found() {
    let app = TestApp::new();
    let (status, _) = app
        .post(
            "/api/menus/42/links",
            &json!({ "title": "Docs", "link": "/docs" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
