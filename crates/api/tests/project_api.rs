//! HTTP-level integration tests for the `/projects` endpoints: posting,
//! listing, views, responding and the owner's decision.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, patch_json_auth, post_json, post_json_auth};
use serde_json::json;
use sqlx::PgPool;

fn project_body(title: &str, category: &str, budget: i64) -> serde_json::Value {
    json!({
        "title": title,
        "description": "A project description that is long enough",
        "category": category,
        "budget": budget,
    })
}

// ---------------------------------------------------------------------------
// Creating projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_client_creates_project(pool: PgPool) {
    let app = common::build_test_app(pool);
    let client = common::register_client(&app, "owner").await;

    let body = json!({
        "title": "  Build a landing page ",
        "description": "Need a responsive landing page for a product launch",
        "category": "design",
        "budget": 50000,
        "deadline": "2 weeks",
        "skills": ["Figma", " ", "HTML"],
    });
    let response = post_json_auth(app, "/api/v1/projects", body, &client.token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let project = &body_json(response).await["project"];
    assert_eq!(project["title"], "Build a landing page");
    assert_eq!(project["owner_id"], client.id);
    assert_eq!(project["status"], "open");
    assert_eq!(project["views"], 0);
    assert_eq!(project["skills"], json!(["Figma", "HTML"]));
    assert_eq!(project["responses"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_freelancer_cannot_create_project(pool: PgPool) {
    let app = common::build_test_app(pool);
    let freelancer = common::register_freelancer(&app, "nope").await;

    let body = project_body("Freelancer project", "development", 5000);
    let response = post_json_auth(app, "/api/v1/projects", body, &freelancer.token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_project_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = project_body("Anonymous project", "development", 5000);
    let response = post_json(app, "/api/v1/projects", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_project_validation(pool: PgPool) {
    let app = common::build_test_app(pool);
    let client = common::register_client(&app, "strict").await;

    let cases = [
        project_body("Tiny", "development", 5000),
        project_body("Valid title", "cooking", 5000),
        project_body("Valid title", "development", 999),
        json!({"title": "Valid title", "description": "short", "category": "seo", "budget": 5000}),
        json!({
            "title": "Valid title",
            "description": "A project description that is long enough",
            "category": "seo",
            "budget": 5000,
            "skills": vec!["x"; 11],
        }),
    ];
    for body in cases {
        let response =
            post_json_auth(app.clone(), "/api/v1/projects", body.clone(), &client.token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR", "body: {body}");
    }
}

// ---------------------------------------------------------------------------
// Reading and listing
// ---------------------------------------------------------------------------

/// Each successful GET counts one view; a missing project is 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_project_counts_views(pool: PgPool) {
    let app = common::build_test_app(pool);
    let client = common::register_client(&app, "viewed").await;
    let id = common::create_project(&app, &client, "Counted project", 10000).await;

    get(app.clone(), &format!("/api/v1/projects/{id}")).await;
    let response = get(app.clone(), &format!("/api/v1/projects/{id}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["project"]["views"], 2);

    let missing = get(app, "/api/v1/projects/999999").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_projects_filters_and_paginates(pool: PgPool) {
    let app = common::build_test_app(pool);
    let client = common::register_client(&app, "lister").await;

    for i in 0..3 {
        let body = project_body(&format!("Rust service {i}"), "development", 10000);
        post_json_auth(app.clone(), "/api/v1/projects", body, &client.token).await;
    }
    let body = project_body("Logo refresh", "design", 10000);
    post_json_auth(app.clone(), "/api/v1/projects", body, &client.token).await;

    let response = get(app.clone(), "/api/v1/projects?category=development&limit=2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["pages"], 2);
    assert_eq!(json["page"], 1);
    assert_eq!(json["projects"].as_array().unwrap().len(), 2);
    // Newest first.
    assert_eq!(json["projects"][0]["title"], "Rust service 2");

    let json = body_json(get(app.clone(), "/api/v1/projects?search=LOGO").await).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["projects"][0]["title"], "Logo refresh");

    let json = body_json(get(app.clone(), "/api/v1/projects?category=all").await).await;
    assert_eq!(json["total"], 4);

    let response = get(app, "/api/v1/projects?category=cooking").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// A page far past the last one is just empty.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_projects_huge_page_is_empty(pool: PgPool) {
    let app = common::build_test_app(pool);
    let client = common::register_client(&app, "far").await;
    common::create_project(&app, &client, "Only project here", 10000).await;

    let response = get(app.clone(), "/api/v1/projects?page=4611686018427387903").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["page"], 4611686018427387903_i64);
    assert!(json["projects"].as_array().unwrap().is_empty());

    let response = get(app, "/api/v1/users/freelancers?page=4611686018427387903").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["freelancers"]
        .as_array()
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Responding
// ---------------------------------------------------------------------------

/// Defaults are resolved against the budget; a second response is a conflict.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_freelancer_responds_once(pool: PgPool) {
    let app = common::build_test_app(pool);
    let client = common::register_client(&app, "poster").await;
    let freelancer = common::register_freelancer(&app, "bidder").await;
    let id = common::create_project(&app, &client, "Needs a bidder", 10000).await;
    let uri = format!("/api/v1/projects/{id}/respond");

    let response = post_json_auth(app.clone(), &uri, json!({}), &freelancer.token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let bid = &body_json(response).await["response"];
    assert_eq!(bid["freelancer_id"], freelancer.id);
    assert_eq!(bid["price"], 8000.0);
    assert_eq!(bid["timeline"], "2 weeks");
    assert_eq!(bid["status"], "pending");

    let again = json!({"proposal": "Second try", "price": 0});
    let response = post_json_auth(app, &uri, again, &freelancer.token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_client_cannot_respond(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = common::register_client(&app, "first").await;
    let other = common::register_client(&app, "second").await;
    let id = common::create_project(&app, &owner, "Clients only post", 10000).await;

    let uri = format!("/api/v1/projects/{id}/respond");
    let response = post_json_auth(app, &uri, json!({}), &other.token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_respond_to_missing_project(pool: PgPool) {
    let app = common::build_test_app(pool);
    let freelancer = common::register_freelancer(&app, "lost").await;

    let response = post_json_auth(
        app,
        "/api/v1/projects/424242/respond",
        json!({}),
        &freelancer.token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// An explicit zero price is kept.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_zero_price_is_kept(pool: PgPool) {
    let app = common::build_test_app(pool);
    let client = common::register_client(&app, "free").await;
    let freelancer = common::register_freelancer(&app, "volunteer").await;
    let id = common::create_project(&app, &client, "Volunteer work", 10000).await;

    let body = json!({"price": 0, "proposal": "Happy to help", "timeline": "1 week"});
    let response = post_json_auth(
        app,
        &format!("/api/v1/projects/{id}/respond"),
        body,
        &freelancer.token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let bid = &body_json(response).await["response"];
    assert_eq!(bid["price"], 0.0);
    assert_eq!(bid["timeline"], "1 week");
}

// ---------------------------------------------------------------------------
// Deciding
// ---------------------------------------------------------------------------

/// Accepting moves the project to in_progress; deciding again is a conflict.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_owner_accepts_response(pool: PgPool) {
    let app = common::build_test_app(pool);
    let client = common::register_client(&app, "decider").await;
    let first = common::register_freelancer(&app, "chosen").await;
    let second = common::register_freelancer(&app, "waiting").await;
    let id = common::create_project(&app, &client, "Pick one bidder", 20000).await;

    let respond = format!("/api/v1/projects/{id}/respond");
    let chosen = body_json(post_json_auth(app.clone(), &respond, json!({}), &first.token).await)
        .await["response"]["id"]
        .as_i64()
        .unwrap();
    post_json_auth(app.clone(), &respond, json!({}), &second.token).await;

    let decide = format!("/api/v1/projects/{id}/responses/{chosen}");
    let response =
        patch_json_auth(app.clone(), &decide, json!({"status": "accepted"}), &client.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["response"]["status"], "accepted");

    let project = &body_json(get(app.clone(), &format!("/api/v1/projects/{id}")).await).await
        ["project"];
    assert_eq!(project["status"], "in_progress");
    // The other response stays pending.
    let statuses: Vec<_> = project["responses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["status"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(statuses, vec!["accepted", "pending"]);

    let response =
        patch_json_auth(app.clone(), &decide, json!({"status": "rejected"}), &client.token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // No longer listed among open projects.
    let json = body_json(get(app.clone(), "/api/v1/projects").await).await;
    assert_eq!(json["total"], 0);
    let json = body_json(get(app, "/api/v1/projects?status=in_progress").await).await;
    assert_eq!(json["total"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_decision_rules(pool: PgPool) {
    let app = common::build_test_app(pool);
    let client = common::register_client(&app, "rules").await;
    let stranger = common::register_client(&app, "stranger").await;
    let freelancer = common::register_freelancer(&app, "subject").await;
    let id = common::create_project(&app, &client, "Rules project", 20000).await;
    let other_id = common::create_project(&app, &client, "Other project", 20000).await;

    let response_id = body_json(
        post_json_auth(
            app.clone(),
            &format!("/api/v1/projects/{id}/respond"),
            json!({}),
            &freelancer.token,
        )
        .await,
    )
    .await["response"]["id"]
        .as_i64()
        .unwrap();
    let decide = format!("/api/v1/projects/{id}/responses/{response_id}");

    // Not the owner.
    let response =
        patch_json_auth(app.clone(), &decide, json!({"status": "accepted"}), &stranger.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Only accepted/rejected are decisions.
    let response =
        patch_json_auth(app.clone(), &decide, json!({"status": "pending"}), &client.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response =
        patch_json_auth(app.clone(), &decide, json!({"status": "maybe"}), &client.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Response ids are scoped to their project.
    let wrong_project = format!("/api/v1/projects/{other_id}/responses/{response_id}");
    let response = patch_json_auth(
        app.clone(),
        &wrong_project,
        json!({"status": "accepted"}),
        &client.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Rejecting leaves the project open.
    let response =
        patch_json_auth(app.clone(), &decide, json!({"status": "rejected"}), &client.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let project = &body_json(get(app, &format!("/api/v1/projects/{id}")).await).await["project"];
    assert_eq!(project["status"], "open");
}

// ---------------------------------------------------------------------------
// "My" listings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_my_responses_include_project_summary(pool: PgPool) {
    let app = common::build_test_app(pool);
    let client = common::register_client(&app, "summary").await;
    let freelancer = common::register_freelancer(&app, "busy").await;
    let id = common::create_project(&app, &client, "Summarised project", 30000).await;
    post_json_auth(
        app.clone(),
        &format!("/api/v1/projects/{id}/respond"),
        json!({"proposal": "I can do it"}),
        &freelancer.token,
    )
    .await;

    let response = get_auth(app.clone(), "/api/v1/projects/my/responses", &freelancer.token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let responses = json["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["proposal"], "I can do it");
    assert_eq!(responses[0]["project"]["id"], id);
    assert_eq!(responses[0]["project"]["title"], "Summarised project");
    assert_eq!(responses[0]["project"]["budget"], 30000);
    assert_eq!(responses[0]["project"]["owner"]["full_name"], "Client summary");

    let response = get(app, "/api/v1/projects/my/responses").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_my_projects_lists_only_own(pool: PgPool) {
    let app = common::build_test_app(pool);
    let mine = common::register_client(&app, "mine").await;
    let theirs = common::register_client(&app, "theirs").await;
    common::create_project(&app, &mine, "My first project", 10000).await;
    common::create_project(&app, &mine, "My second project", 10000).await;
    common::create_project(&app, &theirs, "Their project", 10000).await;

    let response = get_auth(app, "/api/v1/projects/client/my-projects", &mine.token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let titles: Vec<_> = json["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["My second project", "My first project"]);
}
