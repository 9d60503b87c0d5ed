//! Health, static file server and admin endpoints

mod common;

use chirpy::configuration::Platform;
use common::{spawn_app, spawn_app_with, test_settings};

#[tokio::test]
async fn healthz_works() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(&app.url("/api/healthz"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn metrics_counts_file_server_hits() {
    let app = spawn_app().await;

    for _ in 0..3 {
        app.client
            .get(&app.url("/app/"))
            .send()
            .await
            .expect("Failed to execute request");
    }
    // Outside /app, not counted
    app.client
        .get(&app.url("/api/healthz"))
        .send()
        .await
        .expect("Failed to execute request");

    let response = app
        .client
        .get(&app.url("/admin/metrics"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    let body = response.text().await.unwrap();
    assert!(body.contains("Welcome, Chirpy Admin"));
    assert!(body.contains("Chirpy has been visited 3 times!"));
}

#[tokio::test]
async fn reset_clears_hits_and_users() {
    let app = spawn_app().await;
    app.create_user("walt@breakingbad.com").await;
    app.client
        .get(&app.url("/app/"))
        .send()
        .await
        .expect("Failed to execute request");

    let response = app
        .client
        .post(&app.url("/admin/reset"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    let metrics = app
        .client
        .get(&app.url("/admin/metrics"))
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .unwrap();
    assert!(metrics.contains("visited 0 times!"));

    // The email is free again
    app.create_user("walt@breakingbad.com").await;
}

#[tokio::test]
async fn reset_is_forbidden_outside_dev() {
    let app = spawn_app_with(test_settings(Platform::Prod)).await;

    let response = app
        .client
        .post(&app.url("/admin/reset"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(403, response.status().as_u16());
}
