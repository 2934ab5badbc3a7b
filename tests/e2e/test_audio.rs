use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

async fn synthesize_intro(ctx: &TestContext) -> serde_json::Value {
    let response = ctx
        .client
        .post(
            "/api/synthesize",
            &json!({ "text": "---------- intro\nHello there.\n---------- outro\nBye." }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    response.body()["results"][0].clone()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_audio_inline(ctx: &TestContext) {
    let intro = synthesize_intro(ctx).await;

    let response = ctx.client.get(intro["url"].as_str().unwrap()).await.unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/mpeg");
    assert!(response.header("content-disposition").is_none());
    assert_eq!(response.body_bytes, b"Hello there.");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_download_under_display_name(ctx: &TestContext) {
    let intro = synthesize_intro(ctx).await;

    let response = ctx
        .client
        .get(intro["downloadUrl"].as_str().unwrap())
        .await
        .unwrap();

    response.assert_status(StatusCode::OK).assert_header(
        "content-disposition",
        "attachment; filename=\"intro.mp3\"; filename*=UTF-8''intro.mp3",
    );
    assert_eq!(response.body_bytes, b"Hello there.");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_find_audio_by_stem(ctx: &TestContext) {
    let intro = synthesize_intro(ctx).await;
    let stem = intro["url"]
        .as_str()
        .unwrap()
        .trim_start_matches("/api/audio/")
        .trim_end_matches(".mp3")
        .to_string();

    let response = ctx
        .client
        .get(&format!("/api/download/{}", stem))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body_bytes, b"Hello there.");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_audio(ctx: &TestContext) {
    let response = ctx.client.get("/api/audio/does-not-exist.mp3").await.unwrap();
    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("File not found");

    let response = ctx.client.get("/api/download/does-not-exist.mp3").await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_serve_files_outside_output_dir(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/api/audio/..%2F..%2Fetc%2Fpasswd")
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);

    let response = ctx.client.get("/api/download/file_mapping.json").await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
}
