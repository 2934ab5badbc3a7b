use crate::e2e::helpers;

use helpers::{TestContext, TEST_MAX_CHUNK_CHARS, TEST_MAX_CONCURRENT_SYNTHESIS};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_plain_text_as_single_file(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/synthesize", &json!({ "text": "Hello world" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["filename"], json!("audio.mp3"));
    assert!(body.get("multipart").is_none());
    assert!(body.get("errors").is_none());

    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("/api/audio/"));
    assert_eq!(
        body["downloadUrl"].as_str().unwrap(),
        url.replace("/api/audio/", "/api/download/")
    );

    let audio = ctx.client.get(url).await.unwrap();
    audio.assert_status(StatusCode::OK);
    assert_eq!(audio.body_bytes, b"Hello world");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_split_separated_text_into_parts(ctx: &TestContext) {
    let text = "---------- intro\nWelcome to the show.\n---------- outro\nThanks for listening.";

    let response = ctx
        .client
        .post("/api/synthesize", &json!({ "text": text }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["multipart"], json!(true));
    assert_eq!(body["errors"], json!([]));

    let results = body["results"].as_array().unwrap();
    let names: Vec<&str> = results.iter().map(|r| r["name"].as_str().unwrap()).collect();
    let filenames: Vec<&str> = results.iter().map(|r| r["filename"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["intro", "outro"]);
    assert_eq!(filenames, vec!["intro.mp3", "outro.mp3"]);

    let outro = ctx.client.get(results[1]["url"].as_str().unwrap()).await.unwrap();
    assert_eq!(outro.body_bytes, b"Thanks for listening.");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_suffix_duplicate_section_names(ctx: &TestContext) {
    let text = "---------- part\nFirst.\n---------- part\nSecond.\n---------- \nThird.";

    let response = ctx
        .client
        .post("/api/synthesize", &json!({ "text": text }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let results = response.body()["results"].as_array().unwrap().clone();
    let names: Vec<&str> = results.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["part", "part_2", "section_3"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_chunk_long_text_and_reassemble_in_order(ctx: &TestContext) {
    let text = "The quick brown fox jumps over the lazy dog. \
                Pack my box with five dozen liquor jugs. \
                How vexingly quick daft zebras jump.";

    let response = ctx
        .client
        .post("/api/synthesize", &json!({ "text": text }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let calls = ctx.provider.calls();
    assert!(calls.len() >= 3, "expected several chunks, got {}", calls.len());
    assert!(calls.iter().all(|c| c.text.chars().count() <= TEST_MAX_CHUNK_CHARS));

    let url = response.body()["url"].as_str().unwrap().to_string();
    let audio = ctx.client.get(&url).await.unwrap();
    assert_eq!(audio.body_bytes, text.as_bytes());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_use_requested_voice_for_every_call(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/synthesize",
            &json!({
                "text": "---------- a\nOne.\n---------- b\nTwo.",
                "voiceId": "Matthew",
                "languageCode": "en-GB"
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let calls = ctx.provider.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.voice_id == "Matthew" && c.language_code == "en-GB"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fall_back_to_default_voice(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/synthesize", &json!({ "text": "Hi", "voiceId": "" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let calls = ctx.provider.calls();
    assert_eq!(calls[0].voice_id, ctx.config.default_voice_id);
    assert_eq!(calls[0].language_code, ctx.config.default_language_code);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/synthesize", &json!({ "text": "" }))
        .await
        .unwrap();
    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("No text provided");

    let response = ctx.client.post("/api/synthesize", &json!({})).await.unwrap();
    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("No text provided");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_text_without_content(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/synthesize", &json!({ "text": "  \n\n---------- \n   " }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("No text to convert");
    assert!(ctx.provider.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_invalid_voice(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/synthesize",
            &json!({ "text": "Hello", "voiceId": "../../etc" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Invalid voice id");
    assert!(ctx.provider.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_failed_sections_next_to_successes(ctx: &TestContext) {
    ctx.provider.fail_when_contains("BROKEN");

    let response = ctx
        .client
        .post(
            "/api/synthesize",
            &json!({
                "text": "---------- a\nFine.\n---------- b\nThis is BROKEN.\n---------- c\nAlso fine."
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body();
    assert_eq!(body["multipart"], json!(true));

    let names: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a", "c"]);

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["name"], json!("b"));
    assert!(errors[0]["error"].as_str().unwrap().contains("unsupported content"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_discard_a_section_when_any_chunk_fails(ctx: &TestContext) {
    ctx.provider.fail_when_contains("BROKEN");
    // Long enough to span several chunks; only the last one fails
    let long_section = "Lorem ipsum dolor sit amet consectetur. Sed do eiusmod tempor incididunt. BROKEN";

    let response = ctx
        .client
        .post(
            "/api/synthesize",
            &json!({ "text": format!("---------- ok\nShort.\n---------- long\n{}", long_section) }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body();
    assert_eq!(body["multipart"], json!(true));
    assert!(body.get("filename").is_none());

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], json!("ok"));
    assert_eq!(results[0]["filename"], json!("ok.mp3"));
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["name"], json!("long"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_answer_multipart_for_a_single_labelled_section(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/synthesize", &json!({ "text": "---------- Chapter 1
Only chapter." }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body();
    assert_eq!(body["multipart"], json!(true));
    assert_eq!(body["results"][0]["name"], json!("Chapter 1"));
    assert_eq!(body["results"][0]["filename"], json!("Chapter_1.mp3"));
    assert_eq!(body["errors"], json!([]));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_when_every_section_fails(ctx: &TestContext) {
    ctx.provider.fail_when_contains("BROKEN");

    let response = ctx
        .client
        .post(
            "/api/synthesize",
            &json!({ "text": "---------- a\nBROKEN one\n---------- b\nBROKEN two" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error_message("All sections failed to synthesize");

    let details = response.body()["details"].as_array().unwrap().clone();
    let names: Vec<&str> = details.iter().map(|d| d["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_bound_provider_calls_in_flight(ctx: &TestContext) {
    ctx.provider.set_delay(Duration::from_millis(30));
    let text = (1..=6)
        .map(|i| format!("---------- s{}\nSection number {}.", i, i))
        .collect::<Vec<_>>()
        .join("\n");
    let request = json!({ "text": text });

    // Two concurrent requests share one pool
    let (first, second) = tokio::join!(
        ctx.client.post("/api/synthesize", &request),
        ctx.client.post("/api/synthesize", &request),
    );

    first.unwrap().assert_status(StatusCode::OK);
    second.unwrap().assert_status(StatusCode::OK);
    assert_eq!(ctx.provider.calls().len(), 12);
    assert_eq!(ctx.provider.peak_in_flight(), TEST_MAX_CONCURRENT_SYNTHESIS);
}
