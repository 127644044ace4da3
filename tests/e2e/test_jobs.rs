use crate::e2e::helpers;

use helpers::{api_client::TestClient, stubs::MetronomeSpeech, Stubs, TestContext};
use hyper::StatusCode;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::time::Duration;
use test_context::test_context;

/// Poll the progress endpoint until the job leaves pending/running
async fn wait_for_job(client: &TestClient, progress_url: &str) -> Value {
    for _ in 0..200 {
        let response = client.get(progress_url).await.unwrap();
        response.assert_status(StatusCode::OK);
        let body = response.body.clone().unwrap();
        match body["status"].as_str() {
            Some("completed") | Some("failed") => return body,
            _ => tokio::time::sleep(Duration::from_millis(25)).await,
        }
    }
    panic!("job at {} never finished", progress_url);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_in_the_background_and_serve_the_result(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/generate/async", &json!({ "topics": ["renewable energy"], "duration": 1 }))
        .await
        .unwrap();

    response.assert_status(StatusCode::ACCEPTED);
    let accepted = response.body.as_ref().unwrap();
    let job_id = accepted["job_id"].as_str().unwrap().to_string();
    assert_eq!(accepted["status"].as_str(), Some("pending"));
    assert_eq!(accepted["progress_url"].as_str(), Some(format!("/progress/{}", job_id).as_str()));
    assert_eq!(accepted["result_url"].as_str(), Some(format!("/result/{}", job_id).as_str()));

    let progress = wait_for_job(&ctx.client, &format!("/progress/{}", job_id)).await;
    assert_eq!(progress["status"].as_str(), Some("completed"));
    assert_eq!(progress["progress_percent"].as_u64(), Some(100));
    assert_eq!(progress["step"].as_str(), Some("completed"));
    assert!(progress.get("result").is_none());

    let result = ctx.client.get(&format!("/result/{}", job_id)).await.unwrap();
    result.assert_status(StatusCode::OK);
    let bulletin = result.body.as_ref().unwrap();
    assert!(bulletin["script"].as_str().unwrap().contains("renewable energy"));
    assert_eq!(bulletin["target_words"].as_u64(), Some(150));

    let filename = bulletin["audio"]["filename"].as_str().unwrap();
    ctx.client
        .get(&format!("/download/{}", filename))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_invalid_background_requests_up_front(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/generate/async", &json!({ "topics": [], "duration": 1 }))
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_message("topics");

    let response = ctx.client.post_raw("/generate/async", "{\"topics\": [").await.unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(ctx.news.calls.load(Ordering::SeqCst), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_unknown_jobs(ctx: &TestContext) {
    for path in [
        "/progress/3f1c6a2e-8d4b-4c1a-9a6e-2b7d5e0f1a99",
        "/result/3f1c6a2e-8d4b-4c1a-9a6e-2b7d5e0f1a99",
        "/progress/not-a-job",
    ] {
        ctx.client.get(path).await.unwrap().assert_status(StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn it_should_surface_dependency_failures_of_background_jobs() {
    let ctx = TestContext::with_stubs(Stubs {
        speech: MetronomeSpeech::failing(),
        ..Stubs::default()
    })
    .await;

    let response = ctx
        .client
        .post("/generate/async", &json!({ "topics": ["markets"], "duration": 1 }))
        .await
        .unwrap();
    response.assert_status(StatusCode::ACCEPTED);
    let job_id = response.body.as_ref().unwrap()["job_id"].as_str().unwrap().to_string();

    let progress = wait_for_job(&ctx.client, &format!("/progress/{}", job_id)).await;
    assert_eq!(progress["status"].as_str(), Some("failed"));
    assert_eq!(progress["error"]["dependency"].as_str(), Some("tts"));

    let result = ctx.client.get(&format!("/result/{}", job_id)).await.unwrap();
    result.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(
        result.body.as_ref().unwrap()["dependency"].as_str(),
        Some("tts")
    );
    assert_eq!(ctx.stored_files(), 0);
}
