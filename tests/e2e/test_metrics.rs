use crate::e2e::helpers;

use helpers::{stubs::MetronomeSpeech, Stubs, TestContext};
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_start_with_empty_metrics(ctx: &TestContext) {
    let response = ctx.client.get("/metrics").await.unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_eq!(body["total_generations"].as_u64(), Some(0));
    assert_eq!(body["success_rate"].as_f64(), Some(0.0));
    assert!(body["fastest_ms"].is_null());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_summarise_completed_generations(ctx: &TestContext) {
    for topic in ["energy", "science"] {
        ctx.client
            .post("/generate", &json!({ "topics": [topic], "duration": 1 }))
            .await
            .unwrap()
            .assert_status(StatusCode::OK);
    }
    // Rejected requests are not generations
    ctx.client
        .post("/generate", &json!({ "topics": [] }))
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST);

    let response = ctx.client.get("/metrics").await.unwrap();
    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["total_generations"].as_u64(), Some(2));
    assert_eq!(body["successful"].as_u64(), Some(2));
    assert_eq!(body["success_rate"].as_f64(), Some(100.0));
    assert!(body["mean_latency_ms"].as_f64().is_some());
    assert!(body["mean_timing_accuracy"].as_f64().unwrap() > 95.0);

    let response = ctx.client.get("/performance?recent=1").await.unwrap();
    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    let recent = body["recent"].as_array().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["topics"], json!(["science"]));
    assert_eq!(body["by_preset"][0]["preset"].as_str(), Some("balanced"));
    assert_eq!(body["summary"]["total_generations"].as_u64(), Some(2));
}

#[tokio::test]
async fn it_should_count_failed_generations() {
    let ctx = TestContext::with_stubs(Stubs {
        speech: MetronomeSpeech::failing(),
        ..Stubs::default()
    })
    .await;

    ctx.client
        .post("/generate", &json!({ "topics": ["markets"], "duration": 1 }))
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_GATEWAY);

    let body = ctx.client.get("/performance").await.unwrap().body.unwrap();
    assert_eq!(body["summary"]["failed"].as_u64(), Some(1));
    assert_eq!(body["summary"]["success_rate"].as_f64(), Some(0.0));
    assert_eq!(body["recent"][0]["dependency"].as_str(), Some("tts"));
    assert_eq!(body["recent"][0]["success"].as_bool(), Some(false));
}
