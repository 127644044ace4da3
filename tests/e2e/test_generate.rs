use crate::e2e::helpers;

use helpers::{
    stubs::{MetronomeSpeech, StubNews},
    Stubs, TestContext,
};
use hyper::StatusCode;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use test_context::test_context;

fn field<'a>(body: &'a Value, name: &str) -> &'a Value {
    body.get(name).unwrap_or_else(|| panic!("Missing field '{}' in {}", name, body))
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_a_bulletin(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/generate", &json!({ "topics": ["renewable energy"], "duration": 1 }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();

    // The model obeys the requested length, so the first draft is accepted
    assert_eq!(field(body, "attempts").as_u64(), Some(1));
    assert_eq!(field(body, "retries").as_u64(), Some(0));
    assert_eq!(field(body, "fallback_applied").as_bool(), Some(false));
    assert_eq!(field(body, "no_news").as_bool(), Some(false));
    assert_eq!(field(body, "cached").as_bool(), Some(false));
    assert_eq!(field(body, "preset").as_str(), Some("balanced"));
    assert_eq!(ctx.model.calls.load(Ordering::SeqCst), 1);

    let script = field(body, "script").as_str().unwrap();
    assert!(script.contains("renewable energy"));
    assert!(script.ends_with("Stay informed."));

    // Two queries of three items each, all fresh and distinct
    assert_eq!(field(body, "sources").as_array().unwrap().len(), 6);
    assert_eq!(field(body, "news_quality").as_str(), Some("high"));

    let audio = field(body, "audio");
    let filename = audio["filename"].as_str().unwrap();
    assert!(filename.starts_with("bulletin_") && filename.ends_with(".wav"));
    assert_eq!(audio["download_url"].as_str(), Some(format!("/download/{}", filename).as_str()));
    assert_eq!(audio["provider"].as_str(), Some("openai"));

    // 150 words at 150 wpm plus the fixed pauses
    let accuracy = field(body, "timing_accuracy").as_f64().unwrap();
    assert!(accuracy > 95.0, "timing accuracy {}", accuracy);
    assert_eq!(field(body, "duration_requested_minutes").as_f64(), Some(1.0));

    assert_eq!(ctx.stored_files(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_the_script_word_count_against_target(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/generate", &json!({ "topics": ["ai"], "duration": 2, "preset": "fast" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();

    let words = field(body, "word_count").as_u64().unwrap() as f64;
    // 2 minutes at 150 wpm, intro and outro included
    assert!((words - 300.0).abs() <= 300.0 * 0.08, "word count {}", words);
    assert_eq!(field(body, "target_words").as_u64(), Some(300));
    assert_eq!(field(body, "preset").as_str(), Some("fast"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_target_the_whole_script_at_the_voice_rate(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/generate",
            &json!({ "topics": ["test topic"], "duration": 5, "voice": "onyx" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();

    // 5 minutes at onyx's 142 wpm
    let target = field(body, "target_words").as_u64().unwrap();
    assert_eq!(target, 710);
    let body_target = field(body, "body_target_words").as_u64().unwrap();
    assert!(body_target < target, "body target {} vs {}", body_target, target);

    // The model writes the body exactly, so intro and outro fill the rest
    assert_eq!(field(body, "word_count").as_u64(), Some(target));
    assert_eq!(field(body, "retries").as_u64(), Some(0));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_calibrate_precise_bulletins_against_measured_speech(ctx: &TestContext) {
    // onyx is catalogued at 142 wpm but the stub speaker talks at 150,
    // so the first take comes out about 5% short
    let balanced = ctx
        .client
        .post(
            "/generate",
            &json!({ "topics": ["test topic"], "duration": 10, "voice": "onyx", "preset": "balanced" }),
        )
        .await
        .unwrap();
    balanced.assert_status(StatusCode::OK);
    let balanced = balanced.body.as_ref().unwrap();
    let speech_calls_balanced = ctx.speech.calls.load(Ordering::SeqCst);

    let precise = ctx
        .client
        .post(
            "/generate",
            &json!({ "topics": ["test topic"], "duration": 10, "voice": "onyx", "preset": "precise" }),
        )
        .await
        .unwrap();
    precise.assert_status(StatusCode::OK);
    let precise = precise.body.as_ref().unwrap();

    assert_eq!(field(balanced, "attempts").as_u64(), Some(1));
    assert!(field(precise, "attempts").as_u64().unwrap() > 1);
    assert!(field(precise, "retries").as_u64().unwrap() >= 1);

    // A second take was recorded: intro, body and outro again
    let speech_calls_precise = ctx.speech.calls.load(Ordering::SeqCst) - speech_calls_balanced;
    assert_eq!(speech_calls_precise, 6);

    let balanced_accuracy = field(balanced, "timing_accuracy").as_f64().unwrap();
    let precise_accuracy = field(precise, "timing_accuracy").as_f64().unwrap();
    assert!(
        precise_accuracy > balanced_accuracy,
        "precise {} vs balanced {}",
        precise_accuracy,
        balanced_accuracy
    );
    assert!(precise_accuracy > 98.0, "precise accuracy {}", precise_accuracy);

    // The kept take was targeted at the measured 150 wpm
    let target = field(precise, "target_words").as_u64().unwrap();
    assert!((1495..=1505).contains(&target), "calibrated target {}", target);
    assert_eq!(ctx.stored_files(), 2);
}

#[tokio::test]
async fn it_should_narrate_a_templated_bulletin_without_news() {
    let ctx = TestContext::with_stubs(Stubs {
        news: StubNews::new(0),
        ..Stubs::default()
    })
    .await;

    let response = ctx
        .client
        .post("/generate", &json!({ "topics": ["obscure topic"], "duration": 1 }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(field(body, "no_news").as_bool(), Some(true));
    assert_eq!(field(body, "news_quality").as_str(), Some("none"));
    assert!(field(body, "sources").as_array().unwrap().is_empty());
    assert!(field(body, "audio")["filename"].as_str().is_some());

    // Nothing to summarise, so the model is never called
    assert_eq!(ctx.model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn it_should_return_502_naming_tts_when_speech_fails() {
    let ctx = TestContext::with_stubs(Stubs {
        speech: MetronomeSpeech::failing(),
        ..Stubs::default()
    })
    .await;

    let response = ctx
        .client
        .post("/generate", &json!({ "topics": ["markets"], "duration": 1 }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body = response.body.as_ref().unwrap();
    assert_eq!(field(body, "dependency").as_str(), Some("tts"));
    assert!(ctx.speech.calls.load(Ordering::SeqCst) >= 1);
    assert_eq!(ctx.stored_files(), 0);
}

#[tokio::test]
async fn it_should_serve_identical_requests_from_cache() {
    let ctx = TestContext::with_stubs(Stubs {
        cache_enabled: true,
        ..Stubs::default()
    })
    .await;
    let request = json!({ "topics": ["Energy", "AI"], "duration": 1 });
    let reordered = json!({ "topics": ["ai", "energy"], "duration": 1 });

    let first = ctx.client.post("/generate", &request).await.unwrap();
    first.assert_status(StatusCode::OK);
    let calls_after_first = ctx.model.calls.load(Ordering::SeqCst);

    let second = ctx.client.post("/generate", &reordered).await.unwrap();
    second.assert_status(StatusCode::OK);

    let first = first.body.as_ref().unwrap();
    let second = second.body.as_ref().unwrap();
    assert_eq!(field(first, "cached").as_bool(), Some(false));
    assert_eq!(field(second, "cached").as_bool(), Some(true));
    assert_eq!(field(first, "id"), field(second, "id"));
    assert_eq!(field(first, "audio")["filename"], field(second, "audio")["filename"]);
    assert_eq!(ctx.model.calls.load(Ordering::SeqCst), calls_after_first);
    assert_eq!(ctx.stored_files(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_warn_about_unknown_voices(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/generate",
            &json!({ "topics": ["science"], "duration": 1, "voice": "robot-9000" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let warnings = field(response.body.as_ref().unwrap(), "warnings").as_array().unwrap().clone();
    assert!(
        warnings.iter().any(|w| w.as_str().unwrap_or_default().contains("robot-9000")),
        "warnings: {:?}",
        warnings
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_invalid_requests(ctx: &TestContext) {
    let too_many_topics = vec!["ai"; 11];
    let long_topic = "x".repeat(201);
    let long_tone = "t".repeat(101);
    let cases = [
        (json!({}), "topics"),
        (json!({ "topics": [] }), "topics"),
        (json!({ "topics": too_many_topics }), "at most 10 topics"),
        (json!({ "topics": [long_topic] }), "exceeds 200 characters"),
        (json!({ "topics": ["ai"], "duration": 0.5 }), "duration"),
        (json!({ "topics": ["ai"], "duration": 31 }), "duration"),
        (json!({ "topics": ["ai"], "language": "Klingon" }), "unsupported language"),
        (json!({ "topics": ["ai"], "preset": "turbo" }), "unknown preset"),
        (json!({ "topics": ["ai"], "tone": long_tone }), "tone"),
    ];

    for (request, expected) in cases {
        let response = ctx.client.post("/generate", &request).await.unwrap();
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_error_message(expected);
    }

    // Validation happens before any upstream call
    assert_eq!(ctx.news.calls.load(Ordering::SeqCst), 0);
    assert_eq!(ctx.model.calls.load(Ordering::SeqCst), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_malformed_json(ctx: &TestContext) {
    let response = ctx.client.post_raw("/generate", "{\"topics\": [").await.unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = ctx.client.post_raw("/generate", "{\"topics\": \"ai\"}").await.unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
}
