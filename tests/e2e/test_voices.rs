use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_voices_with_timing_profiles(ctx: &TestContext) {
    let response = ctx.client.get("/voices").await.unwrap();

    response.assert_status(StatusCode::OK);

    let voices = response
        .body
        .as_ref()
        .and_then(|b| b.get("voices"))
        .and_then(|v| v.as_array())
        .expect("Missing voices array");
    assert!(!voices.is_empty());

    for voice in voices {
        assert!(voice.get("id").and_then(|v| v.as_str()).is_some());
        assert_eq!(voice.get("provider").and_then(|v| v.as_str()), Some("openai"));
        let wpm = voice
            .get("timing")
            .and_then(|t| t.get("wpm"))
            .and_then(|w| w.as_f64())
            .expect("Missing timing.wpm");
        assert!((110.0..=170.0).contains(&wpm), "implausible wpm {}", wpm);
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_the_default_voice(ctx: &TestContext) {
    let response = ctx.client.get("/voices").await.unwrap();

    let voices = response.body.as_ref().unwrap()["voices"].as_array().unwrap().clone();
    assert!(voices.iter().any(|v| v["id"] == "alloy"));
}
