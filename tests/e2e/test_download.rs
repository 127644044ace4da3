use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_download_a_generated_bulletin(ctx: &TestContext) {
    let generated = ctx
        .client
        .post("/generate", &json!({ "topics": ["space"], "duration": 1 }))
        .await
        .unwrap();
    generated.assert_status(StatusCode::OK);
    let audio = generated.body.as_ref().unwrap()["audio"].clone();
    let url = audio["download_url"].as_str().unwrap();

    let response = ctx.client.get(url).await.unwrap();

    response.assert_status(StatusCode::OK);
    response.assert_header("content-type", "audio/wav");
    assert_eq!(&response.body_bytes[..4], b"RIFF");
    assert_eq!(&response.body_bytes[8..12], b"WAVE");

    // Header sample rate and data length agree with the reported duration
    let reader = hound::WavReader::new(std::io::Cursor::new(response.body_bytes.clone())).unwrap();
    let spec = reader.spec();
    let seconds = reader.duration() as f64 / spec.sample_rate as f64;
    let reported = audio["duration_seconds"].as_f64().unwrap();
    assert!((seconds - reported).abs() < 0.01, "{} vs {}", seconds, reported);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_unknown_files(ctx: &TestContext) {
    let response = ctx.client.get("/download/bulletin_missing.wav").await.unwrap();

    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unsafe_names_before_touching_disk(ctx: &TestContext) {
    let unsafe_names = [
        "..%2F..%2Fetc%2Fpasswd",
        "..%2Fsecret.wav",
        "bulletin.wav%3Brm%20-rf%20%2F",
        "%24%28id%29.wav",
        "bulletin%60whoami%60.wav",
        "bulletin.mp3",
        ".hidden.wav",
    ];

    for name in unsafe_names {
        let response = ctx.client.get(&format!("/download/{}", name)).await.unwrap();
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
