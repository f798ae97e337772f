//! Router tests against an in-process acoustic model

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use neurovox_core::{
    AcousticModel, AudioPostProcessor, Conditioning, ModelInfo, NeurovoxError, NeurovoxResult,
    RawAudio, SynthesisAdapter, TtsService, WavEncoder,
};
use neurovox_server::{create_router, AppState, ServerConfig};
use rstest::rstest;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

#[derive(Debug)]
struct SineModel {
    info: &'static ModelInfo,
}

impl AcousticModel for SineModel {
    fn info(&self) -> &'static ModelInfo {
        self.info
    }

    fn synthesize(&self, text: &str, _conditioning: &Conditioning) -> NeurovoxResult<RawAudio> {
        if text.contains("explode") {
            return Err(NeurovoxError::model("inference crashed"));
        }
        Ok(RawAudio {
            samples: (0..4_800).map(|i| (i as f32 * 0.07).sin() * 0.6).collect(),
            sample_rate: Some(24_000),
        })
    }
}

fn app(model_id: &str) -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let adapter = SynthesisAdapter::with_model(Box::new(SineModel {
        info: ModelInfo::find(model_id).unwrap(),
    }));
    let service = TtsService::new(adapter, AudioPostProcessor::new(), WavEncoder::new(dir.path()));
    (create_router(AppState::new(service, ServerConfig::default())), dir)
}

fn tts_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/tts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get_json(app: Router, uri: &str) -> Value {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

#[tokio::test]
async fn test_tts_returns_wav_with_metadata_headers() {
    let (app, _dir) = app("xtts_v2");
    let response = app
        .oneshot(tts_request(r#"{"text":"Hello","voice":"","speed":1.0}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "audio/wav");
    assert_eq!(headers["x-voice-used"], "female_1");
    assert_eq!(headers["x-speed-multiplier"], "1.0");
    assert_eq!(headers["x-sample-rate"], "22050");
    assert_eq!(headers["x-model"], "xtts_v2");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename="));
    assert!(disposition.ends_with(".wav"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(!body.is_empty());
    assert_eq!(&body[..4], b"RIFF");
}

#[tokio::test]
async fn test_speed_is_clamped_and_voice_resolved() {
    let (app, _dir) = app("vctk_p239");
    let response = app
        .oneshot(tts_request(r#"{"text":"Faster please","voice":"p243","speed":5.0}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-speed-multiplier"], "2.0");
    assert_eq!(response.headers()["x-voice-used"], "p243");
}

#[rstest]
#[case(r#"{"voice":"female_1"}"#)]
#[case(r#"{"text":""}"#)]
#[case(r#"{"text":"   "}"#)]
#[case(r#"{"text":"🚀🚀"}"#)]
#[case(r#"{"text": "#)]
#[case(r#"{"text":"Hi","speed":"fast"}"#)]
#[tokio::test]
async fn test_bad_requests_are_400(#[case] body: &str) {
    let (app, _dir) = app("jenny");
    let response = app.oneshot(tts_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn test_model_failure_is_500_with_error_body() {
    let (app, _dir) = app("jenny");
    let response = app
        .oneshot(tts_request(r#"{"text":"please explode"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("inference crashed"));
}

#[tokio::test]
async fn test_health_reports_loaded_model() {
    let (app, _dir) = app("xtts_v2");
    let json = get_json(app, "/health").await;

    assert_eq!(json["status"], "healthy");
    assert_eq!(json["mode"], "neural_tts");
    assert_eq!(json["model"], "xtts_v2");
    assert_eq!(json["device"], "cpu");
    assert_eq!(json["default_voice"], "female_1");
    assert_eq!(json["total_voices"], 4);
    assert_eq!(json["available_voices"][3], "male_2");
    assert_eq!(json["features"].as_array().unwrap().len(), 5);
    assert!(json["started_at"].is_string());
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_voices_groups_by_gender() {
    let (app, _dir) = app("vctk_p239");
    let json = get_json(app, "/voices").await;

    assert_eq!(json["default"], "p239");
    assert_eq!(json["available_voices"][1]["name"], "p243");
    assert_eq!(json["available_voices"][1]["quality"], "premium");
    assert_eq!(json["model_info"]["name"], "vctk_p239");
    assert_eq!(json["model_info"]["quality"], "premium");
    assert_eq!(json["recommended"]["female"], serde_json::json!(["p239", "p225"]));
    assert_eq!(json["recommended"]["male"], serde_json::json!(["p243", "p226"]));
}

#[tokio::test]
async fn test_demo_suggests_first_three_voices() {
    let (app, _dir) = app("xtts_v2");
    let json = get_json(app, "/demo").await;

    assert_eq!(
        json["suggested_voices"],
        serde_json::json!(["female_1", "male_1", "female_2"])
    );
    assert_eq!(json["model"], "xtts_v2");
    assert!(json["usage"].as_str().unwrap().contains("/api/tts"));
    assert!(json["demo_text"].as_str().unwrap().starts_with("Hello!"));
}

#[tokio::test]
async fn test_models_marks_loaded_entry() {
    let (app, _dir) = app("jenny");
    let json = get_json(app, "/models").await;

    let models = json["models"].as_array().unwrap();
    assert_eq!(models.len(), 5);
    let loaded: Vec<&str> = models
        .iter()
        .filter(|m| m["loaded"] == true)
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(loaded, ["jenny"]);
    assert_eq!(json["fallback_chain"], serde_json::json!(["xtts_v2", "vctk_p239", "jenny"]));
    assert_eq!(models[4]["kind"], "multilingual");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _dir) = app("jenny");
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
