//! HTTP acoustic backend against a mocked model server

use std::collections::BTreeMap;
use std::io::Cursor;
use std::time::Duration;

use neurovox_core::model::HttpModelLoader;
use neurovox_core::{fallback_chain, Conditioning, ModelInfo, ModelLoader, NeurovoxError, SynthesisAdapter};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn wav_body(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

async fn ready_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

#[tokio::test(flavor = "multi_thread")]
async fn test_synthesize_sends_speaker_and_decodes_wav() {
    let server = ready_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tts"))
        .and(query_param("text", "Hello there"))
        .and(query_param("speaker_id", "p243"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/wav")
                .set_body_bytes(wav_body(&[0, 8_192, -16_384], 24_000)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let endpoints = BTreeMap::from([("vctk_p239".to_string(), server.uri())]);
    let audio = tokio::task::spawn_blocking(move || {
        let loader = HttpModelLoader::new(endpoints).with_timeout(Duration::from_secs(5));
        let model = loader.load(ModelInfo::find("vctk_p239").unwrap())?;
        model.synthesize("Hello there", &Conditioning::speaker("p243"))
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(audio.sample_rate, Some(24_000));
    assert_eq!(audio.samples, vec![0.0, 0.25, -0.5]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_becomes_synthesis_error() {
    let server = ready_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tts"))
        .respond_with(ResponseTemplate::new(500).set_body_string("CUDA out of memory"))
        .mount(&server)
        .await;

    let endpoints = BTreeMap::from([("jenny".to_string(), server.uri())]);
    let err = tokio::task::spawn_blocking(move || {
        let model = HttpModelLoader::new(endpoints).load(ModelInfo::find("jenny").unwrap())?;
        model.synthesize("Hello", &Conditioning::none())
    })
    .await
    .unwrap()
    .unwrap_err();

    assert_eq!(err.category(), "synthesis");
    assert!(err.to_string().contains("CUDA out of memory"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_servers_fall_through_chain() {
    let healthy = ready_server().await;
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&broken)
        .await;

    // xtts_v2 has no endpoint at all, vctk_p239 answers 503, jenny is up.
    let endpoints = BTreeMap::from([
        ("vctk_p239".to_string(), broken.uri()),
        ("jenny".to_string(), healthy.uri()),
    ]);
    // The blocking client must be dropped off the async runtime.
    let (model_id, attempts) = tokio::task::spawn_blocking(move || {
        SynthesisAdapter::initialize(&fallback_chain(), &HttpModelLoader::new(endpoints))
            .map(|adapter| (adapter.model_id(), adapter.failed_attempts().to_vec()))
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(model_id, "jenny");
    assert_eq!(attempts.len(), 2);
    assert!(attempts[1].reason.contains("503"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_no_reachable_server_exhausts_chain() {
    let err = tokio::task::spawn_blocking(|| {
        SynthesisAdapter::initialize(&fallback_chain(), &HttpModelLoader::new(BTreeMap::new()))
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, NeurovoxError::ModelsExhausted { ref attempts } if attempts.len() == 3));
}
