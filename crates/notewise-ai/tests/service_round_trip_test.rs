//! End-to-end tests through the factory and the assistant session.

use std::sync::Arc;

use notewise_ai::{
    create_ai_service, create_ai_service_named, AssistantSession, LatencyProfile, ProviderKind,
    ScriptedRandom, ServiceConfig, SimulatedAiService,
};
use notewise_core::{defaults, AiService, Error, ErrorKind, Sentiment};

#[tokio::test(start_paused = true)]
async fn test_simulated_analysis_round_trip() {
    let service = create_ai_service(&ServiceConfig::new(ProviderKind::Simulated)).unwrap();

    let analysis = service.analyze_note("short note").await.unwrap();

    assert_eq!(analysis.key_points.len(), 3);
    assert!((2..=4).contains(&analysis.suggested_tags.len()));
    assert!(Sentiment::ALL.contains(&analysis.sentiment));
    assert_eq!(
        analysis.summary,
        "This note contains 1 key ideas about various topics."
    );
}

#[tokio::test(start_paused = true)]
async fn test_simulated_summary_round_trip() {
    let service = create_ai_service_named("mock", &ServiceConfig::default()).unwrap();

    let summary = service.summarize_text(&"x".repeat(150)).await.unwrap();

    assert!(summary.starts_with("This text discusses 2 main points"));
    assert!(service.service_status().available);
}

#[tokio::test]
async fn test_invalid_credential_never_yields_a_service() {
    for key in ["", "   ", "api-123"] {
        let config = ServiceConfig::new(ProviderKind::Primary).with_api_key(key);
        let err = create_ai_service(&config).err().expect("construction should fail");
        assert_eq!(err.as_ai().map(|e| e.kind), Some(ErrorKind::Validation));
        assert!(!err.is_retryable());
    }
}

#[tokio::test]
async fn test_unknown_provider_is_rejected() {
    let err = create_ai_service_named("llama", &ServiceConfig::default())
        .err()
        .expect("unknown provider");
    assert!(matches!(err, Error::UnsupportedProvider(_)));
}

#[tokio::test]
async fn test_session_recovers_after_simulated_failure() {
    // fail, then succeed with the greeting
    let service: Arc<dyn AiService> = Arc::new(
        SimulatedAiService::new()
            .with_latency(LatencyProfile::none())
            .with_random_source(ScriptedRandom::new(vec![0.0, 0.5, 0.0])),
    );
    let mut session = AssistantSession::new(Arc::clone(&service));
    session.activate();

    let first = session.ask("organize my notes", None).await.unwrap();
    assert_eq!(first, defaults::FALLBACK_ERROR_MESSAGE);
    assert!(service.service_status().last_error.is_some());

    session.activate();
    assert!(service.service_status().last_error.is_none());

    let second = session.ask("organize my notes", None).await.unwrap();
    assert_ne!(second, defaults::FALLBACK_ERROR_MESSAGE);
    assert!(session.state().error.is_none());
    assert_eq!(session.history().len(), 3);
}
