//! End-to-end coverage of the concrete scenarios and quantified invariants,
//! driven directly through `Engine` against a real (in-memory) store. No
//! external process is invoked: these scenarios only exercise admission,
//! persistence, and lookup, which is where the invariants actually live.

use std::sync::Arc;

use summary_coordinator::{Engine, StartOutcome};
use summary_models::{EngineConfig, SummaryStatus};
use summary_store::{CompletionUpdate, SummaryStore};

async fn engine() -> Engine {
    let store = Arc::new(SummaryStore::connect("sqlite::memory:").await.unwrap());
    Engine::new(EngineConfig::default(), store).await
}

fn completion(summary: &str) -> CompletionUpdate {
    CompletionUpdate {
        summary: summary.to_string(),
        transcript: "hello world. welcome.".to_string(),
        model_used: "whisper-base+llama3:13b".to_string(),
        audio_duration_seconds: Some(150.45),
        processing_time_seconds: 2.0,
    }
}

/// Scenario 2: duplicate rejection. Once a Summary is completed, a second
/// Start without `force` is rejected and creates neither a task nor a
/// version.
#[tokio::test]
async fn duplicate_start_after_completion_is_rejected() {
    let store = Arc::new(SummaryStore::connect("sqlite::memory:").await.unwrap());
    let engine = Engine::new(EngineConfig::default(), Arc::clone(&store)).await;

    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let summary_id = match engine.start(&path, false, None).await.unwrap() {
        StartOutcome::Enqueued { summary_id, .. } => summary_id,
        StartOutcome::Rejected { .. } => panic!("expected enqueue"),
    };

    // Drive persistence directly, standing in for a finished pipeline run.
    store.persist_completion(summary_id, completion("• done")).await.unwrap();

    match engine.start(&path, false, None).await.unwrap() {
        StartOutcome::Rejected { reason, existing } => {
            assert_eq!(reason, "already exists");
            assert_eq!(existing.status, SummaryStatus::Completed);
        }
        StartOutcome::Enqueued { .. } => panic!("completed summary should block a second Start"),
    }
}

/// Scenario 6 / admission uniqueness: two concurrent Start calls for the
/// same fresh path yield exactly one enqueue and one rejection.
#[tokio::test]
async fn concurrent_start_admits_exactly_once() {
    let engine = Arc::new(engine().await);
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let e1 = Arc::clone(&engine);
    let p1 = path.clone();
    let e2 = Arc::clone(&engine);
    let p2 = path.clone();

    let (r1, r2) = tokio::join!(
        tokio::spawn(async move { e1.start(&p1, false, None).await }),
        tokio::spawn(async move { e2.start(&p2, false, None).await }),
    );

    let outcomes = [r1.unwrap().unwrap(), r2.unwrap().unwrap()];
    let enqueued = outcomes
        .iter()
        .filter(|o| matches!(o, StartOutcome::Enqueued { .. }))
        .count();
    let rejected = outcomes
        .iter()
        .filter(|o| matches!(o, StartOutcome::Rejected { reason, .. } if *reason == "already in progress"))
        .count();

    assert_eq!(enqueued, 1);
    assert_eq!(rejected, 1);
}

/// Scenario 4: no-audio outcome leaves the Summary in `no_audio` with no
/// version row, distinct from a plain `failed`.
#[tokio::test]
async fn no_audio_leaves_summary_terminal_without_a_version() {
    let store = Arc::new(SummaryStore::connect("sqlite::memory:").await.unwrap());
    let engine = Engine::new(EngineConfig::default(), Arc::clone(&store)).await;

    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().to_str().unwrap().to_string();
    let summary_id = match engine.start(&path, false, None).await.unwrap() {
        StartOutcome::Enqueued { summary_id, .. } => summary_id,
        StartOutcome::Rejected { .. } => panic!("expected enqueue"),
    };

    store
        .mark_no_audio(summary_id, "video has no audio track")
        .await
        .unwrap();

    let latest = engine.get_latest(&path).await.unwrap().unwrap();
    assert_eq!(latest.summary.status, SummaryStatus::NoAudio);
    assert!(latest.versions.is_empty());
}

/// Scenario 5: an LLM/transient failure leaves the Summary `failed` and
/// retryable; a forced re-run is then admitted and, on completion, the
/// version count is exactly 1 (the earlier failure appended nothing).
#[tokio::test]
async fn transient_failure_is_retryable_and_appends_no_version() {
    let store = Arc::new(SummaryStore::connect("sqlite::memory:").await.unwrap());
    let engine = Engine::new(EngineConfig::default(), Arc::clone(&store)).await;

    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().to_str().unwrap().to_string();
    let summary_id = match engine.start(&path, false, None).await.unwrap() {
        StartOutcome::Enqueued { summary_id, .. } => summary_id,
        StartOutcome::Rejected { .. } => panic!("expected enqueue"),
    };

    store
        .mark_failed(summary_id, "connection error contacting the LLM server")
        .await
        .unwrap();

    let latest = engine.get_latest(&path).await.unwrap().unwrap();
    assert_eq!(latest.summary.status, SummaryStatus::Failed);
    assert!(latest.summary.error_message.unwrap().contains("connection"));
    assert!(latest.versions.is_empty());

    let summary_id2 = match engine.start(&path, true, None).await.unwrap() {
        StartOutcome::Enqueued { summary_id, .. } => summary_id,
        StartOutcome::Rejected { .. } => panic!("force should re-admit after failure"),
    };

    let version = store.persist_completion(summary_id2, completion("• recovered")).await.unwrap();
    assert_eq!(version, 1);
}

/// Testable property: latest consistency. Once a Summary is completed, its
/// fields match the highest SummaryVersion's fields exactly.
#[tokio::test]
async fn latest_summary_matches_the_newest_version() {
    let store = Arc::new(SummaryStore::connect("sqlite::memory:").await.unwrap());
    let engine = Engine::new(EngineConfig::default(), Arc::clone(&store)).await;

    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().to_str().unwrap().to_string();
    let summary_id = match engine.start(&path, false, None).await.unwrap() {
        StartOutcome::Enqueued { summary_id, .. } => summary_id,
        StartOutcome::Rejected { .. } => panic!("expected enqueue"),
    };
    store.persist_completion(summary_id, completion("• first")).await.unwrap();

    let summary_id2 = match engine.start(&path, true, None).await.unwrap() {
        StartOutcome::Enqueued { summary_id, .. } => summary_id,
        StartOutcome::Rejected { .. } => panic!("force should re-admit"),
    };
    store.persist_completion(summary_id2, completion("• second")).await.unwrap();

    let latest = engine.get_latest(&path).await.unwrap().unwrap();
    assert_eq!(latest.summary.status, SummaryStatus::Completed);
    assert_eq!(latest.summary.summary.as_deref(), Some("• second"));
    assert_eq!(
        latest.versions.iter().map(|v| v.version).collect::<Vec<_>>(),
        vec![1, 2]
    );

    let newest = engine.get_version(&path, 2).await.unwrap().unwrap();
    assert_eq!(newest.summary, latest.summary.summary);
    assert_eq!(newest.model_used, latest.summary.model_used);
}

/// Testable property: tolerant lookup. A query path ending in the same
/// basename as a stored (but differently-mounted) path resolves to the
/// same Summary.
#[tokio::test]
async fn tolerant_lookup_survives_mount_root_relocation() {
    let engine = engine().await;
    let original = "/old-mount/library/videos/clip.mp4";
    engine.start(original, false, None).await.unwrap();

    let relocated = engine
        .get_latest("/new-mount/library/videos/clip.mp4")
        .await
        .unwrap();
    assert!(relocated.is_some());
}
