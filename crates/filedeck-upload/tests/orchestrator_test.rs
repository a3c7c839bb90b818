use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use filedeck_core::models::{RawFile, TransferRecord, TransferStatus};
use filedeck_core::{
    ProgressSink, StaticToken, TransportError, TransportResponse, UploadTransport,
};
use filedeck_upload::{OrchestratorConfig, UploadError, UploadOrchestrator};
use tokio::sync::{watch, Semaphore};

#[derive(Clone)]
enum Reply {
    Status(u16, &'static str),
    NetworkError,
}

#[derive(Clone)]
struct Script {
    progress: Vec<(u64, u64)>,
    gate: Option<Arc<Semaphore>>,
    hold: Option<Duration>,
    reply: Reply,
}

impl Script {
    fn ok() -> Self {
        Self {
            progress: vec![(50, 100), (100, 100)],
            gate: None,
            hold: None,
            reply: Reply::Status(200, "{}"),
        }
    }

    fn reply(reply: Reply) -> Self {
        Self {
            progress: Vec::new(),
            reply,
            ..Self::ok()
        }
    }
}

/// Transport driven by a per-filename script.
#[derive(Default)]
struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    tokens: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn with(scripts: Vec<(&str, Script)>) -> Arc<Self> {
        Arc::new(Self {
            scripts: scripts
                .into_iter()
                .map(|(name, script)| (name.to_string(), script))
                .collect(),
            ..Self::default()
        })
    }
}

#[async_trait]
impl UploadTransport for ScriptedTransport {
    async fn upload(
        &self,
        file: RawFile,
        token: &str,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(token.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let script = self.scripts.get(&file.name).cloned().unwrap_or_else(Script::ok);
        for (sent, total) in &script.progress {
            progress.report(*sent, *total);
        }
        if let Some(gate) = &script.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if let Some(hold) = script.hold {
            tokio::time::sleep(hold).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match script.reply {
            Reply::Status(status, body) => Ok(TransportResponse::new(status, body)),
            Reply::NetworkError => Err(TransportError("connection reset".to_string())),
        }
    }
}

fn file(name: &str) -> RawFile {
    RawFile::from_bytes(name, vec![0u8; 100])
}

fn orchestrator(transport: Arc<ScriptedTransport>) -> UploadOrchestrator {
    UploadOrchestrator::new(
        transport,
        Arc::new(StaticToken::new("tok")),
        OrchestratorConfig::default(),
        None,
    )
}

fn by_name<'a>(records: &'a [TransferRecord], name: &str) -> &'a TransferRecord {
    records
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("no record named {name}"))
}

async fn wait_until(
    view: &mut watch::Receiver<Vec<TransferRecord>>,
    condition: impl FnMut(&Vec<TransferRecord>) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(5), view.wait_for(condition))
        .await
        .expect("queue never reached the expected state")
        .expect("queue consumer stopped");
}

#[tokio::test]
async fn test_missing_credential_short_circuits() {
    let transport = ScriptedTransport::with(vec![]);
    let orch = UploadOrchestrator::new(
        transport.clone(),
        Arc::new(StaticToken::none()),
        OrchestratorConfig::default(),
        None,
    );

    let result = orch.submit(vec![file("a.txt"), file("b.txt")]).await;

    assert!(matches!(result, Err(UploadError::MissingCredential)));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    assert!(orch.snapshot().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_token_is_read_at_submission_time() {
    let transport = ScriptedTransport::with(vec![]);
    let current: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let source = current.clone();
    let orch = UploadOrchestrator::new(
        transport.clone(),
        Arc::new(move || source.lock().unwrap().clone()),
        OrchestratorConfig::default(),
        None,
    );

    assert!(orch.submit(vec![file("a.txt")]).await.is_err());

    *current.lock().unwrap() = Some("fresh".to_string());
    let report = orch.submit(vec![file("a.txt")]).await.unwrap();

    assert!(report.all_succeeded());
    assert_eq!(*transport.tokens.lock().unwrap(), vec!["fresh".to_string()]);
}

#[tokio::test]
async fn test_empty_batch_is_a_no_op() {
    let transport = ScriptedTransport::with(vec![]);
    let orch = orchestrator(transport.clone());

    let report = orch.submit(Vec::new()).await.unwrap();

    assert_eq!(report.total(), 0);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_batch_dispatches_all_files_with_independent_progress() {
    let gate = Arc::new(Semaphore::new(0));
    let gated = |sent: u64| Script {
        progress: vec![(sent, 100)],
        gate: Some(gate.clone()),
        ..Script::ok()
    };
    let transport = ScriptedTransport::with(vec![
        ("one.txt", gated(30)),
        ("two.txt", gated(60)),
        ("three.txt", gated(90)),
    ]);
    let orch = orchestrator(transport.clone());
    let mut view = orch.subscribe();

    let submitter = orch.clone();
    let batch = tokio::spawn(async move {
        submitter
            .submit(vec![file("one.txt"), file("two.txt"), file("three.txt")])
            .await
    });

    wait_until(&mut view, |records| {
        records.len() == 3 && records.iter().all(|r| r.status == TransferStatus::Uploading)
    })
    .await;

    let records = orch.snapshot().await.unwrap();
    assert_eq!(by_name(&records, "one.txt").progress, 30);
    assert_eq!(by_name(&records, "two.txt").progress, 60);
    assert_eq!(by_name(&records, "three.txt").progress, 90);
    assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 3);

    gate.add_permits(3);
    let report = batch.await.unwrap().unwrap();

    assert_eq!(report.succeeded.len(), 3);
    let names: Vec<String> = records.iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, vec!["one.txt", "two.txt", "three.txt"]);
}

#[tokio::test]
async fn test_failure_leaves_sibling_transfer_untouched() {
    let gate = Arc::new(Semaphore::new(0));
    let transport = ScriptedTransport::with(vec![
        (
            "a.bin",
            Script {
                progress: vec![(50, 100)],
                gate: Some(gate.clone()),
                ..Script::ok()
            },
        ),
        ("b.bin", Script::reply(Reply::Status(500, "disk full"))),
    ]);
    let orch = orchestrator(transport);
    let mut view = orch.subscribe();

    let submitter = orch.clone();
    let batch =
        tokio::spawn(async move { submitter.submit(vec![file("a.bin"), file("b.bin")]).await });

    wait_until(&mut view, |records| {
        records.len() == 2
            && records.iter().any(|r| r.name == "b.bin" && r.status == TransferStatus::Error)
            && records.iter().any(|r| r.name == "a.bin" && r.progress == 50)
    })
    .await;

    let records = orch.snapshot().await.unwrap();
    let a = by_name(&records, "a.bin");
    assert_eq!(a.status, TransferStatus::Uploading);
    assert_eq!(a.progress, 50);
    let b = by_name(&records, "b.bin");
    assert_eq!(b.error.as_deref(), Some("disk full"));

    gate.add_permits(1);
    let report = batch.await.unwrap().unwrap();
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].1, "disk full");

    let records = orch.snapshot().await.unwrap();
    let a = by_name(&records, "a.bin");
    assert_eq!(a.status, TransferStatus::Done);
    assert_eq!(a.progress, 100);
    let b = by_name(&records, "b.bin");
    assert_eq!(b.status, TransferStatus::Error);
    assert_eq!(b.error.as_deref(), Some("disk full"));
}

#[tokio::test]
async fn test_failure_messages() {
    let transport = ScriptedTransport::with(vec![
        ("empty.txt", Script::reply(Reply::Status(502, ""))),
        ("offline.txt", Script::reply(Reply::NetworkError)),
    ]);
    let orch = orchestrator(transport);

    let report = orch
        .submit(vec![file("empty.txt"), file("offline.txt")])
        .await
        .unwrap();

    let messages: Vec<&str> = report.failed.iter().map(|(_, m)| m.as_str()).collect();
    assert_eq!(messages, vec!["status 502", "network error"]);

    let records = orch.snapshot().await.unwrap();
    assert_eq!(by_name(&records, "empty.txt").error.as_deref(), Some("status 502"));
    assert_eq!(by_name(&records, "offline.txt").error.as_deref(), Some("network error"));
}

#[tokio::test]
async fn test_duplicate_names_get_distinct_records() {
    let transport = ScriptedTransport::with(vec![]);
    let orch = orchestrator(transport);

    let report = orch.submit(vec![file("same.txt"), file("same.txt")]).await.unwrap();

    assert_eq!(report.succeeded.len(), 2);
    assert_ne!(report.succeeded[0], report.succeeded[1]);
}

#[tokio::test(start_paused = true)]
async fn test_completed_transfer_is_removed_after_delay() {
    let transport = ScriptedTransport::with(vec![]);
    let orch = orchestrator(transport);

    let report = orch.submit(vec![file("a.txt")]).await.unwrap();
    let id = report.succeeded[0].clone();

    let records = orch.snapshot().await.unwrap();
    assert_eq!(records[0].status, TransferStatus::Done);
    assert_eq!(records[0].progress, 100);
    assert_eq!(orch.pending_removals().await.unwrap(), 1);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(orch.snapshot().await.unwrap().len(), 1);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(orch.snapshot().await.unwrap().is_empty());
    assert_eq!(orch.pending_removals().await.unwrap(), 0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(orch.snapshot().await.unwrap().iter().all(|r| r.id != id));
}

#[tokio::test(start_paused = true)]
async fn test_failed_transfer_stays_until_cleared() {
    let transport = ScriptedTransport::with(vec![(
        "bad.txt",
        Script::reply(Reply::Status(400, "bad request")),
    )]);
    let orch = orchestrator(transport);

    orch.submit(vec![file("bad.txt")]).await.unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;

    let records = orch.snapshot().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, TransferStatus::Error);

    assert_eq!(orch.clear_failed().await.unwrap(), 1);
    assert!(orch.snapshot().await.unwrap().is_empty());
    assert_eq!(orch.clear_failed().await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_clear_cancels_pending_removal() {
    let transport = ScriptedTransport::with(vec![(
        "bad.txt",
        Script::reply(Reply::Status(500, "")),
    )]);
    let orch = orchestrator(transport);
    let mut view = orch.subscribe();

    let report = orch
        .submit(vec![file("good.txt"), file("bad.txt")])
        .await
        .unwrap();
    let good = report.succeeded[0].clone();
    let bad = report.failed[0].0.clone();
    assert_eq!(orch.pending_removals().await.unwrap(), 1);

    assert!(orch.clear(&good).await.unwrap());
    assert_eq!(orch.pending_removals().await.unwrap(), 0);
    assert!(!orch.clear(&good).await.unwrap());
    view.mark_unchanged();

    tokio::time::sleep(Duration::from_secs(5)).await;

    let records = orch.snapshot().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, bad);
    assert!(!view.has_changed().unwrap());
}

#[tokio::test]
async fn test_files_changed_callback_once_per_success() {
    let transport = ScriptedTransport::with(vec![(
        "bad.txt",
        Script::reply(Reply::Status(500, "nope")),
    )]);
    let refreshes = Arc::new(AtomicUsize::new(0));
    let counter = refreshes.clone();
    let orch = UploadOrchestrator::new(
        transport,
        Arc::new(StaticToken::new("tok")),
        OrchestratorConfig::default(),
        Some(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })),
    );

    orch.submit(vec![file("a.txt"), file("bad.txt"), file("c.txt")])
        .await
        .unwrap();

    assert_eq!(refreshes.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_cap_limits_in_flight_transfers() {
    let slow = Script {
        hold: Some(Duration::from_millis(50)),
        ..Script::ok()
    };
    let transport = ScriptedTransport::with(vec![
        ("a.txt", slow.clone()),
        ("b.txt", slow.clone()),
        ("c.txt", slow),
    ]);
    let orch = UploadOrchestrator::new(
        transport.clone(),
        Arc::new(StaticToken::new("tok")),
        OrchestratorConfig {
            max_concurrent: Some(1),
            ..OrchestratorConfig::default()
        },
        None,
    );

    let report = orch
        .submit(vec![file("a.txt"), file("b.txt"), file("c.txt")])
        .await
        .unwrap();

    assert_eq!(report.succeeded.len(), 3);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_shutdown_stops_the_queue() {
    let orch = orchestrator(ScriptedTransport::with(vec![]));
    orch.shutdown();

    let result = orch.snapshot().await;
    assert!(matches!(result, Err(UploadError::QueueStopped)));
}
