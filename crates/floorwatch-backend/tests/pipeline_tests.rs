use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use floorwatch_backend::{
    NotificationPipeline,
    pipeline::connection::{ConnectionEvent, ConnectionPhase, ReconnectPolicy},
    transport::{FrameStream, SseFrame, Transport, TransportError},
};
use floorwatch_bridge::notification::{NotificationRecord, NotificationType};
use floorwatch_presenter::{Platform, PresentError, PresentationDispatcher, Presenter};
use futures_util::{StreamExt, stream};
use tokio::time::Instant;

const URL: &str = "http://plant.local/api/events";

enum Script {
    Fail,
    /// Serves the frames, then stays open.
    Open(Vec<SseFrame>),
    /// Serves the frames, then the server closes the stream.
    OpenThenClose(Vec<SseFrame>),
}

/// Answers each `open` with the next script entry; fails once they run out.
struct ScriptedTransport {
    scripts: Mutex<VecDeque<Script>>,
    opens: AtomicUsize,
}

impl ScriptedTransport {
    fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            opens: AtomicUsize::new(0),
        })
    }

    fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open(&self, url: &str) -> Result<FrameStream, TransportError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().unwrap().pop_front().unwrap_or(Script::Fail);
        match script {
            Script::Fail => Err(TransportError::Unavailable(format!("{url} refused"))),
            Script::Open(frames) => Ok(Box::pin(
                stream::iter(frames.into_iter().map(Ok)).chain(stream::pending()),
            )),
            Script::OpenThenClose(frames) => Ok(Box::pin(stream::iter(frames.into_iter().map(Ok)))),
        }
    }
}

#[derive(Default)]
struct RecordingPresenter {
    presented: Mutex<Vec<String>>,
}

impl RecordingPresenter {
    fn presented(&self) -> Vec<String> {
        self.presented.lock().unwrap().clone()
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    fn platform(&self) -> Platform {
        Platform::Web
    }

    fn wire_callbacks(&self) -> Result<(), PresentError> {
        Ok(())
    }

    async fn initialize(&self) -> Result<(), PresentError> {
        Ok(())
    }

    async fn present(&self, record: &NotificationRecord) -> Result<(), PresentError> {
        self.presented.lock().unwrap().push(record.id.clone());
        Ok(())
    }

    async fn request_permission(&self) -> bool {
        true
    }
}

fn pipeline(
    transport: Arc<ScriptedTransport>,
) -> (NotificationPipeline<Arc<ScriptedTransport>>, Arc<RecordingPresenter>) {
    let presenter = Arc::new(RecordingPresenter::default());
    let pipeline = NotificationPipeline::new(
        transport,
        ReconnectPolicy::default(),
        PresentationDispatcher::new(presenter.clone()),
    );
    (pipeline, presenter)
}

async fn pump(pipeline: &mut NotificationPipeline<Arc<ScriptedTransport>>) -> Option<String> {
    let event = pipeline.next_event().await;
    pipeline.handle_event(event).await
}

/// Starts connecting to `url` and waits until the open has settled.
async fn connect(pipeline: &mut NotificationPipeline<Arc<ScriptedTransport>>, url: &str) {
    pipeline.connect(url);
    assert!(!pipeline.is_connected());
    match pipeline.next_event().await {
        event @ (ConnectionEvent::Opened | ConnectionEvent::OpenFailed(_)) => {
            pipeline.handle_event(event).await;
        }
        other => panic!("expected the open to settle, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn alert_event_becomes_unread_warning_at_the_head() {
    let transport = ScriptedTransport::new(vec![Script::Open(vec![
        SseFrame::new(Some("notification"), r#"{"title":"Shift start","message":"Line A running"}"#),
        SseFrame::new(Some("alert"), r#"{"title":"Low stock","message":"Bin 4 empty"}"#),
    ])]);
    let (mut pipeline, presenter) = pipeline(transport);

    connect(&mut pipeline, URL).await;
    let first = pump(&mut pipeline).await.expect("first frame is a notification");
    let second = pump(&mut pipeline).await.expect("second frame is a notification");

    let records = pipeline.notifications();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, second);
    assert_eq!(records[0].title, "Low stock");
    assert_eq!(records[0].notification_type, NotificationType::Warning);
    assert!(!records[0].read);
    assert_eq!(records[1].notification_type, NotificationType::Info);
    assert_eq!(pipeline.unread_count(), 2);
    assert_eq!(presenter.presented(), vec![first, second]);
}

#[tokio::test(start_paused = true)]
async fn success_channel_overrides_payload_type() {
    let transport = ScriptedTransport::new(vec![Script::Open(vec![SseFrame::new(
        Some("success"),
        r#"{"title":"Batch done","message":"Batch 17 passed QA","type":"error"}"#,
    )])]);
    let (mut pipeline, _presenter) = pipeline(transport);

    connect(&mut pipeline, URL).await;
    let id = pump(&mut pipeline).await.unwrap();

    let record = pipeline.notification_by_id(&id).unwrap();
    assert_eq!(record.notification_type, NotificationType::Success);
}

#[tokio::test(start_paused = true)]
async fn control_frames_never_reach_the_store() {
    let mut frames: Vec<SseFrame> = [
        "heartbeat",
        "ping",
        r#"{"type":"heartbeat"}"#,
        r#"{"type":"ping"}"#,
        r#"{"message":"heartbeat"}"#,
        r#"{"message":"ping"}"#,
    ]
    .into_iter()
    .map(|data| SseFrame::new(None, data))
    .collect();
    frames.push(SseFrame::new(Some("heartbeat"), r#"{"title":"t","message":"m"}"#));
    frames.push(SseFrame::new(Some("ping"), "{}"));
    frames.push(SseFrame::new(Some("metrics"), r#"{"title":"t","message":"m"}"#));
    let control_count = frames.len();
    frames.push(SseFrame::new(None, r#"{"title":"Real","message":"Event"}"#));

    let (mut pipeline, presenter) = pipeline(ScriptedTransport::new(vec![Script::Open(frames)]));
    connect(&mut pipeline, URL).await;

    for _ in 0..control_count {
        assert_eq!(pump(&mut pipeline).await, None);
    }
    assert!(pipeline.notifications().is_empty());

    assert!(pump(&mut pipeline).await.is_some());
    assert_eq!(pipeline.notifications().len(), 1);
    assert_eq!(presenter.presented().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn malformed_frames_are_dropped_and_the_stream_continues() {
    let transport = ScriptedTransport::new(vec![Script::Open(vec![
        SseFrame::new(None, "{not json"),
        SseFrame::new(None, r#"{"title":"Only a title"}"#),
        SseFrame::new(None, r#"{"title":"","message":"No title"}"#),
        SseFrame::new(None, r#"{"title":"Valid","message":"Still flowing"}"#),
    ])]);
    let (mut pipeline, _presenter) = pipeline(transport);

    connect(&mut pipeline, URL).await;
    assert_eq!(pump(&mut pipeline).await, None);
    assert_eq!(pump(&mut pipeline).await, None);
    assert_eq!(pump(&mut pipeline).await, None);
    assert!(pump(&mut pipeline).await.is_some());

    assert!(pipeline.is_connected());
    assert_eq!(pipeline.notifications()[0].title, "Valid");
}

#[tokio::test(start_paused = true)]
async fn five_failures_back_off_exponentially_then_give_up() {
    let transport = ScriptedTransport::new(vec![]);
    let (mut pipeline, _presenter) = pipeline(transport.clone());
    let start = Instant::now();

    connect(&mut pipeline, URL).await;
    let mut delays = Vec::new();
    while let Some(delay) = pipeline.connection().scheduled_reconnect() {
        delays.push(delay);
        let event = pipeline.next_event().await;
        assert!(matches!(event, ConnectionEvent::ReconnectDue));
        pipeline.handle_event(event).await;
        assert_eq!(pipeline.connection().phase(), ConnectionPhase::Connecting);
        assert!(matches!(pipeline.next_event().await, ConnectionEvent::OpenFailed(_)));
    }

    assert_eq!(delays, [1, 2, 4, 8, 16].map(Duration::from_secs).to_vec());
    assert!(start.elapsed() >= Duration::from_secs(31));
    assert!(start.elapsed() < Duration::from_secs(32));
    assert_eq!(transport.opens(), 6);
    assert!(!pipeline.is_connected());
    assert_eq!(pipeline.connection_state().reconnect_attempts, 5);

    // nothing else is scheduled
    let idle = tokio::time::timeout(Duration::from_secs(300), pipeline.next_event()).await;
    assert!(idle.is_err());
    assert_eq!(transport.opens(), 6);
}

#[tokio::test(start_paused = true)]
async fn explicit_connect_after_giving_up_starts_over() {
    let transport = ScriptedTransport::new(vec![
        Script::Fail,
        Script::Fail,
        Script::Fail,
        Script::Fail,
        Script::Fail,
        Script::Fail,
        Script::Open(vec![]),
    ]);
    let (mut pipeline, _presenter) = pipeline(transport.clone());

    connect(&mut pipeline, URL).await;
    while matches!(
        pipeline.connection().phase(),
        ConnectionPhase::Connecting | ConnectionPhase::Reconnecting
    ) {
        pump(&mut pipeline).await;
    }
    assert!(!pipeline.is_connected());
    assert_eq!(transport.opens(), 6);

    connect(&mut pipeline, URL).await;

    assert!(pipeline.is_connected());
    assert_eq!(pipeline.connection_state().reconnect_attempts, 0);
    assert_eq!(transport.opens(), 7);
}

#[tokio::test(start_paused = true)]
async fn disconnect_cancels_the_pending_reconnect() {
    let transport = ScriptedTransport::new(vec![]);
    let (mut pipeline, _presenter) = pipeline(transport.clone());

    connect(&mut pipeline, URL).await;
    assert_eq!(
        pipeline.connection().scheduled_reconnect(),
        Some(Duration::from_secs(1))
    );

    pipeline.disconnect();

    assert_eq!(pipeline.connection().scheduled_reconnect(), None);
    let idle = tokio::time::timeout(Duration::from_secs(120), pipeline.next_event()).await;
    assert!(idle.is_err());
    assert_eq!(transport.opens(), 1);
    assert!(!pipeline.is_connected());
    assert_eq!(pipeline.current_url(), Some(URL));
}

#[tokio::test(start_paused = true)]
async fn server_close_triggers_reconnect_which_resets_attempts() {
    let transport = ScriptedTransport::new(vec![
        Script::OpenThenClose(vec![]),
        Script::Open(vec![SseFrame::new(
            Some("alert"),
            r#"{"title":"Back online","message":"Stream resumed"}"#,
        )]),
    ]);
    let (mut pipeline, _presenter) = pipeline(transport.clone());

    connect(&mut pipeline, URL).await;
    assert!(pipeline.is_connected());

    let lost = pipeline.next_event().await;
    assert!(matches!(lost, ConnectionEvent::Lost(TransportError::Closed)));
    pipeline.handle_event(lost).await;
    assert!(!pipeline.is_connected());
    assert_eq!(pipeline.connection_state().reconnect_attempts, 1);

    // the reconnect deadline, then the reopen
    assert_eq!(pump(&mut pipeline).await, None);
    assert_eq!(pipeline.connection().phase(), ConnectionPhase::Connecting);
    assert_eq!(pump(&mut pipeline).await, None);
    assert!(pipeline.is_connected());
    assert_eq!(pipeline.connection_state().reconnect_attempts, 0);

    assert!(pump(&mut pipeline).await.is_some());
    assert_eq!(transport.opens(), 2);
}

#[tokio::test(start_paused = true)]
async fn connecting_while_connected_replaces_the_stream() {
    let transport = ScriptedTransport::new(vec![
        Script::Open(vec![]),
        Script::Open(vec![SseFrame::new(
            None,
            r#"{"title":"From second stream","message":"Hello"}"#,
        )]),
    ]);
    let (mut pipeline, _presenter) = pipeline(transport.clone());

    connect(&mut pipeline, URL).await;
    connect(&mut pipeline, "http://plant.local/api/events/v2").await;

    assert!(pipeline.is_connected());
    assert_eq!(pipeline.current_url(), Some("http://plant.local/api/events/v2"));
    assert_eq!(transport.opens(), 2);

    pump(&mut pipeline).await;
    assert_eq!(pipeline.notifications()[0].title, "From second stream");
}

#[tokio::test]
async fn store_operations_through_the_pipeline() {
    let (mut pipeline, presenter) = pipeline(ScriptedTransport::new(vec![]));

    let pushed = pipeline
        .ingest_push("Shift change", "Line B3 handover in 10 minutes")
        .await
        .unwrap();
    let simulated = pipeline.simulate_notification(Default::default()).await;
    assert_eq!(pipeline.ingest_push("", "no title").await, None);

    assert_eq!(pipeline.unread_count(), 2);
    assert_eq!(pipeline.notifications()[0].title, "Test Notification");
    assert_eq!(
        pipeline.notification_by_id(&pushed).unwrap().notification_type,
        NotificationType::Info
    );

    pipeline.mark_as_read(&pushed);
    pipeline.mark_as_read("unknown");
    assert!(pipeline.notification_by_id(&pushed).unwrap().read);
    assert_eq!(pipeline.unread_count(), 1);

    pipeline.remove_notification("unknown");
    assert_eq!(pipeline.notifications().len(), 2);
    pipeline.remove_notification(&simulated);
    assert_eq!(pipeline.notifications().len(), 1);

    pipeline.mark_all_as_read();
    assert_eq!(pipeline.unread_count(), 0);

    pipeline.clear_all();
    assert!(pipeline.notifications().is_empty());
    assert_eq!(presenter.presented(), vec![pushed, simulated]);
}
