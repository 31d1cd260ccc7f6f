use alert_notifier::{
    alertmanager::{AlertmanagerClient, Transport},
    notifier::{CycleReport, Notifier, StatusFilter},
    sinks::{Notification, Sink},
    AlertFormatter, AlertStatus, Error, Result,
};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serves a fixed body, or fails every request.
struct StaticTransport {
    body: Option<String>,
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        assert!(url.ends_with("/api/v1/alerts"));
        match &self.body {
            Some(body) => Ok(body.clone().into_bytes()),
            None => Err(Error::Transport("giving up after 3 attempts".into())),
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<Notification>>,
    reject: Option<String>,
}

#[async_trait]
impl Sink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        if self.reject.as_deref() == Some(notification.alertname.as_str()) {
            return Err(Error::Sink("chat API rejected the message".into()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

fn body() -> String {
    let now = Utc::now();
    let ts = |t: chrono::DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Secs, true);
    json!({
        "status": "success",
        "data": [
            {
                "labels": { "alertname": "HighCPU", "job": "api_server" },
                "annotations": { "summary": "CPU high" },
                "startsAt": ts(now - ChronoDuration::minutes(90)),
                "endsAt": "0001-01-01T00:00:00Z"
            },
            {
                "labels": { "alertname": "DiskFull" },
                "annotations": { "summary": "Disk almost full" },
                "startsAt": ts(now - ChronoDuration::hours(2)),
                "endsAt": ts(now - ChronoDuration::hours(1))
            }
        ]
    })
    .to_string()
}

fn notifier(body: Option<String>, sink: Arc<RecordingSink>, filter: StatusFilter) -> Notifier {
    let client = AlertmanagerClient::new(
        "http://alertmanager:9093",
        Arc::new(StaticTransport { body }),
    );
    let formatter = AlertFormatter::new(|d: Duration| format!("{}m", d.as_secs() / 60));
    Notifier::new(client, formatter, sink).with_filter(filter)
}

#[tokio::test]
async fn test_cycle_delivers_every_alert() {
    let sink = Arc::new(RecordingSink::default());
    let report = notifier(Some(body()), sink.clone(), StatusFilter::All)
        .run_once()
        .await
        .unwrap();

    assert_eq!(report, CycleReport { fetched: 2, sent: 2, failed: 0 });

    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent[0].alertname, "HighCPU");
    assert_eq!(sent[0].status, AlertStatus::Firing);
    assert!(sent[0].message.starts_with("🔥 *FIRING* 🔥 *HighCPU*\nCPU high\n\n"));
    assert!(sent[0].message.contains("job: api\\_server\n"));
    assert!(sent[0].message.ends_with("*Started*: 90m ago\n"));

    assert_eq!(sent[1].status, AlertStatus::Resolved);
    assert!(sent[1].message.starts_with("*RESOLVED* *DiskFull*\n"));
    assert!(sent[1].message.ends_with("*Ended*: 60m ago\n*Duration*: 60m\n"));
}

#[tokio::test]
async fn test_cycle_filters_by_status() {
    let sink = Arc::new(RecordingSink::default());
    let report = notifier(Some(body()), sink.clone(), StatusFilter::Resolved)
        .run_once()
        .await
        .unwrap();

    assert_eq!(report, CycleReport { fetched: 2, sent: 1, failed: 0 });
    assert_eq!(sink.sent.lock().unwrap()[0].alertname, "DiskFull");
}

#[tokio::test]
async fn test_sink_failure_does_not_stop_siblings() {
    let sink = Arc::new(RecordingSink {
        reject: Some("HighCPU".to_string()),
        ..Default::default()
    });
    let report = notifier(Some(body()), sink.clone(), StatusFilter::All)
        .run_once()
        .await
        .unwrap();

    assert_eq!(report, CycleReport { fetched: 2, sent: 1, failed: 1 });
    assert_eq!(sink.sent.lock().unwrap()[0].alertname, "DiskFull");
}

#[tokio::test]
async fn test_fetch_failure_fails_cycle() {
    let sink = Arc::new(RecordingSink::default());
    let result = notifier(None, sink.clone(), StatusFilter::All).run_once().await;

    tokio_test::assert_err!(&result);
    assert!(matches!(result, Err(Error::Transport(_))));
    assert!(sink.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_alert_list() {
    let sink = Arc::new(RecordingSink::default());
    let report = notifier(Some(r#"{"status":"success"}"#.to_string()), sink, StatusFilter::All)
        .run_once()
        .await
        .unwrap();

    assert_eq!(report, CycleReport::default());
}

/// Takes `delay` to answer the first request, then answers at once.
struct SlowFirstTransport {
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

#[async_trait]
impl Transport for SlowFirstTransport {
    async fn get(&self, _url: &str) -> Result<Vec<u8>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(self.delay).await;
        }
        Ok(br#"{"status":"success","data":[]}"#.to_vec())
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_cycle_delays_next_cycle() {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = AlertmanagerClient::new(
        "http://alertmanager:9093",
        Arc::new(SlowFirstTransport {
            calls: calls.clone(),
            delay: Duration::from_millis(350),
        }),
    );
    let notifier = Notifier::new(
        client,
        AlertFormatter::default(),
        Arc::new(RecordingSink::default()),
    );

    // The overdue tick fires when the first cycle ends at 350ms; the one after
    // that is due at 450ms rather than immediately.
    let _ = tokio::time::timeout(
        Duration::from_millis(420),
        notifier.run(Duration::from_millis(100)),
    )
    .await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
