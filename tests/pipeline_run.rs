use anyhow::anyhow;
use async_trait::async_trait;
use bullish_candle_alert::chart::{ChartRenderer, NoopChartRenderer};
use bullish_candle_alert::indicators::BullishPattern;
use bullish_candle_alert::market::bitget::CANDLES_PATH;
use bullish_candle_alert::market::{BitgetClient, CandleSeries};
use bullish_candle_alert::notification::{
    DeliveryReport, DeliveryStatus, Notifier, StrategyNotes, TelegramNotifier,
};
use bullish_candle_alert::pipeline::{CandleRequest, Pipeline, RunOutcome};
use chrono_tz::Europe::Berlin;
use mockito::{Matcher, Server};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

// Newest first, as the exchange sends them. The last two candles form a
// bullish engulfing that also satisfies the piercing line rule.
const ENGULFING_BODY: &str = r#"{"code":"00000","data":[
    ["1700028800000","95.5","102","95","101.5","3.1","310","310"],
    ["1700014400000","100.5","101","95","96","2.4","240","240"],
    ["1700000000000","100","101","99","100.5","1.9","190","190"]
]}"#;

const QUIET_BODY: &str = r#"{"code":"00000","data":[
    ["1700028800000","100","101","99.5","100.5","1","100","100"],
    ["1700014400000","100","101","99.5","100.5","1","100","100"],
    ["1700000000000","100","101","99.5","100.5","1","100","100"]
]}"#;

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> DeliveryReport {
        self.sent.lock().unwrap().push(text.to_string());
        let mut report = DeliveryReport::default();
        report.push("42", DeliveryStatus::Delivered);
        report
    }
}

struct FailingRenderer {
    calls: Arc<AtomicUsize>,
}

impl ChartRenderer for FailingRenderer {
    fn render(&self, _series: &CandleSeries) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("no display available"))
    }
}

struct ThreadRecordingRenderer {
    thread: Arc<Mutex<Option<ThreadId>>>,
}

impl ChartRenderer for ThreadRecordingRenderer {
    fn render(&self, _series: &CandleSeries) -> anyhow::Result<()> {
        *self.thread.lock().unwrap() = Some(thread::current().id());
        Ok(())
    }
}

async fn exchange(server: &mut Server, status: usize, body: &str) -> mockito::Mock {
    server
        .mock("GET", CANDLES_PATH)
        .match_query(Matcher::Any)
        .with_status(status)
        .with_body(body)
        .create_async()
        .await
}

fn request() -> CandleRequest {
    CandleRequest {
        symbol: "BTCEUR".into(),
        granularity: "4h".into(),
        limit: 3,
    }
}

fn pipeline(url: &str, renderer: Box<dyn ChartRenderer>, notifier: Box<dyn Notifier>) -> Pipeline {
    let market = BitgetClient::new(url, Berlin, Duration::from_secs(5)).unwrap();
    Pipeline::new(market, renderer, notifier, StrategyNotes::default(), request())
}

#[tokio::test]
async fn detected_pattern_is_sent_once() {
    let mut server = Server::new_async().await;
    let _bitget = exchange(&mut server, 200, ENGULFING_BODY).await;

    let notifier = RecordingNotifier::default();
    let sent = notifier.sent.clone();
    let outcome = pipeline(&server.url(), Box::new(NoopChartRenderer), Box::new(notifier))
        .run_once()
        .await
        .unwrap();

    let RunOutcome::Notified { patterns, report } = outcome else {
        panic!("expected a notification, got {:?}", outcome);
    };
    assert_eq!(
        patterns,
        vec![BullishPattern::BullishEngulfing, BullishPattern::PiercingLine]
    );
    assert_eq!(report.delivered(), 1);

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("📈 Bullish pattern detected: Bullish Engulfing, Piercing Line"));
    assert!(sent[0].contains("📅 Time: 2023-11-15 07:13"));
    assert!(sent[0].contains("• Bullish Engulfing: "));
}

#[tokio::test]
async fn no_pattern_sends_nothing() {
    let mut server = Server::new_async().await;
    let _bitget = exchange(&mut server, 200, QUIET_BODY).await;

    let notifier = RecordingNotifier::default();
    let sent = notifier.sent.clone();
    let outcome = pipeline(&server.url(), Box::new(NoopChartRenderer), Box::new(notifier))
        .run_once()
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::NoPattern));
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn exchange_error_ends_the_run_quietly() {
    let mut server = Server::new_async().await;
    let _bitget = exchange(&mut server, 400, r#"{"code":"40034","msg":"bad symbol"}"#).await;

    let notifier = RecordingNotifier::default();
    let sent = notifier.sent.clone();
    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = FailingRenderer { calls: calls.clone() };

    let outcome = pipeline(&server.url(), Box::new(renderer), Box::new(notifier))
        .run_once()
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::NoData));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn chart_failure_does_not_stop_notification() {
    let mut server = Server::new_async().await;
    let _bitget = exchange(&mut server, 200, ENGULFING_BODY).await;

    let notifier = RecordingNotifier::default();
    let sent = notifier.sent.clone();
    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = FailingRenderer { calls: calls.clone() };

    let outcome = pipeline(&server.url(), Box::new(renderer), Box::new(notifier))
        .run_once()
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(matches!(outcome, RunOutcome::Notified { .. }));
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn dry_run_composes_without_sending() {
    let mut server = Server::new_async().await;
    let _bitget = exchange(&mut server, 200, ENGULFING_BODY).await;

    let notifier = RecordingNotifier::default();
    let sent = notifier.sent.clone();
    let outcome = pipeline(&server.url(), Box::new(NoopChartRenderer), Box::new(notifier))
        .dry_run(true)
        .run_once()
        .await
        .unwrap();

    let RunOutcome::DryRun { patterns, message } = outcome else {
        panic!("expected a dry run, got {:?}", outcome);
    };
    assert_eq!(patterns[0], BullishPattern::BullishEngulfing);
    assert!(message.contains("Piercing Line"));
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_candles_fail_the_run() {
    let mut server = Server::new_async().await;
    let _bitget = exchange(&mut server, 200, r#"{"data":[["1700000000000","1","2"]]}"#).await;

    let notifier = RecordingNotifier::default();
    let sent = notifier.sent.clone();
    let result = pipeline(&server.url(), Box::new(NoopChartRenderer), Box::new(notifier))
        .run_once()
        .await;

    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("BTCEUR"));
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn telegram_recipients_are_all_attempted() {
    let mut server = Server::new_async().await;
    let _bitget = exchange(&mut server, 200, ENGULFING_BODY).await;
    let telegram = server
        .mock("POST", "/botTOKEN/sendMessage")
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(2)
        .create_async()
        .await;

    let notifier = TelegramNotifier::new(&server.url(), "TOKEN", vec!["1".into(), "2".into()]);
    let outcome = pipeline(&server.url(), Box::new(NoopChartRenderer), Box::new(notifier))
        .run_once()
        .await
        .unwrap();

    telegram.assert_async().await;
    let RunOutcome::Notified { report, .. } = outcome else {
        panic!("expected a notification, got {:?}", outcome);
    };
    assert_eq!(report.delivered(), 2);
}

#[tokio::test]
async fn chart_renders_off_the_runtime_thread() {
    let mut server = Server::new_async().await;
    let _bitget = exchange(&mut server, 200, QUIET_BODY).await;

    let thread = Arc::new(Mutex::new(None));
    let renderer = ThreadRecordingRenderer { thread: thread.clone() };

    let outcome = pipeline(&server.url(), Box::new(renderer), Box::new(RecordingNotifier::default()))
        .run_once()
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::NoPattern));
    let render_thread = thread.lock().unwrap().expect("renderer was called");
    assert_ne!(render_thread, thread::current().id());
}

#[tokio::test]
async fn rejected_recipient_does_not_fail_the_run() {
    let mut server = Server::new_async().await;
    let _bitget = exchange(&mut server, 200, ENGULFING_BODY).await;
    let rejected = server
        .mock("POST", "/botTOKEN/sendMessage")
        .match_body(Matcher::UrlEncoded("chat_id".into(), "1".into()))
        .with_status(400)
        .with_body(r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
        .expect(1)
        .create_async()
        .await;
    let delivered = server
        .mock("POST", "/botTOKEN/sendMessage")
        .match_body(Matcher::UrlEncoded("chat_id".into(), "2".into()))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let notifier = TelegramNotifier::new(&server.url(), "TOKEN", vec!["1".into(), "2".into()]);
    let outcome = pipeline(&server.url(), Box::new(NoopChartRenderer), Box::new(notifier))
        .run_once()
        .await
        .unwrap();

    rejected.assert_async().await;
    delivered.assert_async().await;

    let RunOutcome::Notified { report, .. } = outcome else {
        panic!("expected a notification, got {:?}", outcome);
    };
    assert!(matches!(
        report.outcomes[0].status,
        DeliveryStatus::Rejected { status: 400, .. }
    ));
    assert_eq!(report.outcomes[1].status, DeliveryStatus::Delivered);
    assert_eq!(report.delivered(), 1);
    assert_eq!(report.failed(), 1);
}
