//! Poll loop orchestrator.
//!
//! Each tick runs `fetch → validate → map → notify` against the owned
//! [`LoopState`], then the loop sleeps a fixed interval no matter how the
//! tick ended. Errors inside a tick are absorbed at the tick boundary: they are
//! logged and reported through the notifier, and polling continues. The only
//! fatal path is the startup precondition check.

pub mod state;

pub use state::LoopState;

use std::time::Duration;

use chrono::Utc;
use telegram_bot::BotClient;

use crate::client::{PracticumClient, StatusSource};
use crate::config::{Credentials, Settings};
use crate::error::{Result, WatchError};
use crate::notifier::{Messenger, Notifier};
use crate::status;
use crate::types::TickOutcome;
use crate::validate;

pub struct Orchestrator<S, M> {
    source: S,
    notifier: Notifier<M>,
    state: LoopState,
    interval: Duration,
}

impl<S: StatusSource, M: Messenger> Orchestrator<S, M> {
    pub fn new(source: S, notifier: Notifier<M>, cursor: i64, interval: Duration) -> Self {
        Self {
            source,
            notifier,
            state: LoopState::new(cursor),
            interval,
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn notifier(&self) -> &Notifier<M> {
        &self.notifier
    }

    /// Poll forever. Returns only if the task is dropped.
    pub async fn run(mut self) {
        loop {
            let outcome = self.tick().await;
            tracing::debug!(?outcome, cursor = self.state.cursor(), "tick finished");
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One pass of the loop, with the per-tick error boundary.
    pub async fn tick(&mut self) -> TickOutcome {
        match self.poll().await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %err, cursor = self.state.cursor(), "tick failed");
                let text = format!("Program failure: {err}");
                if let Err(secondary) = self.notifier.send(&text).await {
                    tracing::warn!(error = %secondary, "failure notification was not delivered");
                }
                TickOutcome::Failed(err.to_string())
            }
        }
    }

    async fn poll(&mut self) -> Result<TickOutcome> {
        let response = self.source.fetch(self.state.cursor()).await?;
        let record = validate::check_response(&response)?;

        let outcome = match status::verdict_message(&record) {
            Ok(message) if self.state.is_repeat(&message) => {
                tracing::info!(homework = %record.id, "status unchanged");
                TickOutcome::Unchanged
            }
            Ok(message) => {
                self.notifier.send(&message).await?;
                self.state.record_sent(message.clone());
                TickOutcome::Notified(message)
            }
            Err(WatchError::UnknownStatus(code)) => {
                tracing::warn!(homework = %record.id, status = %code, "no verdict for status, skipping");
                TickOutcome::NoVerdict(code)
            }
            Err(other) => return Err(other),
        };

        if let Some(next) = validate::current_date(&response) {
            if self.state.advance_cursor(next) {
                tracing::debug!(cursor = next, "cursor advanced");
            }
        }

        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

/// Verify the required secrets before entering the loop.
///
/// On failure: logs at critical severity, makes one best-effort attempt to
/// report it through `notifier`, and returns [`WatchError::MissingConfig`].
pub async fn check_preconditions<M: Messenger>(
    settings: &Settings,
    notifier: &Notifier<M>,
) -> Result<Credentials> {
    match settings.credentials() {
        Ok(credentials) => {
            tracing::debug!("configuration check passed");
            Ok(credentials)
        }
        Err(err) => {
            tracing::error!(severity = "critical", error = %err, "startup precondition failed");
            let text = format!(
                "Missing required environment variables: {}",
                settings.missing().join(", ")
            );
            if let Err(secondary) = notifier.send(&text).await {
                tracing::warn!(error = %secondary, "could not report startup failure");
            }
            Err(err)
        }
    }
}

/// Wire the real HTTP clients together and poll until the process stops.
///
/// Returns only on a startup failure.
pub async fn start(settings: Settings) -> Result<()> {
    let http = reqwest::Client::builder()
        .build()
        .map_err(|e| WatchError::InvalidConfig(format!("cannot build HTTP client: {e}")))?;

    let bot = BotClient::with_api_url(
        http.clone(),
        settings.telegram_api_url.as_str(),
        settings.telegram_token.clone().unwrap_or_default(),
    );
    let notifier = Notifier::new(bot, settings.telegram_chat_id.clone().unwrap_or_default());

    let credentials = check_preconditions(&settings, &notifier).await?;

    let source = PracticumClient::new(http, settings.endpoint.as_str(), credentials.practicum_token);
    let cursor = settings.from_date.unwrap_or_else(|| Utc::now().timestamp());
    tracing::info!(
        cursor,
        interval_secs = settings.poll_interval.as_secs(),
        "bot started"
    );

    Orchestrator::new(source, notifier, cursor, settings.poll_interval)
        .run()
        .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::notifier::testing::RecordingMessenger;

    /// Replays queued responses and records the cursor of every fetch.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Value>>>,
        cursors: Arc<Mutex<Vec<i64>>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Value>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                cursors: Arc::default(),
            }
        }

        /// Shared view of the fetch log, usable after the source is moved.
        fn cursor_log(&self) -> Arc<Mutex<Vec<i64>>> {
            Arc::clone(&self.cursors)
        }

        fn cursors(&self) -> Vec<i64> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch(&self, from_date: i64) -> Result<Value> {
            self.cursors.lock().unwrap().push(from_date);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(WatchError::Transport("script exhausted".into())))
        }
    }

    fn homework(name: &str, status: &str, current_date: i64) -> Result<Value> {
        Ok(json!({
            "homeworks": [{"homework_name": name, "status": status}],
            "current_date": current_date
        }))
    }

    fn orchestrator(
        responses: Vec<Result<Value>>,
    ) -> Orchestrator<ScriptedSource, RecordingMessenger> {
        Orchestrator::new(
            ScriptedSource::new(responses),
            Notifier::new(RecordingMessenger::default(), "42"),
            1_000,
            Duration::from_secs(300),
        )
    }

    fn sent(orch: &Orchestrator<ScriptedSource, RecordingMessenger>) -> Vec<String> {
        orch.notifier().messenger().texts()
    }

    #[tokio::test]
    async fn reviewing_status_sends_exact_message() {
        let mut orch = orchestrator(vec![homework("hw1", "reviewing", 1_100)]);
        let outcome = orch.tick().await;

        let expected = "Changed status of \"hw1\". Работа взята на проверку ревьюером.";
        assert_eq!(outcome, TickOutcome::Notified(expected.to_string()));
        assert_eq!(sent(&orch), vec![expected.to_string()]);
        assert_eq!(orch.state().last_message(), expected);
    }

    #[tokio::test]
    async fn same_verdict_twice_notifies_once() {
        let mut orch = orchestrator(vec![
            homework("hw1", "approved", 1_100),
            homework("hw1", "approved", 1_200),
        ]);
        assert!(matches!(orch.tick().await, TickOutcome::Notified(_)));
        assert_eq!(orch.tick().await, TickOutcome::Unchanged);
        assert_eq!(sent(&orch).len(), 1);
    }

    #[tokio::test]
    async fn status_change_notifies_again() {
        let mut orch = orchestrator(vec![
            homework("hw1", "reviewing", 1_100),
            homework("hw1", "rejected", 1_200),
            homework("hw1", "reviewing", 1_300),
        ]);
        for _ in 0..3 {
            assert!(matches!(orch.tick().await, TickOutcome::Notified(_)));
        }
        assert_eq!(sent(&orch).len(), 3);
    }

    #[tokio::test]
    async fn cursor_follows_current_date() {
        let mut orch = orchestrator(vec![
            homework("hw1", "reviewing", 1_100),
            homework("hw1", "reviewing", 1_200),
        ]);
        orch.tick().await;
        assert_eq!(orch.state().cursor(), 1_100);
        orch.tick().await;
        assert_eq!(orch.state().cursor(), 1_200);
        assert_eq!(orch.source.cursors(), vec![1_000, 1_100]);
    }

    #[tokio::test]
    async fn cursor_is_never_rewound() {
        let mut orch = orchestrator(vec![
            homework("hw1", "reviewing", 1_500),
            homework("hw1", "reviewing", 1_200),
        ]);
        orch.tick().await;
        orch.tick().await;
        assert_eq!(orch.state().cursor(), 1_500);
    }

    #[tokio::test]
    async fn missing_current_date_keeps_cursor() {
        let mut orch = orchestrator(vec![Ok(json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}]
        }))]);
        assert!(matches!(orch.tick().await, TickOutcome::Notified(_)));
        assert_eq!(orch.state().cursor(), 1_000);
    }

    #[tokio::test]
    async fn unknown_status_skips_notification_but_advances_cursor() {
        let mut orch = orchestrator(vec![homework("hw1", "on_hold", 1_100)]);
        let outcome = orch.tick().await;

        assert_eq!(outcome, TickOutcome::NoVerdict("on_hold".to_string()));
        assert!(sent(&orch).is_empty());
        assert_eq!(orch.state().cursor(), 1_100);
        assert_eq!(orch.state().last_message(), "");
    }

    #[tokio::test]
    async fn transport_failure_reports_and_keeps_cursor() {
        let mut orch = orchestrator(vec![
            Err(WatchError::Transport("connection reset by peer".into())),
            homework("hw1", "approved", 1_100),
        ]);

        let outcome = orch.tick().await;
        assert!(matches!(outcome, TickOutcome::Failed(_)));
        assert_eq!(orch.state().cursor(), 1_000);
        assert_eq!(
            sent(&orch),
            vec!["Program failure: endpoint unreachable: connection reset by peer".to_string()]
        );

        assert!(matches!(orch.tick().await, TickOutcome::Notified(_)));
        assert_eq!(orch.source.cursors(), vec![1_000, 1_000]);
        assert_eq!(orch.state().cursor(), 1_100);
    }

    #[tokio::test]
    async fn empty_records_is_a_recoverable_tick_error() {
        let mut orch = orchestrator(vec![
            Ok(json!({"homeworks": [], "current_date": 1_100})),
            homework("hw1", "approved", 1_200),
        ]);

        let outcome = orch.tick().await;
        assert!(matches!(outcome, TickOutcome::Failed(ref e) if e.contains("homeworks[0]")));
        assert_eq!(orch.state().cursor(), 1_000);

        assert!(matches!(orch.tick().await, TickOutcome::Notified(_)));
        assert_eq!(orch.state().cursor(), 1_200);
    }

    #[tokio::test]
    async fn remote_and_shape_errors_go_through_failure_path() {
        let mut orch = orchestrator(vec![
            Err(WatchError::Remote { status_code: 503 }),
            Ok(Value::Null),
            Ok(json!({"current_date": 5})),
        ]);
        for _ in 0..3 {
            assert!(matches!(orch.tick().await, TickOutcome::Failed(_)));
        }
        let texts = sent(&orch);
        assert_eq!(texts.len(), 3);
        assert!(texts.iter().all(|t| t.starts_with("Program failure: ")));
        assert_eq!(orch.state().cursor(), 1_000);
    }

    #[tokio::test]
    async fn failed_delivery_is_retried_on_next_tick() {
        let mut orch = orchestrator(vec![
            homework("hw1", "approved", 1_100),
            homework("hw1", "approved", 1_100),
        ]);
        *orch.notifier().messenger().failing.lock().unwrap() = true;

        let outcome = orch.tick().await;
        assert!(matches!(outcome, TickOutcome::Failed(ref e) if e.contains("deliver")));
        assert_eq!(orch.state().last_message(), "");
        // The verdict attempt and the failure report were both attempted.
        assert_eq!(sent(&orch).len(), 2);

        *orch.notifier().messenger().failing.lock().unwrap() = false;
        assert!(matches!(orch.tick().await, TickOutcome::Notified(_)));
        assert_eq!(sent(&orch).len(), 3);
    }

    /// Let the spawned loop run until it parks on its sleep.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_sleeps_between_ticks_and_retries_with_same_cursor() {
        let interval = Duration::from_secs(300);
        let source = ScriptedSource::new(vec![
            Err(WatchError::Transport("connection reset by peer".into())),
            homework("hw1", "approved", 1_100),
            homework("hw1", "approved", 1_200),
        ]);
        let fetches = source.cursor_log();
        let orch = Orchestrator::new(
            source,
            Notifier::new(RecordingMessenger::default(), "42"),
            1_000,
            interval,
        );

        let handle = tokio::spawn(orch.run());
        settle().await;
        assert_eq!(*fetches.lock().unwrap(), vec![1_000]);

        tokio::time::advance(interval - Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(
            *fetches.lock().unwrap(),
            vec![1_000],
            "polled before the interval elapsed"
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(*fetches.lock().unwrap(), vec![1_000, 1_000]);

        tokio::time::advance(interval).await;
        settle().await;
        assert_eq!(*fetches.lock().unwrap(), vec![1_000, 1_000, 1_100]);

        handle.abort();
    }

    #[tokio::test]
    async fn preconditions_pass_without_notifying() {
        let settings = Settings {
            practicum_token: Some("p".into()),
            telegram_token: Some("t".into()),
            telegram_chat_id: Some("42".into()),
            ..Settings::default()
        };
        let notifier = Notifier::new(RecordingMessenger::default(), "42");
        let credentials = check_preconditions(&settings, &notifier).await.unwrap();
        assert_eq!(credentials.practicum_token, "p");
        assert!(notifier.messenger().texts().is_empty());
    }

    #[tokio::test]
    async fn missing_messaging_token_notifies_once_and_fails() {
        let settings = Settings {
            practicum_token: Some("p".into()),
            telegram_token: None,
            telegram_chat_id: Some("42".into()),
            ..Settings::default()
        };
        let notifier = Notifier::new(RecordingMessenger::failing(), "42");

        let err = check_preconditions(&settings, &notifier).await.unwrap_err();
        assert!(matches!(err, WatchError::MissingConfig(ref names) if names == &["TELEGRAM_TOKEN"]));
        assert_eq!(
            notifier.messenger().texts(),
            vec!["Missing required environment variables: TELEGRAM_TOKEN".to_string()]
        );
    }

    #[tokio::test]
    async fn start_refuses_to_poll_without_credentials() {
        let settings = Settings {
            practicum_token: Some("p".into()),
            telegram_token: None,
            telegram_chat_id: Some("42".into()),
            telegram_api_url: "http://127.0.0.1:1".into(),
            endpoint: "http://127.0.0.1:1/".into(),
            ..Settings::default()
        };
        let err = start(settings).await.unwrap_err();
        assert!(matches!(err, WatchError::MissingConfig(_)));
    }
}
