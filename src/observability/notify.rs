//! Chat notifications for warning and error logs.
//!
//! A [`NotifyLayer`] sits in the tracing subscriber next to the log
//! formatter. Events at or above the configured level are turned into a
//! [`SlackMessage`] and queued; a [`NotifyWorker`] posts the queue to the
//! chat API in the background so logging never waits on the network.
//!
//! # Message layout
//! ```text
//! [context block]  Path: /doiliveinademocracy      (only when known)
//!                  trace="projects/p/traces/abc"
//! [section block]  :x: Could not load country data: ...
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{span, Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::config::NotifyConfig;

/// Targets whose events are never forwarded, so posting cannot feed back into itself.
const SKIPPED_TARGETS: &[&str] = &[module_path!(), "reqwest", "hyper", "h2", "rustls"];

/// Parse a minimum level name. `panic` and `fatal` map to error.
pub fn parse_level(name: &str) -> Option<Level> {
    match name.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" | "fatal" | "panic" => Some(Level::ERROR),
        _ => None,
    }
}

/// Marker placed before the message text.
pub fn level_prefix(level: Level) -> &'static str {
    match level {
        Level::ERROR => ":x: ",
        Level::WARN => ":warning: ",
        Level::INFO => ":information_source: ",
        Level::DEBUG => "Debug: ",
        _ => "Trace: ",
    }
}

/// Request details picked up from enclosing spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub path: Option<String>,
    pub trace: Option<String>,
}

impl RequestContext {
    fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(path) = &self.path {
            lines.push(format!("Path: {}", path));
        }
        if let Some(trace) = &self.trace {
            lines.push(format!("trace=\"{}\"", trace));
        }
        lines
    }

    fn fill_from(&mut self, other: &RequestContext) {
        if self.path.is_none() {
            self.path.clone_from(&other.path);
        }
        if self.trace.is_none() {
            self.trace.clone_from(&other.trace);
        }
    }
}

/// A plain text element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
    pub emoji: bool,
}

impl TextObject {
    fn plain(text: String) -> Self {
        Self { kind: "plain_text", text, emoji: true }
    }
}

/// Layout blocks of a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Context { elements: Vec<TextObject> },
    Section { text: TextObject },
}

/// A formatted notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackMessage {
    /// Fallback text used by chat clients for notifications.
    pub text: String,
    pub blocks: Vec<Block>,
}

impl SlackMessage {
    /// Lay out a log message with its level marker and request context.
    pub fn compose(level: Level, message: &str, context: &RequestContext) -> Self {
        let mut blocks = Vec::with_capacity(2);

        let lines = context.lines();
        if !lines.is_empty() {
            blocks.push(Block::Context {
                elements: vec![TextObject::plain(lines.join("\n"))],
            });
        }

        blocks.push(Block::Section {
            text: TextObject::plain(format!("{}{}", level_prefix(level), message)),
        });

        Self {
            text: message.to_string(),
            blocks,
        }
    }
}

struct ContextVisitor<'a>(&'a mut RequestContext);

impl ContextVisitor<'_> {
    fn set(&mut self, field: &Field, value: String) {
        match field.name() {
            "path" => self.0.path = Some(value),
            "trace" => self.0.trace = Some(value),
            _ => {}
        }
    }
}

impl Visit for ContextVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.set(field, format!("{:?}", value));
    }
}

/// Picks out the event's message; structured fields stay in the regular logs.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

/// Tracing layer that queues chat notifications.
#[derive(Debug, Clone)]
pub struct NotifyLayer {
    min_level: Level,
    tx: mpsc::UnboundedSender<SlackMessage>,
}

impl NotifyLayer {
    /// Create a layer and the receiving end of its queue.
    pub fn new(min_level: Level) -> (Self, mpsc::UnboundedReceiver<SlackMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { min_level, tx }, rx)
    }

    /// Least severe level forwarded.
    pub fn min_level(&self) -> Level {
        self.min_level
    }

    fn forwards(&self, level: &Level, target: &str) -> bool {
        // More verbose levels compare greater.
        *level <= self.min_level && !SKIPPED_TARGETS.iter().any(|t| target.starts_with(t))
    }
}

impl<S> Layer<S> for NotifyLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut context = RequestContext::default();
        attrs.record(&mut ContextVisitor(&mut context));
        span.extensions_mut().insert(context);
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut extensions = span.extensions_mut();
        if let Some(context) = extensions.get_mut::<RequestContext>() {
            values.record(&mut ContextVisitor(context));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !self.forwards(metadata.level(), metadata.target()) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let mut context = RequestContext::default();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                if let Some(found) = span.extensions().get::<RequestContext>() {
                    context.fill_from(found);
                }
            }
        }

        let message = SlackMessage::compose(*metadata.level(), &visitor.message, &context);
        // The worker may already be gone during shutdown.
        let _ = self.tx.send(message);
    }
}

/// Error posting a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat API error: {0}")]
    Api(String),
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    blocks: &'a [Block],
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Minimal chat API client.
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    channel: String,
    debug: bool,
}

impl SlackClient {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        channel: impl Into<String>,
        debug: bool,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            token: token.into(),
            channel: channel.into(),
            debug,
        }
    }

    /// Post one message to the configured channel.
    pub async fn post(&self, message: &SlackMessage) -> Result<(), NotifyError> {
        let url = format!("{}/chat.postMessage", self.api_base.trim_end_matches('/'));
        let payload = PostMessage {
            channel: &self.channel,
            text: &message.text,
            blocks: &message.blocks,
        };
        if self.debug {
            tracing::debug!(url = %url, channel = %self.channel, text = %message.text, "Posting notification");
        }

        let response: PostMessageResponse = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.ok {
            Ok(())
        } else {
            Err(NotifyError::Api(response.error.unwrap_or_else(|| "unknown".to_string())))
        }
    }
}

/// Drains the notification queue.
#[derive(Debug)]
pub struct NotifyWorker {
    client: SlackClient,
    rx: mpsc::UnboundedReceiver<SlackMessage>,
}

impl NotifyWorker {
    pub fn new(client: SlackClient, rx: mpsc::UnboundedReceiver<SlackMessage>) -> Self {
        Self { client, rx }
    }

    /// Post messages until every sender is dropped.
    pub async fn run(mut self) {
        while let Some(message) = self.rx.recv().await {
            if let Err(e) = self.client.post(&message).await {
                // Logged locally only; this module's events are never forwarded.
                tracing::warn!(error = %e, "Could not post notification");
            }
        }
    }
}

/// A configured layer/worker pair.
#[derive(Debug)]
pub struct Notifier {
    pub layer: NotifyLayer,
    pub worker: NotifyWorker,
    pub min_level: Level,
    /// Set when the configured level was not recognized and error was used instead.
    pub unknown_level: Option<String>,
}

impl Notifier {
    /// Build a notifier, or `None` when no token/channel is configured.
    pub fn from_config(config: &NotifyConfig) -> Option<Self> {
        if !config.is_enabled() {
            return None;
        }
        let token = config.slack_token.clone()?;
        let channel = config.slack_channel.clone()?;

        let (min_level, unknown_level) = match parse_level(&config.slack_level) {
            Some(level) => (level, None),
            None => (Level::ERROR, Some(config.slack_level.clone())),
        };

        let (layer, rx) = NotifyLayer::new(min_level);
        let client = SlackClient::new(config.api_base.clone(), token, channel, config.slack_debug);
        Some(Self {
            layer,
            worker: NotifyWorker::new(client, rx),
            min_level,
            unknown_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, routing::post, Json, Router};
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("ERROR"), Some(Level::ERROR));
        assert_eq!(parse_level("warning"), Some(Level::WARN));
        assert_eq!(parse_level("panic"), Some(Level::ERROR));
        assert_eq!(parse_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_compose_without_context() {
        let message = SlackMessage::compose(Level::WARN, "disk low", &RequestContext::default());
        assert_eq!(message.text, "disk low");
        assert_eq!(
            message.blocks,
            vec![Block::Section { text: TextObject::plain(":warning: disk low".into()) }]
        );
    }

    #[test]
    fn test_compose_with_context_json() {
        let context = RequestContext {
            path: Some("/doiliveinademocracy".into()),
            trace: Some("projects/p/traces/abc".into()),
        };
        let message = SlackMessage::compose(Level::ERROR, "boom", &context);
        let json = serde_json::to_value(&message.blocks).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {
                    "type": "context",
                    "elements": [{
                        "type": "plain_text",
                        "text": "Path: /doiliveinademocracy\ntrace=\"projects/p/traces/abc\"",
                        "emoji": true
                    }]
                },
                {
                    "type": "section",
                    "text": { "type": "plain_text", "text": ":x: boom", "emoji": true }
                }
            ])
        );
    }

    #[test]
    fn test_layer_filters_by_level_and_reads_span_context() {
        let (layer, mut rx) = NotifyLayer::new(Level::WARN);
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("request", path = "/fn/_debug", trace = tracing::field::Empty);
            span.record("trace", "projects/p/traces/t1");
            let _guard = span.enter();
            tracing::info!(target: "democracy_check::data", "not forwarded");
            tracing::warn!(target: "democracy_check::data", stage = "country", "Could not load");
            tracing::error!("skipped, emitted by the notifier's own module");
        });

        let message = rx.try_recv().unwrap();
        assert_eq!(message.text, "Could not load");
        assert_eq!(
            message.blocks[0],
            Block::Context {
                elements: vec![TextObject::plain(
                    "Path: /fn/_debug\ntrace=\"projects/p/traces/t1\"".into()
                )]
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_from_config() {
        let mut config = NotifyConfig::default();
        assert!(Notifier::from_config(&config).is_none());

        config.slack_token = Some("xoxb-1".into());
        config.slack_channel = Some("#alerts".into());
        config.slack_level = "loud".into();
        let notifier = Notifier::from_config(&config).unwrap();
        assert_eq!(notifier.min_level, Level::ERROR);
        assert_eq!(notifier.unknown_level.as_deref(), Some("loud"));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<serde_json::Value>>>);

    async fn mock_post(
        State(captured): State<Captured>,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        let ok = body["channel"] != "#missing";
        captured.0.lock().unwrap().push(body);
        if ok {
            Json(serde_json::json!({ "ok": true }))
        } else {
            Json(serde_json::json!({ "ok": false, "error": "channel_not_found" }))
        }
    }

    async fn start_mock_api() -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route("/api/chat.postMessage", post(mock_post))
            .with_state(captured.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{}/api", addr), captured)
    }

    #[tokio::test]
    async fn test_client_posts_message() {
        let (base, captured) = start_mock_api().await;
        let client = SlackClient::new(base, "xoxb-1", "#alerts", false);

        let message = SlackMessage::compose(Level::ERROR, "boom", &RequestContext::default());
        client.post(&message).await.unwrap();

        let bodies = captured.0.lock().unwrap().clone();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["channel"], "#alerts");
        assert_eq!(bodies[0]["text"], "boom");
        assert_eq!(bodies[0]["blocks"][0]["text"]["text"], ":x: boom");
    }

    #[tokio::test]
    async fn test_client_reports_api_error() {
        let (base, _captured) = start_mock_api().await;
        let client = SlackClient::new(base, "xoxb-1", "#missing", false);

        let message = SlackMessage::compose(Level::ERROR, "boom", &RequestContext::default());
        match client.post(&message).await {
            Err(NotifyError::Api(e)) => assert_eq!(e, "channel_not_found"),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_worker_drains_queue() {
        let (base, captured) = start_mock_api().await;
        let (layer, rx) = NotifyLayer::new(Level::ERROR);
        let worker = NotifyWorker::new(SlackClient::new(base, "xoxb-1", "#alerts", false), rx);

        let message = SlackMessage::compose(Level::ERROR, "one", &RequestContext::default());
        layer.tx.send(message.clone()).unwrap();
        layer.tx.send(message).unwrap();
        drop(layer);

        worker.run().await;
        assert_eq!(captured.0.lock().unwrap().len(), 2);
    }
}
