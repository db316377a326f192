use anyhow::Result;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::Path;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::api::{ApiClient, ApiError, GenerationResult, HealthStatus};
use crate::config::AppConfig;
use crate::export::{self, Clipboard};
use crate::session::{Effect, Msg, NoticeKind, Session, UiPhase};

/// Lines moved per PageUp/PageDown in the output panel
const SCROLL_STEP: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// What the startup health check found
#[derive(Debug, Clone, PartialEq)]
pub enum BackendStatus {
    Checking,
    Ready { model_name: Option<String> },
    ModelLoading,
    /// Reachable, but the health call itself failed
    Unhealthy,
    Offline,
}

/// Results of background tasks, drained on every tick
#[derive(Debug)]
enum Completion {
    Health(Result<HealthStatus, ApiError>),
    Generated(GenerationResult),
}

pub struct App {
    pub session: Session,
    pub popup: Popup,
    pub should_quit: bool,

    // Text being typed into the input box
    pub input: String,

    pub backend: BackendStatus,
    pub output_scroll: u16,
    pub spinner_frame: usize,

    config: AppConfig,
    api: ApiClient,
    clipboard: Box<dyn Clipboard>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl App {
    pub fn new(config: AppConfig, api: ApiClient, clipboard: Box<dyn Clipboard>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let mut session = Session::default();
        session.update(Msg::SelectModeByName(config.default_mode.clone()), Instant::now());

        Self {
            session,
            popup: Popup::None,
            should_quit: false,
            input: String::new(),
            backend: BackendStatus::Checking,
            output_scroll: 0,
            spinner_frame: 0,
            config,
            api,
            clipboard,
            completions_tx,
            completions_rx,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.api.endpoint()
    }

    /// Ask the backend whether it is up. The result arrives on a later tick.
    pub fn check_health(&mut self) {
        self.backend = BackendStatus::Checking;
        let api = self.api.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(Completion::Health(api.health().await));
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup == Popup::Help {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter) {
                self.popup = Popup::None;
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::F(1) => self.popup = Popup::Help,

            // Mode tabs
            KeyCode::Tab => self.dispatch(Msg::SelectMode(self.session.mode().next())),
            KeyCode::BackTab => self.dispatch(Msg::SelectMode(self.session.mode().previous())),

            KeyCode::Enter if alt => self.input.push('\n'),
            KeyCode::Enter => self.submit(),

            KeyCode::Char('y') if ctrl => self.dispatch(Msg::Copy),
            KeyCode::Char('s') if ctrl => self.dispatch(Msg::Download),
            KeyCode::Char('u') if ctrl => self.input.clear(),
            KeyCode::Char('r') if ctrl => self.check_health(),
            KeyCode::Char(c) if !ctrl && !alt => self.input.push(c),

            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::PageDown => self.output_scroll = self.output_scroll.saturating_add(SCROLL_STEP),
            KeyCode::PageUp => self.output_scroll = self.output_scroll.saturating_sub(SCROLL_STEP),

            _ => {}
        }
    }

    /// Bracketed paste from the terminal
    pub fn handle_paste(&mut self, text: &str) {
        if self.popup == Popup::None {
            self.input.push_str(&text.replace("\r\n", "\n"));
        }
    }

    fn submit(&mut self) {
        let input = self.input.clone();
        self.dispatch(Msg::Submit(input));
    }

    /// Feed a message to the session and carry out whatever it asks for
    pub fn dispatch(&mut self, msg: Msg) {
        let effects = self.session.update(msg, Instant::now());
        for effect in effects {
            self.perform(effect);
        }
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::Generate { input, mode } => {
                self.output_scroll = 0;
                let api = self.api.clone();
                let tx = self.completions_tx.clone();
                tokio::spawn(async move {
                    let result = api.generate(&input, mode).await;
                    let _ = tx.send(Completion::Generated(result));
                });
            }
            Effect::CopyToClipboard(text) => {
                let result = self.clipboard.set_text(&text);
                self.dispatch(Msg::Copied(result));
            }
            Effect::Download { mode, content } => {
                let result = export::download_as_file(
                    &self.config.download_dir(),
                    &self.config.filename_prefix,
                    mode,
                    &content,
                    Utc::now(),
                );
                if let Ok(path) = &result {
                    if self.config.notifications {
                        if let Err(e) = notify_saved(path) {
                            tracing::debug!("Notification failed: {}", e);
                        }
                    }
                }
                self.dispatch(Msg::Downloaded(result));
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Generated(result) => self.dispatch(Msg::Generated(result)),
            Completion::Health(Ok(health)) => {
                tracing::info!(
                    model_loaded = health.model_loaded,
                    model = health.model_name.as_deref().unwrap_or("-"),
                    "Backend health: {}",
                    health.status
                );
                if health.model_loaded {
                    self.backend = BackendStatus::Ready {
                        model_name: health.model_name,
                    };
                } else {
                    self.backend = BackendStatus::ModelLoading;
                    self.dispatch(Msg::Notify(
                        NoticeKind::Warning,
                        "Server is up but the model is still loading".to_string(),
                    ));
                }
            }
            Completion::Health(Err(e)) => {
                tracing::warn!("Health check failed: {}", e);
                self.backend = if e.is_connectivity() {
                    BackendStatus::Offline
                } else {
                    BackendStatus::Unhealthy
                };
                self.dispatch(Msg::Notify(NoticeKind::Warning, e.to_string()));
            }
        }
    }

    /// Periodic work: apply finished background tasks and expire messages
    pub fn tick(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.handle_completion(completion);
        }

        self.dispatch(Msg::Tick);

        if self.session.ui_phase() == UiPhase::Loading {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    #[cfg(test)]
    async fn next_completion(&mut self) {
        let completion = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            self.completions_rx.recv(),
        )
        .await
        .expect("background task did not finish")
        .expect("completion channel closed");
        self.handle_completion(completion);
    }
}

fn notify_saved(path: &Path) -> Result<()> {
    notify_rust::Notification::new()
        .summary("scrivener")
        .body(&format!("Saved {}", path.display()))
        .icon("document-save")
        .show()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::{test_client, unreachable_endpoint, StubServer};
    use crate::export::tests::MemoryClipboard;
    use crate::mode::Mode;
    use std::sync::{Arc, Mutex};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn test_app(endpoint: &str, config: AppConfig) -> (App, Arc<Mutex<Option<String>>>) {
        let clipboard = MemoryClipboard::default();
        let contents = clipboard.contents.clone();
        let app = App::new(config, test_client(endpoint), Box::new(clipboard));
        (app, contents)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let mut server = StubServer::start(200, r#"{"success":true,"content":"X"}"#).await;
        let (mut app, _) = test_app(&server.base_url, AppConfig::default());

        type_text(&mut app, "a blog about tea");
        app.handle_key(key(KeyCode::Enter));
        assert!(!app.session.is_submit_enabled());

        // pressing Enter again while loading must not start another request
        app.handle_key(key(KeyCode::Enter));

        app.next_completion().await;
        assert_eq!(app.session.last_generated_content(), Some("X"));
        assert!(app.session.is_submit_enabled());

        let request = server.next_request().await;
        assert_eq!(request.body["input"], "a blog about tea");
        assert_eq!(server.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_server_error_is_rendered_as_error_phase() {
        let server = StubServer::start(500, r#"{"error":"boom"}"#).await;
        let (mut app, _) = test_app(&server.base_url, AppConfig::default());

        type_text(&mut app, "anything at all");
        app.handle_key(key(KeyCode::Enter));
        app.next_completion().await;

        assert_eq!(app.session.ui_phase(), UiPhase::Error);
        assert!(app.session.is_submit_enabled());
    }

    #[tokio::test]
    async fn test_health_offline_shows_warning_and_stays_usable() {
        let endpoint = unreachable_endpoint().await;
        let (mut app, _) = test_app(&endpoint, AppConfig::default());

        app.check_health();
        app.next_completion().await;

        assert_eq!(app.backend, BackendStatus::Offline);
        let notice = app.session.notice().expect("warning notice");
        assert_eq!(notice.kind, NoticeKind::Warning);
        assert!(notice.text.contains("Cannot connect"));

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.session.mode(), Mode::Email);
    }

    #[tokio::test]
    async fn test_health_server_error_is_unhealthy() {
        let server = StubServer::start(500, r#"{"error":"model crashed"}"#).await;
        let (mut app, _) = test_app(&server.base_url, AppConfig::default());

        app.check_health();
        app.next_completion().await;
        assert_eq!(app.backend, BackendStatus::Unhealthy);
        assert_eq!(app.session.notice().map(|n| n.text.as_str()), Some("model crashed"));
    }

    #[tokio::test]
    async fn test_health_ready() {
        let server = StubServer::start(
            200,
            r#"{"status":"ok","message":"Server is running","model_loaded":true,"model_name":"gpt2"}"#,
        )
        .await;
        let (mut app, _) = test_app(&server.base_url, AppConfig::default());

        app.check_health();
        app.next_completion().await;
        assert_eq!(
            app.backend,
            BackendStatus::Ready {
                model_name: Some("gpt2".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_copy_places_content_on_clipboard() {
        let server = StubServer::start(200, r#"{"success":true,"content":"hello"}"#).await;
        let (mut app, clipboard) = test_app(&server.base_url, AppConfig::default());

        type_text(&mut app, "greet the world");
        app.handle_key(key(KeyCode::Enter));
        app.next_completion().await;

        app.handle_key(ctrl('y'));
        assert_eq!(clipboard.lock().unwrap().as_deref(), Some("hello"));
        assert_eq!(app.session.ui_phase(), UiPhase::Success);
    }

    #[tokio::test]
    async fn test_download_writes_into_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let server = StubServer::start(200, r#"{"success":true,"content":"saved text"}"#).await;
        let config = AppConfig {
            download_dir: Some(dir.path().to_path_buf()),
            filename_prefix: "draft".to_string(),
            ..Default::default()
        };
        let (mut app, _) = test_app(&server.base_url, config);

        type_text(&mut app, "something to save");
        app.handle_key(key(KeyCode::Enter));
        app.next_completion().await;
        app.handle_key(ctrl('s'));

        let files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("draft-blog-"));
        assert!(name.ends_with(".txt"));
        assert_eq!(std::fs::read_to_string(&files[0]).unwrap(), "saved text");
        assert_eq!(app.session.notice().map(|n| n.kind), Some(NoticeKind::Info));
    }

    #[test]
    fn test_default_mode_from_config() {
        let config = AppConfig {
            default_mode: "video".to_string(),
            ..Default::default()
        };
        let (app, _) = test_app("http://localhost:5000/api", config);
        assert_eq!(app.session.mode(), Mode::Video);

        let config = AppConfig {
            default_mode: "haiku".to_string(),
            ..Default::default()
        };
        let (app, _) = test_app("http://localhost:5000/api", config);
        assert_eq!(app.session.mode(), Mode::Blog);
    }

    #[test]
    fn test_editing_keys() {
        let (mut app, _) = test_app("http://localhost:5000/api", AppConfig::default());
        type_text(&mut app, "abc");
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.input, "ab");

        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        app.handle_paste("line\r\nnext");
        assert_eq!(app.input, "ab\nline\nnext");

        app.handle_key(ctrl('u'));
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_invalid_submit_does_not_spawn() {
        // no runtime here, so spawning would panic
        let (mut app, _) = test_app("http://localhost:5000/api", AppConfig::default());
        type_text(&mut app, "no");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session.ui_phase(), UiPhase::Error);
    }

    #[test]
    fn test_help_popup_and_quit() {
        let (mut app, _) = test_app("http://localhost:5000/api", AppConfig::default());
        app.handle_key(key(KeyCode::F(1)));
        assert_eq!(app.popup, Popup::Help);

        // typing is swallowed while help is open
        app.handle_key(key(KeyCode::Char('x')));
        assert!(app.input.is_empty());

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.popup, Popup::None);
        assert!(!app.should_quit);

        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }
}
