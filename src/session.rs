//! Session state and its transitions
//!
//! `Session::update` is the only place the session changes. It takes a
//! message plus the current time and returns the side effects the caller
//! must perform (network call, clipboard, file). Results of those effects
//! come back in as further messages, so every transition can be tested
//! without a terminal, a network or a clock.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::api::{Generated, GenerationResult};
use crate::export::ExportError;
use crate::mode::{Mode, ModeInfo};
use crate::validate::validate_input;

/// How long an error panel stays up
pub const ERROR_DISMISS_AFTER: Duration = Duration::from_millis(5000);

/// How long a notice stays in the status line
pub const NOTICE_DISMISS_AFTER: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Loading,
    Success(Generated),
    Error { message: String, raised_at: Instant },
}

/// Payload-free view of [`Phase`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiPhase {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// Transient message that does not affect the phase
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub shown_at: Instant,
}

#[derive(Debug)]
pub enum Msg {
    SelectMode(Mode),
    /// Mode given by name, e.g. from config or the command line
    SelectModeByName(String),
    Submit(String),
    Generated(GenerationResult),
    Copy,
    Download,
    Copied(Result<(), ExportError>),
    Downloaded(Result<PathBuf, ExportError>),
    Notify(NoticeKind, String),
    Tick,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Generate { input: String, mode: Mode },
    CopyToClipboard(String),
    Download { mode: Mode, content: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    mode: Mode,
    phase: Phase,
    notice: Option<Notice>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            phase: Phase::Idle,
            notice: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn mode_info(&self) -> ModeInfo {
        self.mode.info()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn ui_phase(&self) -> UiPhase {
        match self.phase {
            Phase::Idle => UiPhase::Idle,
            Phase::Loading => UiPhase::Loading,
            Phase::Success(_) => UiPhase::Success,
            Phase::Error { .. } => UiPhase::Error,
        }
    }

    /// Content of the last successful generation; `Some` only in the success phase
    pub fn last_generated_content(&self) -> Option<&str> {
        match &self.phase {
            Phase::Success(generated) => Some(&generated.content),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_submit_enabled(&self) -> bool {
        !matches!(self.phase, Phase::Loading)
    }

    pub fn update(&mut self, msg: Msg, now: Instant) -> Vec<Effect> {
        match msg {
            Msg::SelectMode(mode) => {
                self.select_mode(mode);
                Vec::new()
            }
            Msg::SelectModeByName(name) => {
                self.select_mode(Mode::from_name(&name));
                Vec::new()
            }
            Msg::Submit(input) => self.submit(&input, now),
            Msg::Generated(result) => {
                self.finish_generation(result, now);
                Vec::new()
            }
            Msg::Copy => match self.last_generated_content() {
                Some(content) => vec![Effect::CopyToClipboard(content.to_string())],
                None => {
                    self.notify(NoticeKind::Error, ExportError::NothingToExport.to_string(), now);
                    Vec::new()
                }
            },
            Msg::Download => match self.last_generated_content() {
                Some(content) => vec![Effect::Download {
                    mode: self.mode,
                    content: content.to_string(),
                }],
                None => {
                    self.notify(NoticeKind::Error, ExportError::NothingToExport.to_string(), now);
                    Vec::new()
                }
            },
            Msg::Copied(result) => {
                match result {
                    Ok(()) => self.notify(NoticeKind::Info, "Copied to clipboard!", now),
                    Err(e) => {
                        tracing::warn!("Copy failed: {}", e);
                        self.notify(NoticeKind::Error, e.to_string(), now);
                    }
                }
                Vec::new()
            }
            Msg::Downloaded(result) => {
                match result {
                    Ok(path) => {
                        self.notify(NoticeKind::Info, format!("Saved to {}", path.display()), now)
                    }
                    Err(e) => {
                        tracing::warn!("Download failed: {}", e);
                        self.notify(NoticeKind::Error, e.to_string(), now);
                    }
                }
                Vec::new()
            }
            Msg::Notify(kind, text) => {
                self.notify(kind, text, now);
                Vec::new()
            }
            Msg::Tick => {
                self.expire(now);
                Vec::new()
            }
        }
    }

    /// Clears output, error and notice. A request in flight stays in flight.
    fn select_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.notice = None;
        if !matches!(self.phase, Phase::Loading) {
            self.phase = Phase::Idle;
        }
    }

    fn submit(&mut self, input: &str, now: Instant) -> Vec<Effect> {
        if matches!(self.phase, Phase::Loading) {
            tracing::debug!("Ignoring submit while a request is in flight");
            return Vec::new();
        }

        match validate_input(input) {
            Ok(text) => {
                self.phase = Phase::Loading;
                self.notice = None;
                vec![Effect::Generate {
                    input: text.to_string(),
                    mode: self.mode,
                }]
            }
            Err(e) => {
                self.fail(e.to_string(), now);
                Vec::new()
            }
        }
    }

    fn finish_generation(&mut self, result: GenerationResult, now: Instant) {
        if !matches!(self.phase, Phase::Loading) {
            tracing::debug!("Dropping generation result with no request in flight");
            return;
        }

        match result {
            Ok(generated) => self.phase = Phase::Success(generated),
            Err(e) => {
                tracing::warn!("Generation failed: {}", e);
                self.fail(e.to_string(), now);
            }
        }
    }

    fn fail(&mut self, message: String, now: Instant) {
        self.phase = Phase::Error {
            message,
            raised_at: now,
        };
    }

    fn notify(&mut self, kind: NoticeKind, text: impl Into<String>, now: Instant) {
        self.notice = Some(Notice {
            kind,
            text: text.into(),
            shown_at: now,
        });
    }

    fn expire(&mut self, now: Instant) {
        if let Phase::Error { raised_at, .. } = self.phase {
            if now.saturating_duration_since(raised_at) >= ERROR_DISMISS_AFTER {
                self.phase = Phase::Idle;
            }
        }
        if let Some(notice) = &self.notice {
            if now.saturating_duration_since(notice.shown_at) >= NOTICE_DISMISS_AFTER {
                self.notice = None;
            }
        }
    }
}
