//! What is visible for a given session state
//!
//! Drawing reads only from [`View`], so each phase maps to exactly one set of
//! visible panels and re-entering a phase renders the same thing.

use crate::mode::Mode;
use crate::session::{Notice, Phase, Session};

#[derive(Debug, Clone, PartialEq)]
pub struct View<'a> {
    pub mode: Mode,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub description: &'static str,
    /// Output panel; `Some` only on success
    pub output: Option<&'a str>,
    pub output_chars: Option<usize>,
    /// Error panel; `Some` only on error
    pub error: Option<&'a str>,
    pub loading: bool,
    pub submit_enabled: bool,
    pub notice: Option<&'a Notice>,
}

impl<'a> View<'a> {
    pub fn of(session: &'a Session) -> Self {
        let info = session.mode_info();
        let (output, output_chars, error, loading) = match session.phase() {
            Phase::Idle => (None, None, None, false),
            Phase::Loading => (None, None, None, true),
            Phase::Success(generated) => (
                Some(generated.content.as_str()),
                Some(
                    generated
                        .output_length
                        .unwrap_or_else(|| generated.content.chars().count()),
                ),
                None,
                false,
            ),
            Phase::Error { message, .. } => (None, None, Some(message.as_str()), false),
        };

        Self {
            mode: session.mode(),
            label: info.label,
            placeholder: info.placeholder,
            description: info.description,
            output,
            output_chars,
            error,
            loading,
            submit_enabled: session.is_submit_enabled(),
            notice: session.notice(),
        }
    }
}
