//! Content-generation modes and their static display table

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of content types the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Blog,
    Email,
    Copy,
    Seo,
    Video,
    Summarize,
}

/// Label, placeholder and description shown for a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeInfo {
    pub label: &'static str,
    pub placeholder: &'static str,
    pub description: &'static str,
}

impl Mode {
    /// Display order of the mode tabs
    pub const ALL: [Mode; 6] = [
        Mode::Blog,
        Mode::Email,
        Mode::Copy,
        Mode::Seo,
        Mode::Video,
        Mode::Summarize,
    ];

    /// Wire name, also used in exported filenames
    pub fn name(self) -> &'static str {
        match self {
            Mode::Blog => "blog",
            Mode::Email => "email",
            Mode::Copy => "copy",
            Mode::Seo => "seo",
            Mode::Video => "video",
            Mode::Summarize => "summarize",
        }
    }

    pub fn info(self) -> ModeInfo {
        match self {
            Mode::Blog => ModeInfo {
                label: "Blog Topic",
                placeholder: "Enter your blog topic, e.g. 'The future of remote work'",
                description: "Comprehensive blog posts with introduction, body, and conclusion",
            },
            Mode::Email => ModeInfo {
                label: "Email Purpose",
                placeholder: "Describe the email, e.g. 'Follow up with a client after a meeting'",
                description: "Professional emails with proper structure and formatting",
            },
            Mode::Copy => ModeInfo {
                label: "Product or Service",
                placeholder: "Describe what you're selling, e.g. 'Eco-friendly water bottles'",
                description: "Persuasive marketing copy with a strong call-to-action",
            },
            Mode::Seo => ModeInfo {
                label: "Keywords or Topic",
                placeholder: "Enter keywords, e.g. 'best hiking trails, outdoor adventure'",
                description: "SEO-optimized content with relevant keywords",
            },
            Mode::Video => ModeInfo {
                label: "Video Topic",
                placeholder: "What is the video about? e.g. 'How to start a vegetable garden'",
                description: "Engaging video scripts with hooks and CTAs",
            },
            Mode::Summarize => ModeInfo {
                label: "Text to Summarize",
                placeholder: "Paste the text you want summarized...",
                description: "Concise summaries of longer text",
            },
        }
    }

    /// Look up a mode by wire name. Unknown names fall back to [`Mode::Blog`].
    pub fn from_name(name: &str) -> Mode {
        let name = name.trim();
        Mode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
            .unwrap_or_else(|| {
                tracing::warn!("Unknown mode '{}', falling back to blog", name);
                Mode::default()
            })
    }

    pub fn next(self) -> Mode {
        let idx = self.index();
        Mode::ALL[(idx + 1) % Mode::ALL.len()]
    }

    pub fn previous(self) -> Mode {
        let idx = self.index();
        Mode::ALL[idx.checked_sub(1).unwrap_or(Mode::ALL.len() - 1)]
    }

    pub fn index(self) -> usize {
        Mode::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_known_modes() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_name(mode.name()), mode);
        }
        assert_eq!(Mode::from_name(" SEO "), Mode::Seo);
    }

    #[test]
    fn test_unknown_name_falls_back_to_blog() {
        assert_eq!(Mode::from_name("poetry"), Mode::Blog);
        assert_eq!(Mode::from_name(""), Mode::Blog);
        assert_eq!(Mode::from_name("content").info(), Mode::Blog.info());
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(Mode::Summarize.next(), Mode::Blog);
        assert_eq!(Mode::Blog.previous(), Mode::Summarize);
        assert_eq!(Mode::Email.next().previous(), Mode::Email);
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Summarize).unwrap(), "\"summarize\"");
        let mode: Mode = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(mode, Mode::Video);
    }

    #[test]
    fn test_every_mode_has_distinct_placeholder() {
        let mut seen = std::collections::HashSet::new();
        for mode in Mode::ALL {
            assert!(seen.insert(mode.info().placeholder));
        }
    }
}
