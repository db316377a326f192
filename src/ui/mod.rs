mod components;
pub mod view;

use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, BackendStatus, Popup};
use crate::mode::Mode;
use crate::session::NoticeKind;
use crate::theme::Theme;
use crate::validate::MAX_INPUT_CHARS;
use components::{centered_rect, panel, spinner};
use view::View;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme before the first draw; later calls are ignored
pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

fn accent() -> Color { theme().accent }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn inactive() -> Color { theme().inactive }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let view = View::of(&app.session);

    // Input box grows with the terminal but keeps room for output
    let input_height = if area.height < 24 { 5 } else { 8 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // Header
            Constraint::Length(1),            // Mode tabs
            Constraint::Length(1),            // Mode description
            Constraint::Length(input_height), // Input
            Constraint::Min(3),               // Output / error / loading
            Constraint::Length(1),            // Status line
            Constraint::Length(1),            // Footer
        ])
        .split(area);

    draw_header(f, app, chunks[0]);
    draw_tabs(f, &view, chunks[1]);
    draw_description(f, &view, chunks[2]);
    draw_input(f, app, &view, chunks[3]);
    draw_result(f, app, &view, chunks[4]);
    draw_status_line(f, &view, chunks[5]);
    draw_footer(f, &view, chunks[6]);

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let (icon, status, color) = match &app.backend {
        BackendStatus::Checking => ("○", "checking…".to_string(), text_dim()),
        BackendStatus::Ready { model_name } => (
            "●",
            format!("online · {}", model_name.as_deref().unwrap_or("model ready")),
            success(),
        ),
        BackendStatus::ModelLoading => ("◐", "model loading".to_string(), warning()),
        BackendStatus::Unhealthy => ("●", "unhealthy".to_string(), warning()),
        BackendStatus::Offline => ("●", "offline".to_string(), danger()),
    };

    let line = Line::from(vec![
        Span::styled(" scrivener ", Style::default().fg(accent()).add_modifier(Modifier::BOLD)),
        Span::styled(app.endpoint(), Style::default().fg(text_dim())),
        Span::styled("  ", Style::default()),
        Span::styled(icon, Style::default().fg(color)),
        Span::styled(format!(" {}", status), Style::default().fg(color)),
    ]);

    f.render_widget(Paragraph::new(line), area);
}

fn draw_tabs(f: &mut Frame, view: &View, area: Rect) {
    let titles: Vec<Line> = Mode::ALL
        .iter()
        .map(|m| Line::from(format!(" {} ", m.name())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(view.mode.index())
        .style(Style::default().fg(text_dim()))
        .highlight_style(Style::default().fg(accent()).add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .divider(Span::styled("│", Style::default().fg(inactive())));

    f.render_widget(tabs, area);
}

fn draw_description(f: &mut Frame, view: &View, area: Rect) {
    let line = Line::from(Span::styled(
        format!(" {}", view.description),
        Style::default().fg(text_dim()),
    ));
    f.render_widget(Paragraph::new(line), area);
}

fn draw_input(f: &mut Frame, app: &App, view: &View, area: Rect) {
    let count = app.input.trim().chars().count();
    let count_color = if count > MAX_INPUT_CHARS { danger() } else { text_dim() };

    let border = if view.submit_enabled { accent() } else { inactive() };
    let block = panel(view.label, border, view.submit_enabled).title_bottom(
        Line::from(Span::styled(
            format!(" {}/{} ", count, MAX_INPUT_CHARS),
            Style::default().fg(count_color),
        ))
        .right_aligned(),
    );

    let content = if app.input.is_empty() {
        Paragraph::new(Span::styled(view.placeholder, Style::default().fg(text_dim())))
    } else {
        let cursor = if view.submit_enabled { "█" } else { "" };
        Paragraph::new(format!("{}{}", app.input, cursor)).style(Style::default().fg(text()))
    };

    f.render_widget(content.wrap(Wrap { trim: false }).block(block), area);
}

fn draw_result(f: &mut Frame, app: &App, view: &View, area: Rect) {
    if let Some(message) = view.error {
        let error = Paragraph::new(Line::from(vec![
            Span::styled("✗ ", Style::default().fg(danger())),
            Span::styled(message, Style::default().fg(danger())),
        ]))
        .wrap(Wrap { trim: false })
        .block(panel("Error", danger(), true));
        f.render_widget(error, area);
    } else if let Some(content) = view.output {
        let title = match view.output_chars {
            Some(n) => format!("Generated {} · {} chars", view.mode, n),
            None => format!("Generated {}", view.mode),
        };
        let output = Paragraph::new(content)
            .style(Style::default().fg(text()))
            .wrap(Wrap { trim: false })
            .scroll((app.output_scroll, 0))
            .block(panel(&title, success(), true));
        f.render_widget(output, area);
    } else if view.loading {
        let loading = Paragraph::new(Line::from(vec![
            Span::styled(spinner(app.spinner_frame), Style::default().fg(warning())),
            Span::styled(" Generating content…", Style::default().fg(text())),
        ]))
        .alignment(Alignment::Center)
        .block(panel("Working", inactive(), false));
        f.render_widget(loading, area);
    } else {
        let idle = Paragraph::new(Span::styled(
            "Type your prompt above and press Enter to generate",
            Style::default().fg(text_dim()),
        ))
        .alignment(Alignment::Center)
        .block(panel("Output", inactive(), false));
        f.render_widget(idle, area);
    }
}

fn draw_status_line(f: &mut Frame, view: &View, area: Rect) {
    let line = match view.notice {
        Some(notice) => {
            let (icon, color) = match notice.kind {
                NoticeKind::Info => ("✓ ", success()),
                NoticeKind::Warning => ("⚠ ", warning()),
                NoticeKind::Error => ("✗ ", danger()),
            };
            Line::from(vec![
                Span::styled(icon, Style::default().fg(color)),
                Span::styled(notice.text.as_str(), Style::default().fg(color)),
            ])
        }
        None if view.loading => Line::from(Span::styled("Waiting for the server…", Style::default().fg(text_dim()))),
        None => Line::from(Span::styled("Ready", Style::default().fg(text_dim()))),
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_footer(f: &mut Frame, view: &View, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(accent()));
    let hint = |h: &'static str| Span::styled(h, Style::default().fg(text_dim()));

    let mut spans = vec![key(" Tab"), hint(" mode  ")];
    if view.submit_enabled {
        spans.extend([key("Enter"), hint(" generate  ")]);
    }
    if view.output.is_some() {
        spans.extend([key("^Y"), hint(" copy  "), key("^S"), hint(" save  ")]);
    }
    spans.extend([key("F1"), hint(" help  "), key("Esc"), hint(" quit")]);

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(accent()).add_modifier(Modifier::BOLD)))
    };
    let entry = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", keys), Style::default().fg(accent())),
            Span::styled(what, Style::default().fg(text())),
        ])
    };

    let help_text = vec![
        section("═══ Modes ═══"),
        entry("Tab", "Next mode (blog → email → copy → seo → video → summarize)"),
        entry("Shift+Tab", "Previous mode"),
        Line::from(""),
        section("═══ Input ═══"),
        entry("Enter", "Generate"),
        entry("Alt+Enter", "New line"),
        entry("Ctrl+U", "Clear input"),
        Line::from(""),
        section("═══ Output ═══"),
        entry("Ctrl+Y", "Copy to clipboard"),
        entry("Ctrl+S", "Save as .txt"),
        entry("PgUp/PgDn", "Scroll"),
        Line::from(""),
        section("═══ Other ═══"),
        entry("Ctrl+R", "Re-check server"),
        entry("Esc", "Quit"),
        Line::from(""),
        Line::from(Span::styled("  Press Esc to close", Style::default().fg(text_dim()))),
    ];

    let help = Paragraph::new(help_text)
        .block(panel("Help", accent(), true))
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}
