mod api;
mod app;
mod config;
mod export;
mod mode;
mod session;
mod theme;
mod ui;
mod validate;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::ApiClient;
use app::App;
use config::AppConfig;
use export::SystemClipboard;
use mode::Mode;
use theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "scrivener")]
#[command(version)]
#[command(about = "A terminal front end for an AI content-generation API")]
struct Args {
    /// Base URL of the generation API (overrides the config file)
    #[arg(short, long, value_name = "URL")]
    endpoint: Option<String>,

    /// Content mode: blog, email, copy, seo, video or summarize
    #[arg(short, long)]
    mode: Option<String>,

    /// Print backend health as JSON and exit
    #[arg(long)]
    health: bool,

    /// Print information about the loaded model as JSON and exit
    #[arg(long)]
    model_info: bool,

    /// Generate content for TEXT ("-" reads stdin), print it and exit
    #[arg(short, long, value_name = "TEXT")]
    generate: Option<String>,

    /// With --generate, also save the result as a .txt file
    #[arg(long, requires = "generate")]
    save: bool,

    /// Register a named template with the backend
    #[arg(long, value_name = "NAME", requires = "template_file")]
    create_template: Option<String>,

    /// File holding the template body for --create-template
    #[arg(long, value_name = "PATH", requires = "create_template")]
    template_file: Option<PathBuf>,
}

impl Args {
    fn is_interactive(&self) -> bool {
        !(self.health
            || self.model_info
            || self.generate.is_some()
            || self.create_template.is_some())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.is_interactive());

    let mut config = AppConfig::load()?;
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(mode) = &args.mode {
        config.default_mode = mode.clone();
    }
    config.validate()?;

    let api = ApiClient::new(&config.endpoint)?.with_params(config.generation_params());

    // Handle CLI-only commands
    if args.health {
        return print_health(&api).await;
    }

    if args.model_info {
        return print_model_info(&api).await;
    }

    if let Some(text) = &args.generate {
        return generate_once(&api, &config, text, args.save).await;
    }

    if let (Some(name), Some(path)) = (&args.create_template, &args.template_file) {
        return create_template(&api, name, path).await;
    }

    // Run TUI
    run_tui(config, api)
}

/// TUI sessions log to a file so output never lands on the screen;
/// one-shot commands log to stderr.
fn init_logging(interactive: bool) {
    if !interactive {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
        return;
    }

    let Some(file) = open_log_file() else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scrivener=info"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

fn open_log_file() -> Option<std::fs::File> {
    let dir = dirs::cache_dir()?.join("scrivener");
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("scrivener.log"))
        .ok()
}

async fn print_health(api: &ApiClient) -> Result<()> {
    let health = api.health().await?;
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}

async fn print_model_info(api: &ApiClient) -> Result<()> {
    let info = api.model_info().await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

async fn generate_once(api: &ApiClient, config: &AppConfig, text: &str, save: bool) -> Result<()> {
    let text = if text == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read input from stdin")?;
        buf
    } else {
        text.to_string()
    };

    let mode = Mode::from_name(&config.default_mode);
    let input = validate::validate_input(&text)?;
    let generated = api.generate(input, mode).await?;
    println!("{}", generated.content);

    if save {
        let path = export::download_as_file(
            &config.download_dir(),
            &config.filename_prefix,
            mode,
            &generated.content,
            Utc::now(),
        )?;
        eprintln!("Saved to {}", path.display());
    }
    Ok(())
}

async fn create_template(api: &ApiClient, name: &str, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    if content.trim().is_empty() {
        anyhow::bail!("Template {} is empty", path.display());
    }

    let created = api.create_template(name, &content).await?;
    println!("{} ({})", created.message, created.template.name);
    Ok(())
}

fn run_tui(config: AppConfig, api: ApiClient) -> Result<()> {
    ui::init_theme(Theme::from_config(&config.theme));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, api, Box::new(SystemClipboard));
    app.check_health();

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }
                    app.handle_key(key);
                }
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }

        // Apply finished requests and expire messages
        app.tick();
    }
}
