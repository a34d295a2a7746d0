use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use vidspark_core::request::{GOALS, MOODS, PEOPLE};
use vidspark_core::{
    reduce, to_plain_text, Config, HttpBackend, IdeaBackend, IdeaForm, Language, Outcome,
    Platform, Session,
};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "vidspark")]
#[command(about = "Generate and refine short-form video ideas for your business")]
struct Cli {
    /// Backend address, overrides the config file
    #[arg(long, env = "VIDSPARK_URL", global = true)]
    base_url: Option<String>,

    /// Account to log in with, overrides the config file
    #[arg(long, env = "VIDSPARK_USER", global = true)]
    username: Option<String>,

    /// Password for the account
    #[arg(long, env = "VIDSPARK_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an idea and print it
    Generate {
        /// What the business does, e.g. "small chops"
        #[arg(short, long)]
        business: String,
        #[arg(short, long, value_parser = parse_platform)]
        platform: Option<Platform>,
        #[arg(short, long, default_value = MOODS[0])]
        mood: String,
        #[arg(short, long, default_value = GOALS[0])]
        goal: String,
        #[arg(long, default_value = PEOPLE[0])]
        people: String,
        #[arg(short, long, value_parser = parse_language)]
        language: Option<Language>,
        /// Follow-up instruction, applied in order to the latest idea
        #[arg(short, long)]
        refine: Vec<String>,
    },
    /// Print the account's plan
    Status,
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    Platform::from_str(s).ok_or_else(|| {
        let names: Vec<&str> = Platform::all().iter().map(|p| p.as_str()).collect();
        format!("unknown platform '{}', expected one of: {}", s, names.join(", "))
    })
}

fn parse_language(s: &str) -> Result<Language, String> {
    Language::from_str(s).ok_or_else(|| {
        let names: Vec<&str> = Language::all().iter().map(|l| l.as_str()).collect();
        format!("unknown language '{}', expected one of: {}", s, names.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable config: {e}");
        Config::new()
    });
    if let Some(base_url) = cli.base_url.clone() {
        config.base_url = base_url;
    }
    if let Some(username) = cli.username.clone() {
        config.username = Some(username);
    }

    let backend =
        HttpBackend::with_timeout(&config.base_url, Duration::from_secs(config.timeout_secs))
            .context("failed to build HTTP client")?;

    match cli.command {
        None => run_tui(config, backend, cli.password.as_deref()).await,
        Some(command) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "warn".into()),
                )
                .with_writer(std::io::stderr)
                .init();

            if let Some(username) = &config.username {
                login(&backend, username, cli.password.as_deref()).await?;
            }
            run_command(command, &config, &backend).await
        }
    }
}

async fn login(backend: &HttpBackend, username: &str, password: Option<&str>) -> Result<()> {
    let Some(password) = password else {
        bail!("no password for '{username}', set --password or VIDSPARK_PASSWORD");
    };
    backend
        .login(username, password)
        .await
        .with_context(|| format!("login as '{username}' failed"))
}

async fn run_command(command: Commands, config: &Config, backend: &HttpBackend) -> Result<()> {
    match command {
        Commands::Generate {
            business,
            platform,
            mood,
            goal,
            people,
            language,
            refine,
        } => {
            let form = IdeaForm {
                business_type: business,
                platform: platform.unwrap_or(config.default_platform),
                mood,
                goal,
                people,
                language: language.unwrap_or(config.default_language),
            };

            let mut session = Session::new();
            expect_idea(session.generate(backend, &form).await)?;
            for instruction in &refine {
                expect_idea(session.refine(backend, &form, instruction).await)?;
            }
            println!("{}", to_plain_text(session.blocks()));
        }
        Commands::Status => {
            let status = backend.status().await.context("failed to fetch status")?;
            println!("{}", reduce(&status).label());
        }
    }
    Ok(())
}

fn expect_idea(outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Idea(_) | Outcome::Ignored => Ok(()),
        Outcome::Notice(notice) => bail!("{}: {}", notice.title(), notice.text()),
    }
}

fn init_file_logging() -> Result<()> {
    let log_dir = Config::config_dir()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory '{}'", log_dir.display()))?;
    let log_path = log_dir.join("vidspark.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file '{}'", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();

    Ok(())
}

async fn run_tui(config: Config, backend: HttpBackend, password: Option<&str>) -> Result<()> {
    // The terminal is owned by the UI, so logs go to a file
    if let Err(e) = init_file_logging() {
        eprintln!("File logging disabled: {e:#}");
    }
    info!(base_url = %backend.base_url(), "starting");

    if let Some(username) = &config.username {
        if let Err(e) = login(&backend, username, password).await {
            warn!(error = %format!("{e:#}"), "continuing without a session");
        }
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(&config, backend, events.sender());
    app.start_status_fetch();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event)?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}
