use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use esmon::config::{Settings, Timing};
use esmon::source::write_report;
use esmon::{events, ui, App, CacheSource, DataSource, FileSource, View};
use esmon_adapters::elasticsearch::ElasticsearchAdapter;
use esmon_adapters::host::HostCounterSource;
use esmon_engine::{Sampler, SystemCollectorConfig, Thresholds};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How often the TUI polls its source for a new report.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "esmon")]
#[command(version, about = "Read-only terminal dashboard for an Elasticsearch host and its cluster")]
struct Args {
    /// Elasticsearch node to watch (HOST or HOST:PORT)
    target: Option<String>,

    /// Full Elasticsearch URL, overrides TARGET
    #[arg(long, conflicts_with = "target")]
    url: Option<String>,

    /// Basic-auth user name
    #[arg(short, long)]
    username: Option<String>,

    /// Basic-auth password
    #[arg(short, long, env = "ESMON_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Sampling interval for both host and cluster (e.g., "2s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sample once, print a plain-text report and exit
    #[arg(long)]
    once: bool,

    /// Sample once, write the JSON report to FILE and exit
    #[arg(short, long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// View a previously exported report instead of sampling
    #[arg(long, value_name = "FILE", conflicts_with_all = ["once", "export"])]
    replay: Option<PathBuf>,

    /// Only monitor the local host
    #[arg(long)]
    no_cluster: bool,

    /// Write logs to FILE while the TUI is running
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn interactive(&self) -> bool {
        !self.once && self.export.is_none()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(ref url) = args.url {
        settings.elasticsearch.url = url.clone();
    } else if let Some(ref target) = args.target {
        settings.set_target(target);
    }
    if let Some(ref username) = args.username {
        settings.elasticsearch.username = Some(username.clone());
    }
    if let Some(ref password) = args.password {
        settings.elasticsearch.password = Some(password.clone());
    }
    if let Some(ref interval) = args.interval {
        settings.set_interval(interval);
    }

    let timing = settings.timing()?;
    let thresholds = settings.thresholds()?;

    if let Some(ref path) = args.replay {
        info!(path = %path.display(), "replaying exported report");
        let source = Box::new(FileSource::new(path));
        return run_tui(source, thresholds);
    }

    let collector_config = settings.collector_config()?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let mut sampler =
        build_sampler(&args, &settings, &timing, thresholds.clone(), collector_config)?;

    if args.once {
        let report = runtime.block_on(sampler.run_once(timing.system_interval));
        print!("{}", ui::text::render_report(&report));
        return Ok(());
    }

    if let Some(ref path) = args.export {
        let report = runtime.block_on(sampler.run_once(timing.system_interval));
        write_report(path, &report)?;
        println!("Exported report to: {}", path.display());
        return Ok(());
    }

    let cache = sampler.cache();
    let handle = {
        let _guard = runtime.enter();
        sampler.start()
    };
    info!(endpoint = %settings.elasticsearch.url, "sampler started");

    let target = if args.no_cluster {
        "local host"
    } else {
        settings.elasticsearch.url.as_str()
    };
    let source = Box::new(CacheSource::new(cache, target));
    let result = run_tui(source, thresholds);

    runtime.block_on(handle.shutdown());
    info!("sampler stopped");
    result
}

/// Logs go to stderr for one-shot runs, and to `--log-file` (or nowhere) for the TUI.
fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("esmon=info"));

    if !args.interactive() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr))
            .init();
        return Ok(());
    }

    if let Some(ref path) = args.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
            .init();
    }
    Ok(())
}

fn build_sampler(
    args: &Args,
    settings: &Settings,
    timing: &Timing,
    thresholds: Thresholds,
    collector_config: SystemCollectorConfig,
) -> Result<Sampler> {
    let mut builder = Sampler::builder()
        .system_source(HostCounterSource::new())
        .system_config(collector_config)
        .thresholds(thresholds)
        .system_interval(timing.system_interval)
        .cluster_interval(timing.cluster_interval)
        .request_deadline(timing.request_deadline);

    if !args.no_cluster {
        builder = builder.cluster_source(build_adapter(settings, timing.http_timeout)?);
    }
    Ok(builder.build())
}

fn build_adapter(settings: &Settings, timeout: Duration) -> Result<ElasticsearchAdapter> {
    let es = &settings.elasticsearch;
    let mut builder = ElasticsearchAdapter::builder().endpoint(es.url.as_str()).timeout(timeout);
    if let Some(ref username) = es.username {
        builder = builder.credentials(username.as_str(), es.password.as_deref().unwrap_or(""));
    }
    builder
        .build()
        .with_context(|| format!("Failed to create Elasticsearch client for {}", es.url))
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, thresholds: Thresholds) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, thresholds);
    let _ = app.reload_data();

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut last_poll = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Host => ui::host::render(frame, app, chunks[2]),
                View::Cluster => ui::cluster::render(frame, app, chunks[2]),
                View::Issues => ui::issues::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                // Content starts below header (row 0) and tabs (row 1)
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, 2),
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_poll.elapsed() >= POLL_INTERVAL {
            let _ = app.reload_data();
            last_poll = Instant::now();
        }
    }

    Ok(())
}
