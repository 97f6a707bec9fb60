use anyhow::Context;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dayplanner::config::{Config, LOG_FILE};
use dayplanner::maintenance::run_daily_maintenance;
use dayplanner::ui::{run_app, App};
use dayplanner::{storage, Clock, SystemClock};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs, io};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create {}", config.data_dir.display()))?;

    // stdout belongs to the terminal UI, so logs go to a file
    let appender = tracing_appender::rolling::never(&config.data_dir, LOG_FILE);
    let (writer, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let clock = SystemClock;
    let store_path = config.store_path();
    let guard_path = config.guard_path();

    let mut planner = storage::load_or_seed(&store_path, &clock);
    let mut guard = storage::load_guard(&guard_path);
    let report = run_daily_maintenance(&mut planner, &mut guard, &clock);
    if report.is_some() {
        storage::save(&store_path, &planner).context("failed to save store")?;
        storage::save_guard(&guard_path, &guard).context("failed to save maintenance marker")?;
    }

    let mut app = App::new(planner, store_path.clone(), Box::new(clock));
    if let Some(report) = report {
        app.set_message(format!(
            "Moved {} task(s) to today, generated {} recurring",
            report.rolled_over, report.generated
        ));
    }
    info!(today = %clock.today(), "starting board");

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    storage::save(&store_path, &app.planner).context("failed to save store")?;

    if let Err(err) = result {
        error!(%err, "board exited with an error");
        eprintln!("{:?}", err);
    }
    Ok(())
}
