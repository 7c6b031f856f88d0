//! Terminal frontend for the Ethnosphere bot core.
//!
//! Renders each screen as text plus a numbered button list and reads
//! choices from stdin. The same [`App`] layer would sit behind any
//! other transport.

mod app;

use app::{Action, App};
use ethno_core::{Engine, EngineConfig};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::{Duration, Instant};

const HELP: &str = "\
ethno - Ethnosphere cultural heritage bot (terminal frontend)

USAGE:
    ethno [--help]

ENVIRONMENT:
    ETHNO_DATA_DIR      content store root (default: regionals)
    ETHNO_LOCALE_FILE   entity display-name table (default: nationals.toml)
    ETHNO_PAGE_SIZE     buttons per list page (default: 4)
    RUST_LOG            log filter (default: info)
";

/// Sessions idle longer than this are dropped on the next sweep.
const SESSION_MAX_IDLE: Duration = Duration::from_secs(60 * 60);
const EVICTION_INTERVAL: Duration = Duration::from_secs(60 * 5);

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if std::env::args().any(|a| a == "--help" || a == "-h") {
        print!("{HELP}");
        return;
    }

    let engine = match build_engine() {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("failed to start: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(App::new(engine)) {
        log::error!("terminal i/o error: {e}");
        std::process::exit(1);
    }
}

fn build_engine() -> Result<Engine, ethno_core::LocaleError> {
    let data_dir = std::env::var("ETHNO_DATA_DIR").unwrap_or_else(|_| "regionals".to_string());
    let locale_file =
        std::env::var("ETHNO_LOCALE_FILE").unwrap_or_else(|_| "nationals.toml".to_string());

    let mut config = EngineConfig::new(&data_dir);
    if Path::new(&locale_file).exists() {
        config = config.with_locale_file(&locale_file);
    } else {
        log::warn!("locale file {locale_file} not found, entity ids shown as-is");
    }
    if let Ok(raw) = std::env::var("ETHNO_PAGE_SIZE") {
        match raw.parse::<usize>() {
            Ok(n) => config = config.with_items_per_page(n),
            Err(_) => log::warn!("ignoring invalid ETHNO_PAGE_SIZE: {raw}"),
        }
    }

    log::info!("content root: {data_dir}");
    Engine::new(config)
}

fn run(mut app: App) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut screen = app.start();
    let mut last_sweep = Instant::now();

    loop {
        render(&screen)?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        screen = match input.parse::<usize>() {
            Ok(n) if n >= 1 && n <= screen.buttons.len() => {
                let action = screen.buttons[n - 1].1.clone();
                if action == Action::Quit {
                    render(&app.dispatch(action))?;
                    break;
                }
                app.dispatch(action)
            }
            Ok(_) => screen,
            Err(_) => app.handle_text(input),
        };

        if last_sweep.elapsed() >= EVICTION_INTERVAL {
            let evicted = app.engine().evict_idle_sessions(SESSION_MAX_IDLE);
            if evicted > 0 {
                log::info!("evicted {evicted} idle sessions");
            }
            last_sweep = Instant::now();
        }
    }
    Ok(())
}

fn render(screen: &app::ScreenView) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "\n{}", screen.text)?;
    for (i, (label, _)) in screen.buttons.iter().enumerate() {
        writeln!(out, "  {}. {label}", i + 1)?;
    }
    if !screen.buttons.is_empty() {
        write!(out, "> ")?;
    }
    out.flush()
}
