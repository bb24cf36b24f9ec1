//! caretsync entrypoint: replays a recorded feed trace through the scroll
//! sync controller and prints the effects it emits.
use anyhow::{Context, Result};
use clap::Parser;
use core_config::load_from;
use core_events::telemetry_snapshot;
use core_sync::SyncOptions;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

mod replay;

const LOG_FILE_NAME: &str = "caretsync.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "caretsync", version, about = "Cursor-following scroll sync replay")]
struct Args {
    /// JSON-lines feed trace to replay; `-` reads stdin.
    pub trace: PathBuf,
    /// Optional configuration file path (overrides discovery of `caretsync.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Directory receiving `caretsync.log`.
    #[arg(long = "log-dir", default_value = ".")]
    pub log_dir: PathBuf,
    /// Drive the trace through the mailbox task instead of calling the controller directly.
    #[arg(long = "mailbox")]
    pub mailbox: bool,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn run(&mut self, args: &Args) -> Result<SyncOptions> {
        self.configure_logging(&args.log_dir)?;
        Self::install_panic_hook();

        info!(target: "runtime", "startup");
        let config = load_from(args.config.clone())?;
        let options = SyncOptions::from(&config);
        info!(
            target: "runtime.startup",
            trace = %args.trace.display(),
            config_override = args.config.is_some(),
            effective_safety_lines = options.safety_lines,
            header_inset = options.header_inset.as_str(),
            growth_tracking = options.growth_tracking,
            mailbox = args.mailbox,
            "bootstrap_complete"
        );
        Ok(options)
    }

    fn configure_logging(&mut self, log_dir: &Path) -> Result<()> {
        let log_path = log_dir.join(LOG_FILE_NAME);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global subscriber already installed; dropping the guard shuts the writer down.
            }
        }

        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

fn read_trace(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading trace from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading trace {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    let options = startup.run(&args)?;

    let input = read_trace(&args.trace)?;
    let events = replay::parse_trace(&input)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = if args.mailbox {
        replay::replay_mailbox(&events, options, &mut out).await?
    } else {
        replay::replay(&events, options, &mut out)?
    };

    let telemetry = telemetry_snapshot();
    info!(
        target: "runtime",
        events = summary.events,
        effects = summary.effects,
        dropped = summary.dropped,
        content_deduped = telemetry.content_deduped,
        growth_emits = telemetry.growth_emits,
        alignment_toggles = telemetry.alignment_toggles,
        "replay_complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn args_default_log_dir_to_cwd() {
        let args = Args::try_parse_from(["caretsync", "trace.jsonl"]).unwrap();
        assert_eq!(args.trace, PathBuf::from("trace.jsonl"));
        assert_eq!(args.log_dir, PathBuf::from("."));
        assert!(args.config.is_none());
        assert!(!args.mailbox);
    }

    #[test]
    fn args_accept_overrides() {
        let args = Args::try_parse_from([
            "caretsync",
            "--config",
            "custom.toml",
            "--log-dir",
            "logs",
            "--mailbox",
            "-",
        ])
        .unwrap();
        assert_eq!(args.trace, PathBuf::from("-"));
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(args.log_dir, PathBuf::from("logs"));
        assert!(args.mailbox);
    }

    #[test]
    fn read_trace_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_trace(&dir.path().join("absent.jsonl")).unwrap_err();
        assert!(err.to_string().contains("absent.jsonl"));
    }

    #[test]
    fn read_trace_loads_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"kind\":\"shutdown\"}}").unwrap();
        let text = read_trace(file.path()).unwrap();
        let events = replay::parse_trace(&text).unwrap();
        assert_eq!(events.len(), 1);
    }
}
