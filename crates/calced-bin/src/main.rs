//! calced entrypoint: a line-oriented console over the editor runtime.
mod command;
mod view;

use anyhow::{Context, Result};
use clap::Parser;
use command::LineCommand;
use core_config::load_from;
use core_editor::{EditorCommand, EditorHandle, EditorRuntime, EditorSettings};
use core_events::EditorEvent;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Once};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use view::{ConsoleSelection, ConsoleView};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "calced", version, about = "Calculator expression editor")]
struct Args {
    /// Optional configuration file path (overrides discovery of `calced.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Initial expression; the cursor starts at its end.
    #[arg(long = "expr")]
    pub expr: Option<String>,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    /// `RUST_LOG` wins; otherwise the configured filter applies.
    fn configure_logging(&mut self, fallback_filter: &str) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("calced.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(fallback_filter))
            .with_context(|| format!("invalid log filter `{fallback_filter}`"))?;
        let file_appender = tracing_appender::rolling::never(log_dir, "calced.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(nb_writer)
            .with_ansi(false)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global tracing subscriber already installed; drop guard so writer shuts down.
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    CommandQuit,
    EndOfInput,
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::CommandQuit => "command_quit",
            ShutdownReason::EndOfInput => "end_of_input",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn log_shutdown_stage(reason: ShutdownReason, stage: &'static str) {
    info!(
        target: "runtime.shutdown",
        reason = reason.as_str(),
        stage = stage,
        "shutdown_stage"
    );
}

/// Stdin loop state: the handle into the owner thread, the event stream, and
/// the selection the console view reports.
struct Session {
    handle: EditorHandle,
    events: UnboundedReceiver<EditorEvent>,
    selection: Arc<ConsoleSelection>,
    config_path: Option<PathBuf>,
}

impl Session {
    fn seed(&self, expr: &str) -> Result<()> {
        self.handle.send(EditorCommand::SetText {
            text: expr.to_string(),
            selection: Some(expr.chars().count()),
        })?;
        Ok(())
    }

    fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<ShutdownReason> {
        for line in input.lines() {
            let line = line.context("reading stdin")?;
            let command = match LineCommand::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    writeln!(out, "error: {e:#}")?;
                    continue;
                }
            };
            if command == LineCommand::Quit {
                return Ok(ShutdownReason::CommandQuit);
            }
            self.apply(&command)?;
            self.print(out)?;
        }
        Ok(ShutdownReason::EndOfInput)
    }

    fn apply(&mut self, command: &LineCommand) -> Result<()> {
        if let Some(editor_command) = command.to_editor() {
            self.handle.send(editor_command)?;
            return Ok(());
        }
        match command {
            LineCommand::Select { start, end } => self.selection.select(*start, *end),
            LineCommand::Reload => {
                let config = load_from(self.config_path.clone())?;
                info!(target: "runtime", path = ?config.path, "config_reloaded");
                self.handle.reconfigure(EditorSettings::from(&config))?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Settled state, then every event published so far. The reply waits for
    /// any pending formatting pass, so its `ChangedEvent` is already queued.
    fn print<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let state = self.handle.blocking_settled_state()?;
        writeln!(out, "{state}")?;
        while let Ok(event) = self.events.try_recv() {
            writeln!(out, "  {}", describe(&event))?;
        }
        Ok(())
    }
}

fn describe(event: &EditorEvent) -> String {
    match event {
        EditorEvent::Changed(changed) => {
            let forced = if changed.force { " (forced)" } else { "" };
            format!("changed {} -> {}{forced}", changed.old, changed.new)
        }
        EditorEvent::CursorMoved(moved) => format!("cursor {}", moved.state),
    }
}

fn spawn_runtime(
    settings: EditorSettings,
    selection: Arc<ConsoleSelection>,
) -> Result<EditorRuntime> {
    let runtime = EditorRuntime::spawn(settings, move |editor| {
        editor.set_view(Rc::new(ConsoleView::new(selection)));
    })?;
    Ok(runtime)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_from(args.config.clone())?;

    let mut startup = AppStartup::new();
    startup.configure_logging(config.log_filter())?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");
    info!(
        target: "runtime.startup",
        config_path = ?config.path,
        config_override = args.config.is_some(),
        seeded = args.expr.is_some(),
        "bootstrap_complete"
    );

    let selection = Arc::new(ConsoleSelection::default());
    let mut runtime = spawn_runtime(EditorSettings::from(&config), selection.clone())?;
    let events = runtime
        .take_events()
        .context("editor event receiver already taken")?;
    let mut session = Session {
        handle: runtime.handle(),
        events,
        selection,
        config_path: args.config,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Some(expr) = args.expr.as_deref() {
        session.seed(expr)?;
        session.print(&mut out)?;
    }
    let reason = session.run(io::stdin().lock(), &mut out)?;

    log_shutdown_stage(reason, "begin");
    if let Err(e) = runtime.shutdown() {
        warn!(target: "runtime.shutdown", %e, "editor_shutdown_failed");
    }
    log_shutdown_stage(reason, "complete");
    Ok(())
}
