//! keycode-collector entry point.
//!
//! Parses the command line, loads the TOML configuration, sets up logging
//! and the Ctrl-C flag, and runs the selected command on a blocking worker
//! thread.
//!
//! # Usage
//!
//! ```text
//! keycode-collector [OPTIONS] [COMMAND]
//!
//! Commands:
//!   collect  Discover key codes interactively and print the mapping (default)
//!   type     Type text using a previously printed mapping
//!   key      Tap a named key (escape, tab, enter, backspace)
//!
//! Options:
//!   --config <FILE>        Configuration file [env: KEYCODE_COLLECTOR_CONFIG]
//!   --backend <BACKEND>    dry-run | enigo [default: dry-run]
//!   --before-ms <MS>       Pause before each key press
//!   --down-ms <MS>         How long each key is held
//!   --after-ms <MS>        Pause after each key release
//!   --no-startup-delay     Skip the platform startup delay
//! ```
//!
//! # Streams (for beginners)
//!
//! Prompts and log lines go to **stderr**; the mapping JSON is the only
//! thing written to **stdout**.  Redirecting stdout to a file therefore
//! captures exactly the mapping:
//!
//! ```text
//! keycode-collector --backend enigo > map.json
//! keycode-collector --backend enigo type "Hello" --keymap map.json
//! ```
//!
//! # Why `spawn_blocking`?
//!
//! A session spends its time in blocking calls: `read_line` on stdin and
//! `thread::sleep` between keystrokes.  Running it on Tokio's blocking pool
//! keeps the async runtime free to deliver the Ctrl-C signal and the noisy
//! mode error reports while the session is busy.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use keycode_collector::application::collect_session::CollectSessionUseCase;
use keycode_collector::application::discover_keycode::DiscoverKeyCodeUseCase;
use keycode_collector::application::inject_keys::{
    InjectionError, InjectorConfig, KeyEmitter, KeyInjector, NamedKey,
};
use keycode_collector::infrastructure::key_emitter::dry_run::DryRunKeyEmitter;
use keycode_collector::infrastructure::output::MappingOutput;
use keycode_collector::infrastructure::prompt::TerminalPrompter;
use keycode_collector::infrastructure::storage::config::{
    load_config, load_config_from, AppConfig, DiscoverySection, InjectorSection,
};
use keycode_core::KeyCodeMap;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Interactive key code discovery and keystroke injection.
#[derive(Debug, Parser)]
#[command(
    name = "keycode-collector",
    about = "Discover which key code types which character, and type with the result",
    version
)]
struct Cli {
    /// Configuration file.  Defaults to the platform config directory.
    #[arg(long, global = true, env = "KEYCODE_COLLECTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Where key events go.
    #[arg(long, value_enum, global = true, default_value_t = Backend::DryRun)]
    backend: Backend,

    /// Pause before each key press, in milliseconds.
    #[arg(long, global = true)]
    before_ms: Option<u64>,

    /// How long each key is held down, in milliseconds.
    #[arg(long, global = true)]
    down_ms: Option<u64>,

    /// Pause after each key release, in milliseconds.
    #[arg(long, global = true)]
    after_ms: Option<u64>,

    /// Skip the delay some platforms need before the first synthetic key.
    #[arg(long, global = true)]
    no_startup_delay: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Log key events instead of sending them.
    DryRun,
    /// Send key events to the OS (requires the `enigo` feature).
    Enigo,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Discover key codes interactively and print the mapping as JSON.
    Collect,

    /// Type text using a mapping printed by `collect`.
    Type {
        text: String,

        /// Mapping JSON file.
        #[arg(long)]
        keymap: PathBuf,

        /// Keep typing past characters missing from the mapping.
        #[arg(long)]
        stubborn: bool,

        /// Report every error as soon as it happens.
        #[arg(long)]
        noisy: bool,

        /// Jitter every pause by up to ±50%.
        #[arg(long)]
        random: bool,
    },

    /// Tap a named key with every other key released.
    Key {
        #[arg(value_enum)]
        key: KeyArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KeyArg {
    Escape,
    Tab,
    Enter,
    Backspace,
}

impl From<KeyArg> for NamedKey {
    fn from(key: KeyArg) -> Self {
        match key {
            KeyArg::Escape => NamedKey::Escape,
            KeyArg::Tab => NamedKey::Tab,
            KeyArg::Enter => NamedKey::Enter,
            KeyArg::Backspace => NamedKey::Backspace,
        }
    }
}

impl Cli {
    /// Loads the configuration file named by `--config`, or the platform one.
    fn load_app_config(&self) -> anyhow::Result<AppConfig> {
        match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => load_config().context("failed to load config"),
        }
    }

    /// Applies the command-line timing overrides on top of the config file.
    fn injector_config(&self, section: &InjectorSection) -> InjectorConfig {
        let mut config = section.to_injector_config();
        if let Some(ms) = self.before_ms {
            config.before = Duration::from_millis(ms);
        }
        if let Some(ms) = self.down_ms {
            config.down = Duration::from_millis(ms);
        }
        if let Some(ms) = self.after_ms {
            config.after = Duration::from_millis(ms);
        }
        if self.no_startup_delay {
            config.startup_delay = None;
        }
        config
    }
}

// ── Command runners ───────────────────────────────────────────────────────────

fn build_emitter(backend: Backend) -> anyhow::Result<Box<dyn KeyEmitter>> {
    match backend {
        Backend::DryRun => Ok(Box::new(DryRunKeyEmitter::new())),
        #[cfg(feature = "enigo")]
        Backend::Enigo => {
            use keycode_collector::infrastructure::key_emitter::enigo_emitter::EnigoKeyEmitter;
            let emitter = EnigoKeyEmitter::new().context("failed to open the OS input backend")?;
            Ok(Box::new(emitter))
        }
        #[cfg(not(feature = "enigo"))]
        Backend::Enigo => anyhow::bail!("this build has no `enigo` backend; rebuild with `--features enigo`"),
    }
}

/// Runs the interactive session.  The mapping is printed on every exit path.
fn run_collect(
    backend: Backend,
    injector_config: InjectorConfig,
    discovery: &DiscoverySection,
    interrupted: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let mut output = MappingOutput::new(io::stdout());

    let injector = KeyInjector::new(build_emitter(backend)?, injector_config);
    let session = CollectSessionUseCase::new(
        DiscoverKeyCodeUseCase::new(&injector, discovery.to_discovery_config()),
        discovery.session_defaults(),
    );
    let mut prompter = TerminalPrompter::stdio(interrupted);

    let result = session.run(&mut prompter, output.mapping_mut());
    output.finish().context("failed to write key code mapping")?;

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_interrupted() => {
            warn!("session interrupted");
            Ok(())
        }
        Err(e) => Err(e).context("collection session failed"),
    }
}

fn run_type(
    backend: Backend,
    injector_config: InjectorConfig,
    text: &str,
    keymap_path: &Path,
    observer: Option<UnboundedSender<InjectionError>>,
    interrupted: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(keymap_path)
        .with_context(|| format!("failed to read keymap {}", keymap_path.display()))?;
    let keymap = KeyCodeMap::from_json(&json)
        .with_context(|| format!("invalid keymap {}", keymap_path.display()))?;
    info!(entries = keymap.len(), chars = text.chars().count(), "typing text");

    let mut injector =
        KeyInjector::new(build_emitter(backend)?, injector_config).with_interrupt(interrupted);
    if let Some(tx) = observer {
        injector = injector.with_observer(tx);
    }
    injector.type_string(text, &keymap).context("typing failed")?;
    Ok(())
}

fn run_key(backend: Backend, injector_config: InjectorConfig, key: NamedKey) -> anyhow::Result<()> {
    let injector = KeyInjector::new(build_emitter(backend)?, injector_config);
    injector
        .only(key)
        .with_context(|| format!("failed to press {key:?}"))
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app_config = cli.load_app_config()?;
    init_tracing(&app_config.log_level);

    info!(backend = ?cli.backend, "keycode-collector starting");

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = Arc::clone(&interrupted);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupt received; stopping at the next prompt or keystroke");
                interrupted_clone.store(true, Ordering::SeqCst);
            }
            Err(e) => error!("failed to listen for Ctrl-C: {e}"),
        }
    });

    let injector_config = cli.injector_config(&app_config.injector);
    let backend = cli.backend;
    let mut reporter = None;

    let job = match cli.command.unwrap_or(Command::Collect) {
        Command::Collect => {
            let discovery = app_config.discovery.clone();
            tokio::task::spawn_blocking(move || {
                run_collect(backend, injector_config, &discovery, interrupted)
            })
        }
        Command::Type {
            text,
            keymap,
            stubborn,
            noisy,
            random,
        } => {
            let config = InjectorConfig {
                stubborn: injector_config.stubborn || stubborn,
                noisy: injector_config.noisy || noisy,
                random: injector_config.random || random,
                ..injector_config
            };
            let observer = if config.noisy {
                let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<InjectionError>();
                reporter = Some(tokio::spawn(async move {
                    let mut count = 0usize;
                    while let Some(err) = rx.recv().await {
                        count += 1;
                        eprintln!("error: {err}");
                    }
                    count
                }));
                Some(tx)
            } else {
                None
            };
            tokio::task::spawn_blocking(move || {
                run_type(backend, config, &text, &keymap, observer, interrupted)
            })
        }
        Command::Key { key } => {
            tokio::task::spawn_blocking(move || run_key(backend, injector_config, key.into()))
        }
    };

    let result = job.await.context("worker thread panicked")?;

    if let Some(reporter) = reporter {
        if let Ok(count) = reporter.await {
            info!(errors = count, "typing errors reported");
        }
    }

    result
}

// ── Tests ─────────────────────────────────────────────────────────────────────
