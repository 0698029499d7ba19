// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use pixelwalk::app_config::{self, Config};
use pixelwalk::app_controller::{Controller, SceneEvent, SceneSnapshot};
use pixelwalk::choreography::Stage;
use pixelwalk::file_utils::FileManager;
use pixelwalk::subtitle_processor::parse_subtitles;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a WebVTT or SRT file and print its cues
    Parse {
        /// Subtitle file to parse
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print cues as JSON instead of WebVTT
        #[arg(long)]
        json: bool,
    },

    /// Run the scene against a simulated audio transport
    Rehearse(RehearseArgs),

    /// Generate shell completions for pixelwalk
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct RehearseArgs {
    /// Asset root the subtitle candidates are resolved against
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Playback speed multiplier of the simulated transport
    #[arg(short, long, default_value_t = 1.0)]
    speed: f64,

    /// Start playback at this position, in seconds
    #[arg(long, default_value_t = 0.0)]
    start_at: f64,

    /// Length of the simulated track, in seconds
    #[arg(short, long, default_value_t = 210.0)]
    duration: f64,

    /// Read commands from stdin instead of pressing the ceremony button automatically
    #[arg(short, long)]
    manual: bool,
}

/// pixelwalk - choreography core of an audio-synchronized ceremony scene
#[derive(Parser, Debug)]
#[command(name = "pixelwalk")]
#[command(version)]
#[command(about = "Subtitle-synchronized scene choreography")]
#[command(long_about = "pixelwalk parses WebVTT/SRT lyrics and drives the ceremony stage machine.

EXAMPLES:
    pixelwalk parse song.vtt                  # Print parsed cues as WebVTT
    pixelwalk parse --json song.srt           # Print parsed cues as JSON
    pixelwalk rehearse -s 8                   # Run the scene at 8x playback speed
    pixelwalk rehearse --start-at 165 -m      # Start near the finale, drive it from stdin
    pixelwalk completions bash > pixelwalk.bash

MANUAL COMMANDS (rehearse -m):
    a        ceremony button          r        replay button
    p        play / pause             u        open the envelope
    s <sec>  seek                     l <n>    seek to subtitle line
    q        quit")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                color, now, record.level(), record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();
    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "pixelwalk", &mut std::io::stdout());
            Ok(())
        }
        Commands::Parse { file, json } => run_parse(&file, json),
        Commands::Rehearse(args) => {
            let config = load_config(&cli.config_path, cli.log_level.is_some())?;
            run_rehearse(config, args).await
        }
    }
}

/// Load or create the config and apply its log level unless the CLI set one
fn load_config(path: &PathBuf, cli_level_set: bool) -> Result<Config> {
    let (config, created) = Config::load_or_create(path)?;
    if created {
        warn!("Config file not found at {:?}, created default config.", path);
    }
    if !cli_level_set {
        log::set_max_level(config.log_level.to_level_filter());
    }
    Ok(config)
}

fn run_parse(file: &PathBuf, json: bool) -> Result<()> {
    let raw = FileManager::read_to_string(file)?;
    let cues = parse_subtitles(&raw);
    if cues.is_empty() {
        warn!("No cues found in {:?}", file);
    }

    if json {
        let out = serde_json::to_string_pretty(&cues).context("Failed to serialize cues")?;
        println!("{}", out);
    } else {
        print!("{}", cues);
    }
    Ok(())
}

async fn run_rehearse(mut config: Config, args: RehearseArgs) -> Result<()> {
    if !args.speed.is_finite() || args.speed <= 0.0 {
        return Err(anyhow!("Playback speed must be positive"));
    }
    if !args.duration.is_finite() || args.duration <= 0.0 {
        return Err(anyhow!("Track duration must be positive"));
    }
    if let Some(assets) = args.assets {
        config.subtitles.asset_root = assets;
    }

    let controller = Controller::with_config(config)?;
    let cues = controller.load_cues();
    let line_starts: Vec<f64> = cues.iter().map(|cue| cue.start_seconds()).collect();
    let handle = controller.start(cues);
    let mut snapshots = handle.subscribe();

    let (done_tx, mut done_rx) = mpsc::channel::<()>(1);
    let (transport_tx, transport_rx) = mpsc::channel::<TransportCommand>(8);
    let transport = tokio::spawn(simulate_transport(
        handle.sender(),
        transport_rx,
        args.start_at.clamp(0.0, args.duration),
        args.duration,
        args.speed,
        done_tx,
    ));

    let mut commands = if args.manual {
        Some(BufReader::new(tokio::io::stdin()).lines())
    } else {
        None
    };

    let mut track_done = false;
    let mut last_stage = handle.snapshot().choreography.stage;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let stage = snapshot.choreography.stage;
                if stage != last_stage {
                    report_stage(&snapshot);
                    last_stage = stage;
                    if !args.manual && stage == Stage::Before {
                        handle.send(SceneEvent::Advance).await?;
                    }
                }
                if track_done && !args.manual && stage == Stage::Freeze {
                    break;
                }
            }
            _ = done_rx.recv(), if !track_done => {
                track_done = true;
                info!("Track finished");
                if !args.manual && last_stage == Stage::Freeze {
                    break;
                }
            }
            line = next_command(&mut commands) => {
                match line {
                    Some(line) => match parse_command(&line) {
                        Some(Command::Quit) => break,
                        Some(Command::Event(event)) => handle.send(event).await?,
                        Some(Command::Seek(position)) => {
                            let seek = TransportCommand::Seek(SceneEvent::Seek(position), position);
                            transport_tx.send(seek).await?;
                        }
                        Some(Command::SeekToLine(index)) => match line_starts.get(index) {
                            Some(&start) => {
                                let seek = TransportCommand::Seek(SceneEvent::SeekToLine(index), start);
                                transport_tx.send(seek).await?;
                            }
                            None => warn!("No subtitle line {}", index),
                        },
                        Some(Command::TogglePlay) => {
                            let command = if handle.snapshot().is_playing {
                                TransportCommand::Pause
                            } else {
                                TransportCommand::Play
                            };
                            transport_tx.send(command).await?;
                        }
                        None => warn!("Unknown command: {}", line.trim()),
                    },
                    None => break,
                }
            }
        }
    }

    transport.abort();
    let summary = handle.shutdown().await?;
    info!(
        "Rehearsal ended in stage {} after {} events, {} stage changes, {} effects",
        summary.final_stage, summary.events_handled, summary.stage_changes, summary.effects
    );
    Ok(())
}

fn report_stage(snapshot: &SceneSnapshot) {
    let c = &snapshot.choreography;
    debug!(
        "label={:?} finale_active={} progress={:.1}s fireworks={}",
        c.action_label, c.finale_active, c.finale_progress, c.fireworks_visible
    );
}

/// Playhead changes requested by the user
#[derive(Debug)]
enum TransportCommand {
    /// Jump to a position in seconds; the event is what the session hears
    Seek(SceneEvent, f64),
    Play,
    Pause,
}

/// Plays the track from `start_at`, sending a position update every 250 ms of
/// wall time while playing. Seeks and play/pause arrive on `commands` so the
/// playhead the session hears about never jumps back. `done` is signalled the
/// first time the end of the track is reached.
async fn simulate_transport(
    events: mpsc::Sender<SceneEvent>,
    mut commands: mpsc::Receiver<TransportCommand>,
    start_at: f64,
    duration: f64,
    speed: f64,
    done: mpsc::Sender<()>,
) -> Result<()> {
    const TICK: Duration = Duration::from_millis(250);

    events.send(SceneEvent::Duration(duration)).await?;
    events.send(SceneEvent::Seek(start_at)).await?;
    events.send(SceneEvent::Play).await?;

    let mut interval = tokio::time::interval(TICK);
    let mut position = start_at;
    let mut playing = true;
    let mut done = Some(done);

    loop {
        tokio::select! {
            _ = interval.tick(), if playing => {
                position = (position + TICK.as_secs_f64() * speed).min(duration);
                events.send(SceneEvent::TimeUpdate(position)).await?;
                if position >= duration {
                    playing = false;
                    events.send(SceneEvent::Pause).await?;
                    if let Some(done) = done.take() {
                        let _ = done.send(()).await;
                    }
                }
            }
            command = commands.recv() => match command {
                Some(TransportCommand::Seek(event, target)) => {
                    if !target.is_finite() || target < 0.0 || target > duration {
                        warn!("Ignoring seek to {}s", target);
                        continue;
                    }
                    position = target;
                    events.send(event).await?;
                }
                Some(TransportCommand::Play) => {
                    playing = true;
                    interval.reset();
                    events.send(SceneEvent::Play).await?;
                }
                Some(TransportCommand::Pause) => {
                    playing = false;
                    events.send(SceneEvent::Pause).await?;
                }
                None => break,
            }
        }
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Command {
    Event(SceneEvent),
    Seek(f64),
    SeekToLine(usize),
    TogglePlay,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let command = match (parts.next()?, parts.next()) {
        ("a", None) => Command::Event(SceneEvent::Advance),
        ("r", None) => Command::Event(SceneEvent::Reset),
        ("u", None) => Command::Event(SceneEvent::Unseal),
        ("p", None) => Command::TogglePlay,
        ("q", None) => Command::Quit,
        ("s", Some(arg)) => Command::Seek(arg.parse().ok()?),
        ("l", Some(arg)) => Command::SeekToLine(arg.parse().ok()?),
        _ => return None,
    };
    Some(command)
}

type CommandLines = tokio::io::Lines<BufReader<tokio::io::Stdin>>;

async fn next_command(commands: &mut Option<CommandLines>) -> Option<String> {
    match commands {
        Some(lines) => lines.next_line().await.ok().flatten(),
        None => std::future::pending().await,
    }
}
