// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use vocabkit::Controller;
use vocabkit::app_config::{self, Config, StoreBackend};
use vocabkit::jobs::fetch::VocabularySource;
use vocabkit::jobs::upload::UploadOptions;

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

/// CLI Wrapper for StoreBackend to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliStoreBackend {
    Sqlite,
    Firestore,
    Memory,
}

impl From<CliStoreBackend> for StoreBackend {
    fn from(cli_backend: CliStoreBackend) -> Self {
        match cli_backend {
            CliStoreBackend::Sqlite => StoreBackend::Sqlite,
            CliStoreBackend::Firestore => StoreBackend::Firestore,
            CliStoreBackend::Memory => StoreBackend::Memory,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split a vocabulary dataset into topics
    Segment {
        /// Dataset text file
        #[arg(value_name = "DATASET")]
        dataset: PathBuf,

        /// Write the topics as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build courses, lessons and tests from a dataset and upload them
    Upload {
        /// Dataset text file
        #[arg(value_name = "DATASET")]
        dataset: PathBuf,

        /// Also write the built courses and tests as JSON to this file
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Build (and export) without uploading
        #[arg(long)]
        no_upload: bool,
    },

    /// Fetch one course's vocabulary grouped by lesson
    Fetch,

    /// Write the mobile client's vocabulary assets
    ExportAndroid {
        /// Assets directory, overrides the configured one
        #[arg(short, long)]
        assets_dir: Option<PathBuf>,
    },

    /// Generate the four-part practice test and upload it
    PracticeTest {
        /// Save the test locally without uploading
        #[arg(long)]
        local_only: bool,
    },

    /// Delete duplicate lessons and move vocabulary to its own collection
    Cleanup,

    /// Point every lesson and question at one YouTube video
    UpdateVideos {
        /// Target video URL, overrides the configured one
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Summarize the courses and tests in the store
    Verify,

    /// Generate shell completions for vocabkit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// vocabkit - TOEIC vocabulary dataset tooling
///
/// Segments vocabulary datasets into courses and runs the administrative
/// jobs that keep the course database and the mobile client in sync.
#[derive(Parser, Debug)]
#[command(name = "vocabkit")]
#[command(version)]
#[command(about = "TOEIC vocabulary dataset segmentation and course maintenance")]
#[command(long_about = "vocabkit turns a TOPIC/TOEIC vocabulary dump into courses, lessons and tests,
and runs maintenance jobs against the course database.

EXAMPLES:
    vocabkit segment dataset.txt -o topics.json   # Inspect how a dataset is split
    vocabkit upload dataset.txt                   # Build and upload all courses
    vocabkit --dry-run upload dataset.txt -e out.json
    vocabkit fetch                                # Save toeic38_vocabulary.json
    vocabkit export-android                       # Write app/src/main/assets files
    vocabkit practice-test --local-only
    vocabkit cleanup
    vocabkit update-videos --url https://youtu.be/kFYgLjdSkXE
    vocabkit verify
    vocabkit completions bash > vocabkit.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

STORES:
    sqlite    - Local SQLite file (default)
    firestore - Cloud Firestore REST API (needs project_id and an access token,
                or FIRESTORE_EMULATOR_HOST)
    memory    - Discarded on exit, used by --dry-run")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Document store backend, overrides the configured one
    #[arg(short, long, value_enum, global = true)]
    backend: Option<CliStoreBackend>,

    /// Run against an in-memory store; nothing is written to a database
    #[arg(long, global = true)]
    dry_run: bool,
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

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
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
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with trace as the ceiling; the effective
    // level is lowered through set_max_level once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "vocabkit", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it immediately
    if let Some(cli_level) = &cli.log_level {
        let level: app_config::LogLevel = cli_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&cli)?;

    // If log level was not set via command line, update it from config now
    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config);
    run_command(&controller, cli.command).await
}

// Load or create configuration, then apply command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let config_path = &cli.config;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    }

    if let Some(backend) = &cli.backend {
        config.store.backend = backend.clone().into();
    }

    if cli.dry_run {
        info!("Dry run: using an in-memory store");
        config.store.backend = StoreBackend::Memory;
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    Ok(config)
}

async fn run_command(controller: &Controller, command: Commands) -> Result<()> {
    match command {
        Commands::Segment { dataset, output } => {
            controller.segment(&dataset, output.as_deref())?;
        }
        Commands::Upload {
            dataset,
            export,
            no_upload,
        } => {
            let options = UploadOptions {
                dataset,
                export_path: export,
                skip_upload: no_upload,
            };
            let report = controller.upload(&options).await?;
            info!(
                "Done: {} courses, {} lessons, {} tests",
                report.courses, report.lessons, report.tests
            );
        }
        Commands::Fetch => {
            let outcome = controller.fetch().await?;
            match outcome.source {
                VocabularySource::Store => info!("Fetched {} lessons from the store", outcome.lessons.len()),
                VocabularySource::LocalFile(path) => {
                    warn!("Store had no vocabulary; used local file {}", path.display())
                }
                VocabularySource::BuiltIn => warn!("Store had no vocabulary; used built-in meeting vocabulary"),
            }
        }
        Commands::ExportAndroid { assets_dir } => {
            let report = controller.export_android(assets_dir)?;
            info!(
                "Wrote {} lesson files and {} ({} words)",
                report.lesson_files.len(),
                report.combined_file.display(),
                report.words
            );
        }
        Commands::PracticeTest { local_only } => {
            let report = controller.practice_test(local_only).await?;
            info!(
                "Practice test with {} questions, {} documents uploaded",
                report.questions, report.documents_written
            );
        }
        Commands::Cleanup => {
            let report = controller.cleanup().await?;
            info!(
                "Cleanup complete: {} lessons deleted, {} vocabulary items moved",
                report.deleted_lessons, report.relocated.writes
            );
        }
        Commands::UpdateVideos { url } => {
            controller.update_videos(url.as_deref()).await?;
        }
        Commands::Verify => {
            let report = controller.verify().await?;
            info!(
                "Verification complete: {} courses, {} tests",
                report.courses.len(),
                report.tests.len()
            );
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
