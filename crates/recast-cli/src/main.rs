//! Recast CLI - batch image re-encoding

mod config;
mod errors;
mod frontend;
mod prefs;

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use config::{Config, Preset};
use frontend::{BarProgress, DirectoryDelivery, TerminalFrontend};
use prefs::TomlPreferences;
use recast_core::{
    ArchiveLayout, DEFAULT_ARCHIVE_THRESHOLD, DeliveryMode, FileInput, ModePolicy, OutputFormat,
    Quality, Session, SessionConfig, Theme, human_size,
};
use recast_image::{ImageCodec, enabled_formats, media_type_for_path, sniff_media_type};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Collect files from patterns, directories, and globs.
///
/// When `recursive` is true, directories are walked recursively.
fn collect_files(patterns: Vec<String>, recursive: bool, v: Verbosity) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for pattern in patterns {
        let path = PathBuf::from(&pattern);

        if path.is_dir() {
            if recursive {
                files.extend(
                    walkdir::WalkDir::new(&path)
                        .into_iter()
                        .filter_map(|e| e.ok())
                        .filter(|e| e.file_type().is_file())
                        .map(|e| e.into_path()),
                );
            } else if let Ok(entries) = std::fs::read_dir(&path) {
                // Non-recursive: only immediate children
                for entry in entries.flatten() {
                    if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                        files.push(entry.path());
                    }
                }
            }
        } else if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            files.extend(expand_glob_pattern(&pattern, v));
        } else {
            files.push(path);
        }
    }

    files.sort();
    files
}

fn expand_glob_pattern(pattern: &str, v: Verbosity) -> Vec<PathBuf> {
    match glob::glob(pattern) {
        Ok(paths) => {
            let files: Vec<_> = paths.flatten().filter(|p| p.is_file()).collect();
            if files.is_empty() {
                v.info(&format!("Warning: pattern '{}' matched no files", pattern));
            }
            files
        }
        Err(e) => {
            v.info(&format!(
                "Warning: invalid glob pattern '{}': {}",
                pattern, e
            ));
            Vec::new()
        }
    }
}

/// Files read for intake, plus the ones that could not be read.
#[derive(Default)]
struct ReadInputs {
    inputs: Vec<FileInput>,
    /// Display name and reason, in path order.
    unreadable: Vec<(String, String)>,
}

/// Read files into intake inputs, deriving each media type from content,
/// then extension. Unreadable files are skipped, not fatal.
fn read_inputs(paths: &[PathBuf]) -> ReadInputs {
    let mut read = ReadInputs::default();

    for path in paths {
        match std::fs::read(path) {
            Ok(data) => {
                let media_type = sniff_media_type(&data)
                    .or_else(|| media_type_for_path(path))
                    .unwrap_or("application/octet-stream");
                read.inputs
                    .push(FileInput::new(display_name(path), media_type, data));
            }
            Err(e) => {
                let reason = errors::file_read_error(path, &e);
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                read.unreadable.push((display_name(path), reason));
            }
        }
    }

    read
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Output verbosity level.
#[derive(Clone, Copy)]
enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    fn info(self, msg: &str) {
        if !matches!(self, Verbosity::Quiet) {
            println!("{msg}");
        }
    }

    fn debug(self, msg: &str) {
        if matches!(self, Verbosity::Verbose) {
            println!("[debug] {msg}");
        }
    }

    fn result(self, msg: &str) {
        if !matches!(self, Verbosity::Quiet) {
            println!("{msg}");
        }
    }

    /// Default log filter when `RUST_LOG` is unset.
    fn log_filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "debug",
        }
    }
}

fn init_tracing(v: Verbosity) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(v.log_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

#[derive(Parser)]
#[command(name = "recast")]
#[command(about = "Batch image re-encoding", long_about = None)]
struct Cli {
    /// Verbose output (show debug info)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to config file (default: ~/.config/recast/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to preferences file (default: ~/.config/recast/preferences.toml)
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert images to another format
    Convert {
        /// Input files, directories or glob patterns
        inputs: Vec<String>,

        /// Output format (jpeg, png, webp, gif, bmp, tiff)
        #[arg(long)]
        to: Option<String>,

        /// Quality in percent, used by lossy formats
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        quality: Option<u8>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Always deliver one zip archive
        #[arg(long, conflicts_with = "individual")]
        archive: bool,

        /// Always deliver one file per image
        #[arg(long)]
        individual: bool,

        /// Archive when more than this many images are converted
        #[arg(long)]
        threshold: Option<usize>,

        /// Folder inside the archive
        #[arg(long, conflicts_with = "flat")]
        folder: Option<String>,

        /// Put archive entries at the root
        #[arg(long)]
        flat: bool,

        /// Leave out images with this file name (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Apply a preset (web, photo, lossless, bundle, or user-defined)
        #[arg(long)]
        preset: Option<String>,

        /// Recursively process directories
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// Load images and show the catalog without converting
    List {
        /// Input files, directories or glob patterns
        inputs: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Recursively process directories
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// List output formats enabled in this build
    Formats,

    /// List available presets
    Presets,

    /// Show or change the color theme
    Theme {
        #[arg(value_enum, default_value = "show")]
        action: ThemeAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate man page
    Manpage,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ThemeAction {
    Show,
    Toggle,
    Light,
    Dark,
}

/// Options of the convert command after flag parsing.
struct ConvertArgs {
    inputs: Vec<String>,
    to: Option<String>,
    quality: Option<u8>,
    output_dir: PathBuf,
    archive: bool,
    individual: bool,
    threshold: Option<usize>,
    folder: Option<String>,
    flat: bool,
    exclude: Vec<String>,
    preset: Option<String>,
    recursive: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        Config::load_from_path(Some(path.clone()))
    } else {
        Config::load()
    };

    // Apply config defaults, CLI flags override
    let verbose = cli.verbose || config.defaults.verbose;
    let quiet = cli.quiet || config.defaults.quiet;
    let verbosity = Verbosity::from_flags(verbose, quiet);
    init_tracing(verbosity);

    match cli.command {
        Commands::Convert {
            inputs,
            to,
            quality,
            output_dir,
            archive,
            individual,
            threshold,
            folder,
            flat,
            exclude,
            preset,
            recursive,
        } => cmd_convert(
            &config,
            ConvertArgs {
                inputs,
                to,
                quality,
                output_dir,
                archive,
                individual,
                threshold,
                folder,
                flat,
                exclude,
                preset,
                recursive,
            },
            verbosity,
        ),
        Commands::List {
            inputs,
            json,
            recursive,
        } => cmd_list(inputs, json, recursive, verbosity),
        Commands::Formats => cmd_formats(verbosity),
        Commands::Presets => cmd_presets(&config, verbosity),
        Commands::Theme { action } => cmd_theme(cli.prefs, action, verbosity),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "recast", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Manpage => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            man.render(&mut std::io::stdout())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Build the session settings from preset, config defaults and flags.
fn build_session_config(config: &Config, args: &ConvertArgs) -> Result<SessionConfig> {
    let preset = match &args.preset {
        Some(name) => config.get_preset(name).ok_or_else(|| {
            let mut names: Vec<_> = config::list_presets().iter().map(|(n, _)| *n).collect();
            names.extend(config.presets.keys().map(String::as_str));
            anyhow!(
                "Unknown preset '{}'. Available: {}",
                name,
                names.join(", ")
            )
        })?,
        None => Preset::default(),
    };

    let format_name = args
        .to
        .as_deref()
        .or(preset.format.as_deref())
        .or(config.defaults.format.as_deref())
        .unwrap_or("jpeg");
    let enabled = enabled_formats();
    let format = OutputFormat::parse(format_name)
        .ok_or_else(|| anyhow!(errors::unknown_format_error(format_name, &enabled)))?;
    if !enabled.contains(&format) {
        bail!(errors::disabled_format_error(format));
    }

    let quality = args
        .quality
        .or(preset.quality)
        .or(config.defaults.quality)
        .map(Quality::from_percent)
        .unwrap_or_default();

    let mode = if args.archive {
        ModePolicy::Explicit(DeliveryMode::Archive)
    } else if args.individual {
        ModePolicy::Explicit(DeliveryMode::Individual)
    } else if let Some(n) = args.threshold {
        ModePolicy::Threshold(n)
    } else {
        match preset.mode.as_deref() {
            Some("archive") => ModePolicy::Explicit(DeliveryMode::Archive),
            Some("individual") => ModePolicy::Explicit(DeliveryMode::Individual),
            Some(other) => bail!(
                "Invalid preset mode '{}'. Use: archive, individual",
                other
            ),
            None => ModePolicy::Threshold(
                config
                    .defaults
                    .archive_threshold
                    .unwrap_or(DEFAULT_ARCHIVE_THRESHOLD),
            ),
        }
    };

    let layout = if args.flat {
        ArchiveLayout::Flat
    } else {
        match args
            .folder
            .as_deref()
            .or(config.defaults.archive_folder.as_deref())
        {
            Some("") => ArchiveLayout::Flat,
            Some(folder) => ArchiveLayout::Folder(folder.to_string()),
            None => ArchiveLayout::default(),
        }
    };

    Ok(SessionConfig {
        format,
        quality,
        mode,
        layout,
        allow_single: false,
    })
}

fn new_session(frontend: TerminalFrontend, config: SessionConfig) -> Session<TerminalFrontend> {
    Session::new(
        Box::new(ImageCodec::new()),
        Box::new(ImageCodec::new()),
        frontend,
        config,
    )
}

fn cmd_convert(config: &Config, args: ConvertArgs, v: Verbosity) -> Result<ExitCode> {
    let session_config = build_session_config(config, &args)?;
    v.debug(&format!(
        "format={} quality={} mode={:?} layout={:?}",
        session_config.format, session_config.quality, session_config.mode, session_config.layout
    ));

    let files = collect_files(args.inputs, args.recursive, v);
    let read = read_inputs(&files);
    for (name, reason) in &read.unreadable {
        v.info(&format!("Skipped {}: {}", name, reason));
    }

    let mut session = new_session(TerminalFrontend::new(v), session_config);
    let report = session.add_files(read.inputs);
    for (name, err) in &report.failed {
        v.info(&format!("Skipped {}: {}", name, err));
    }

    for name in &args.exclude {
        let ids: Vec<_> = session
            .catalog()
            .entries()
            .iter()
            .filter(|e| e.name() == name && e.is_included())
            .map(|e| e.id())
            .collect();
        if ids.is_empty() {
            v.info(&format!("Warning: --exclude '{}' matched no image", name));
        }
        for id in ids {
            session.toggle(id)?;
        }
    }

    let mut delivery = DirectoryDelivery::new(&args.output_dir);
    let mut progress = BarProgress::new(v);
    let result = session.convert_selected(&mut delivery, &mut progress);
    // Failures are already reported through the frontend; any error notice fails the run.
    let summary = match result {
        Ok(summary) if session.frontend().errors() == 0 => summary,
        _ => return Ok(ExitCode::FAILURE),
    };

    for path in delivery.written() {
        v.debug(&format!("wrote {}", path.display()));
    }
    v.result(&format!(
        "Converted {} image(s) to {} ({}), wrote {} file(s) to {}",
        summary.converted,
        session.config().format,
        human_size(summary.bytes_out),
        summary.downloads.len(),
        args.output_dir.display()
    ));

    Ok(ExitCode::SUCCESS)
}

fn cmd_list(inputs: Vec<String>, json: bool, recursive: bool, v: Verbosity) -> Result<ExitCode> {
    let files = collect_files(inputs, recursive, v);
    let read = read_inputs(&files);

    let frontend = TerminalFrontend::new(if json { Verbosity::Quiet } else { v }).echo_catalog(!json);
    let mut session = new_session(frontend, SessionConfig::default());
    let rendered = !read.inputs.is_empty();
    let report = session.add_files(read.inputs);

    if json {
        let entries: Vec<_> = session
            .catalog()
            .entries()
            .iter()
            .map(|e| e.summary())
            .collect();
        let failed: Vec<_> = read
            .unreadable
            .iter()
            .map(|(name, reason)| serde_json::json!({ "name": name, "error": reason }))
            .chain(report.failed.iter().map(
                |(name, err)| serde_json::json!({ "name": name, "error": err.to_string() }),
            ))
            .collect();
        let doc = serde_json::json!({
            "entries": entries,
            "rejected": report.rejected,
            "failed": failed,
            "total_bytes": session.catalog().total_bytes(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&doc).context("Failed to serialize catalog")?
        );
    } else {
        // Empty input never reaches intake, so nothing was rendered.
        if !rendered {
            v.info("No images loaded");
        }
        for (name, reason) in &read.unreadable {
            v.info(&format!("Skipped {}: {}", name, reason));
        }
        for (name, err) in &report.failed {
            v.info(&format!("Skipped {}: {}", name, err));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_formats(v: Verbosity) -> Result<ExitCode> {
    let enabled = enabled_formats();
    v.info("Output formats:\n");
    for format in OutputFormat::ALL {
        let mut notes = Vec::new();
        if format.is_lossy() {
            notes.push("uses --quality");
        }
        if !enabled.contains(&format) {
            notes.push("disabled in this build");
        }
        v.info(&format!(
            "  {:<6} {:<12} {}",
            format.extension(),
            format.mime_type(),
            notes.join(", ")
        ));
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_presets(config: &Config, v: Verbosity) -> Result<ExitCode> {
    v.info("Built-in presets:\n");

    for (name, desc) in config::list_presets() {
        v.info(&format!("  {:<12} {}", name, desc));
    }

    if !config.presets.is_empty() {
        v.info("\nUser-defined presets:\n");
        let mut names: Vec<_> = config.presets.keys().collect();
        names.sort();
        for name in names {
            let preset = &config.presets[name];
            let mut parts = Vec::new();
            if let Some(ref f) = preset.format {
                parts.push(format!("format={}", f));
            }
            if let Some(q) = preset.quality {
                parts.push(format!("quality={}", q));
            }
            if let Some(ref m) = preset.mode {
                parts.push(format!("mode={}", m));
            }
            let desc = if parts.is_empty() {
                "(empty)".into()
            } else {
                parts.join(", ")
            };
            v.info(&format!("  {:<12} {}", name, desc));
        }
    }

    if let Some(path) = Config::default_path() {
        v.info(&format!("\nConfig file: {}", path.display()));
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_theme(prefs: Option<PathBuf>, action: ThemeAction, v: Verbosity) -> Result<ExitCode> {
    let path = prefs
        .or_else(TomlPreferences::default_path)
        .context("Could not determine preferences location; pass --prefs")?;
    let mut store = TomlPreferences::load(&path)?;
    let system_dark = prefs::system_prefers_dark();

    let theme = match action {
        ThemeAction::Show => Theme::load(&store, system_dark),
        ThemeAction::Toggle => Theme::toggle(&mut store, system_dark)?,
        ThemeAction::Light | ThemeAction::Dark => {
            let theme = if matches!(action, ThemeAction::Dark) {
                Theme::Dark
            } else {
                Theme::Light
            };
            theme.save(&mut store)?;
            theme
        }
    };

    v.result(&format!("Theme: {}", theme));
    v.debug(&format!("preferences: {}", store.path().display()));
    Ok(ExitCode::SUCCESS)
}
