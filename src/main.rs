//! exifstrip - command-line interface
//!
//! Strips APP1 (EXIF/XMP) metadata from a JPEG file, or serves one JSON strip
//! request (`{"imageBase64", "mimeType"}`) from a file or stdin.

use clap::{Arg, ArgAction, ArgMatches, Command, ValueEnum};
use exifstrip::io::{create_backup, strip_file};
use exifstrip::{media_type_for_path, SegmentRewriter, StripOutcome, StripService, StripperConfig};
use std::path::{Path, PathBuf};
use std::process;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    /// Error messages only
    Error,
    /// Warning and error messages
    Warn,
    /// Info, warning, and error messages (default)
    Info,
    /// Debug and all messages
    Debug,
    /// Trace and all messages (most verbose)
    Trace,
}

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let log_level = if matches.get_flag("quiet") {
        LogLevel::Error
    } else {
        matches
            .get_one::<LogLevel>("verbose")
            .copied()
            .unwrap_or(LogLevel::Info)
    };
    init_logging(log_level);

    let config = match matches.get_one::<String>("config") {
        Some(path) => match StripperConfig::from_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Failed to load config file: {}", e);
                process::exit(1);
            }
        },
        None => StripperConfig::default(),
    };

    if let Some(source) = matches.get_one::<String>("request") {
        if let Err(e) = serve_request(&config, source).await {
            error!("Request handling failed: {}", e);
            process::exit(1);
        }
        return;
    }

    if let Err(e) = run_file(&config, &matches).await {
        error!("{}", e);
        process::exit(1);
    }
}

fn build_cli() -> Command {
    Command::new("exifstrip")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Removes EXIF/XMP metadata segments from JPEG images")
        .long_about(
            "Walks the JPEG marker structure and drops every APP1 segment, copying all \
             other bytes verbatim. Non-JPEG inputs are passed through unchanged.",
        )
        // Input/Output
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Input image path")
                .required_unless_present("request"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output image path")
                .required_unless_present("request"),
        )
        .arg(
            Arg::new("mime-type")
                .short('t')
                .long("mime-type")
                .value_name("TYPE")
                .help("Declared media type (guessed from the input extension if omitted)"),
        )
        // Configuration
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (JSON/YAML)"),
        )
        .arg(
            Arg::new("request")
                .long("request")
                .value_name("FILE")
                .conflicts_with_all(["input", "output"])
                .help("Handle a JSON strip request from FILE ('-' for stdin) and print the reply"),
        )
        // Output and reporting
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the strip outcome as JSON"),
        )
        // Advanced options
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Force overwrite existing output files"),
        )
        .arg(
            Arg::new("backup")
                .short('b')
                .long("backup")
                .action(ArgAction::SetTrue)
                .help("Create backup of original file"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Report what would be removed without writing output"),
        )
        // Logging
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .value_parser(clap::value_parser!(LogLevel))
                .default_value("info")
                .help("Set logging verbosity"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Suppress all output except errors"),
        )
}

fn init_logging(level: LogLevel) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let filter_level = match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(format!("exifstrip={}", filter_level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("A tracing subscriber was already installed");
    }
}

async fn run_file(config: &StripperConfig, matches: &ArgMatches) -> Result<(), String> {
    let input = PathBuf::from(required(matches, "input")?);
    let output = PathBuf::from(required(matches, "output")?);
    let media_type = matches
        .get_one::<String>("mime-type")
        .map(String::as_str)
        .unwrap_or_else(|| media_type_for_path(&input));

    if !input.exists() {
        return Err(format!("Input file does not exist: {}", input.display()));
    }
    if output.exists() && !matches.get_flag("force") && !matches.get_flag("dry-run") {
        return Err(format!(
            "Output file already exists: {} (use --force to overwrite)",
            output.display()
        ));
    }

    let rewriter = SegmentRewriter::from_config(config);
    debug!(media_type, "Using declared media type");

    if matches.get_flag("dry-run") {
        let bytes = tokio::fs::read(&input)
            .await
            .map_err(|e| format!("Failed to read input: {}", e))?;
        let outcome = rewriter.strip(&bytes, media_type);
        info!("Dry run mode - no files will be modified");
        report(&outcome, &input, &output, matches.get_flag("json"))?;
        return Ok(());
    }

    if matches.get_flag("backup") {
        create_backup(&input)
            .await
            .map_err(|e| format!("Failed to create backup: {}", e))?;
        info!("Created backup of original file");
    }

    let outcome = strip_file(&rewriter, &input, &output, media_type)
        .await
        .map_err(|e| format!("Failed to strip {}: {}", input.display(), e))?;
    report(&outcome, &input, &output, matches.get_flag("json"))
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, String> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing --{}", name))
}

fn report(outcome: &StripOutcome, input: &Path, output: &Path, json: bool) -> Result<(), String> {
    if json {
        let mut value = serde_json::to_value(outcome).map_err(|e| e.to_string())?;
        value["input"] = serde_json::Value::String(input.display().to_string());
        value["output"] = serde_json::Value::String(output.display().to_string());
        let text = serde_json::to_string_pretty(&value).map_err(|e| e.to_string())?;
        println!("{}", text);
        return Ok(());
    }

    if outcome.is_degraded() {
        warn!("Malformed JPEG structure, remaining bytes were copied unchanged");
    }
    if outcome.stripped {
        info!(
            "Removed {} APP1 segment(s), {} bytes ({} -> {})",
            outcome.removed.len(),
            outcome.bytes_removed(),
            outcome.original_size,
            outcome.cleaned_size
        );
        for segment in &outcome.removed {
            info!("   {:?} at offset {} ({} bytes)", segment.kind, segment.offset, segment.length);
        }
    } else {
        info!("No metadata segments removed ({:?})", outcome.completion);
    }
    Ok(())
}

async fn serve_request(config: &StripperConfig, source: &str) -> Result<(), String> {
    let body = if source == "-" {
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        buf
    } else {
        tokio::fs::read(source)
            .await
            .map_err(|e| format!("Failed to read request file: {}", e))?
    };

    let reply = StripService::from_config(config).handle(&body);
    let text = serde_json::to_string(&reply.body).map_err(|e| e.to_string())?;

    let mut stdout = tokio::io::stdout();
    let write = async {
        stdout.write_all(text.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await
    };
    write
        .await
        .map_err(|e| format!("Failed to write reply: {}", e))?;

    if !reply.is_success() {
        return Err(format!("Request rejected with status {}", reply.status));
    }
    Ok(())
}
