//! assetdeck - A terminal browser for digital-asset thumbnails
#![allow(clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use assetdeck::feed::parse_assets;
use assetdeck::models::MediaKind;
use assetdeck::thumbnail::{MAX_RETRIES, is_thumbnailable, resolve, version_of};

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse CLI arguments
    match parse_args(std::env::args().collect())? {
        Command::Run => assetdeck::app::run(),
        Command::Demo => assetdeck::app::run_demo(),
        Command::Inspect {
            catalog,
            retries,
            json,
        } => inspect(&catalog, retries, json),
        Command::Classify { input } => {
            classify(&input);
            Ok(())
        }
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
    }
}

/// CLI commands
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run,
    Demo,
    Inspect {
        catalog: PathBuf,
        retries: u32,
        json: bool,
    },
    Classify {
        input: String,
    },
    Help,
    Version,
}

fn parse_args(args: Vec<String>) -> Result<Command> {
    if args.len() == 1 {
        return Ok(Command::Run);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),
        "--demo" | "demo" => Ok(Command::Demo),

        "inspect" => {
            let catalog = args
                .get(2)
                .filter(|a| !a.starts_with('-'))
                .ok_or_else(|| anyhow::anyhow!("Missing catalog path"))?
                .into();

            let retries = match args.iter().position(|a| a == "--retries" || a == "-r") {
                Some(i) => args
                    .get(i + 1)
                    .ok_or_else(|| anyhow::anyhow!("--retries needs a value"))?
                    .parse()
                    .context("--retries must be a non-negative number")?,
                None => 0,
            };
            let json = args.iter().any(|a| a == "--json");

            Ok(Command::Inspect {
                catalog,
                retries,
                json,
            })
        }

        "classify" => {
            let input = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing MIME type or extension"))?
                .clone();
            Ok(Command::Classify { input })
        }

        other => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'assetdeck --help' for usage"
        )),
    }
}

fn print_help() {
    let config_path = assetdeck::Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"{}
🖼 assetdeck - thumbnails of your digital assets, in the terminal

USAGE:
    assetdeck                          Launch TUI
    assetdeck [COMMAND]

COMMANDS:
    demo                               Launch TUI against a scripted pipeline

    inspect <catalog.json> [OPTIONS]   Print the thumbnail state of every asset
      Options:
        -r, --retries <n>              Retries already spent (default: 0)
        --json                         Print JSON instead of a table
      Examples:
        assetdeck inspect assets.json
        assetdeck inspect assets.json --retries 2

    classify <mime-or-extension>       Can this type have a thumbnail?
      Examples:
        assetdeck classify image/avif
        assetdeck classify .psd

OPTIONS:
    -h, --help                         Show this help message
    -v, --version                      Show version information

KEYBINDINGS (TUI):
    Navigation
      j/↓           Move down
      k/↑           Move up
      g/G           Jump to top/bottom

    Actions
      r             Retry failed thumbnail
      R             Refresh
      o             Open thumbnail
      i             Toggle images

    View
      f             Cycle filter (All/Ready/In progress/Problems)
      t             Change theme
      ?             Help

CONFIG:
    {}
"#,
        assetdeck::LOGO,
        config_path
    );
}

fn print_version() {
    println!("assetdeck {}", assetdeck::VERSION);
}

fn inspect(catalog: &Path, retries: u32, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(catalog)
        .with_context(|| format!("Failed to read {}", catalog.display()))?;
    let assets = parse_assets(&content)?;

    if json {
        let rows: Vec<_> = assets
            .iter()
            .map(|asset| {
                serde_json::json!({
                    "id": asset.id,
                    "version": version_of(asset).as_str(),
                    "resolved": resolve(asset, retries),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:<24} {:<16} {:<14} {:<10} {:<6} URL",
        "ASSET", "TYPE", "STATE", "SOURCE", "RETRY"
    );
    println!("{}", "─".repeat(90));

    for asset in &assets {
        let resolved = resolve(asset, retries);
        let kind = asset.mime().or(asset.extension()).unwrap_or("?");
        let source = resolved
            .source
            .map_or("-", |s| match s {
                assetdeck::thumbnail::UrlSource::Final => "final",
                assetdeck::thumbnail::UrlSource::Temporary => "temporary",
            });
        let retry = if resolved.can_retry { "yes" } else { "-" };

        println!(
            "{:<24} {:<16} {} {:<12} {:<10} {:<6} {}",
            asset.display_name(),
            kind,
            resolved.state.glyph(),
            resolved.state.as_str(),
            source,
            retry,
            resolved.url.as_deref().unwrap_or("-")
        );
    }

    println!(
        "\n{} assets, {} retries spent (max {})",
        assets.len(),
        retries,
        MAX_RETRIES
    );
    Ok(())
}

fn classify(input: &str) {
    let input = input.trim();
    let (mime, extension) = if input.contains('/') {
        (Some(input), None)
    } else {
        (None, Some(input))
    };

    let kind = MediaKind::detect(mime, extension);
    if is_thumbnailable(mime, extension) {
        println!("✓ {input}: thumbnails supported ({} {})", kind.emoji(), kind.name());
    } else {
        println!("✗ {input}: no thumbnail, shown as {} {}", kind.emoji(), kind.name());
    }
}
