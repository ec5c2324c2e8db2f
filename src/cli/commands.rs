//! CLI commands and argument parsing
//!
//! This module defines the `mmconf` command-line interface using clap and
//! executes each subcommand against the configuration layer.

use crate::config::document::{FieldKind, FieldSpec, SettingsDocument, FIELDS};
use crate::config::loader::{get_config_path, SettingsLoader};
use crate::config::secret::MASK;
use crate::config::settings::Settings;
use crate::error::{MindmapError, Result};
use crate::utils::format::{format_table, render_structured, OutputFormat};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};
use tracing::{info, warn};

const TEMPLATE_HEADER: &str = "\
# mindmap configuration
#
# Secrets belong in the environment, not in this file:
#   MINDMAP_COMPLETION_API_KEY, MINDMAP_VIDEO_INDEX_API_KEY
# Any key below can also be overridden with MINDMAP_<KEY_IN_SNAKE_CASE>.

";

#[derive(Parser, Debug)]
#[command(name = "mmconf")]
#[command(about = "Inspect, validate and edit mindmap configuration")]
#[command(version, author)]
pub struct Cli {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH", env = "MINDMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Disable colored table headers
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Override a setting for this invocation (can be repeated)
    #[arg(long = "set", global = true, value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub overrides: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and validate the configuration
    Check,
    /// Show the merged configuration with secrets masked
    Show,
    /// Show configuration file path
    Path,
    /// Write the default template to the configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Set a value in the configuration file
    Set {
        /// Setting name (camelCase, snake_case or legacy name)
        key: String,
        /// Setting value
        value: String,
    },
    /// List known settings keys with their defaults
    Keys,
    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse a single key-value pair
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    if key.trim().is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

impl Cli {
    /// Build the loader described by the global flags
    pub fn loader(&self) -> Result<SettingsLoader> {
        let mut overrides = SettingsDocument::new();
        for (key, value) in &self.overrides {
            overrides.set(key, value)?;
        }

        let loader = SettingsLoader::new().with_overrides(overrides);
        Ok(match &self.config {
            Some(path) => loader.with_file(path),
            None => loader,
        })
    }

    fn target_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => get_config_path(),
        }
    }

    pub async fn execute(self) -> Result<()> {
        match &self.command {
            Commands::Check => execute_check(&self),
            Commands::Show => execute_show(&self),
            Commands::Path => {
                println!("{}", self.target_path()?.display());
                Ok(())
            }
            Commands::Init { force } => {
                let path = self.target_path()?;
                init_config_file(&path, *force).await?;
                println!("✅ Configuration template written to {}", path.display());
                Ok(())
            }
            Commands::Set { key, value } => {
                let path = self.target_path()?;
                let field = set_config_value(&path, key, value).await?;
                let shown = if field.kind == FieldKind::Secret { MASK } else { value.as_str() };
                println!("✅ Configuration updated: {} = {}", field.key, shown);
                Ok(())
            }
            Commands::Keys => execute_keys(&self),
            Commands::Completions { shell } => {
                let mut command = Cli::command();
                clap_complete::generate(*shell, &mut command, "mmconf", &mut std::io::stdout());
                Ok(())
            }
        }
    }
}

#[derive(Serialize)]
struct CheckOutput {
    valid: bool,
    config_path: Option<String>,
    warnings: Vec<String>,
}

fn execute_check(cli: &Cli) -> Result<()> {
    let report = cli.loader()?.load()?;

    let output = CheckOutput {
        valid: true,
        config_path: report.config_path.as_ref().map(|p| p.display().to_string()),
        warnings: report.warnings.iter().map(ToString::to_string).collect(),
    };

    if cli.format != OutputFormat::Table {
        println!("{}", render_structured(&output, cli.format)?);
        return Ok(());
    }

    println!("✅ Configuration is valid");
    match &output.config_path {
        Some(path) => println!("   file: {path}"),
        None => println!("   file: <none, defaults and environment only>"),
    }
    for warning in &output.warnings {
        println!("⚠️  {warning}");
    }
    Ok(())
}

#[derive(Tabled)]
struct ConfigItem {
    #[tabled(rename = "Setting")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: String,
}

fn execute_show(cli: &Cli) -> Result<()> {
    let resolved = cli.loader()?.resolve()?;

    if cli.format != OutputFormat::Table {
        println!("{}", render_structured(&resolved.document.masked(), cli.format)?);
        return Ok(());
    }

    let items: Vec<ConfigItem> = FIELDS
        .iter()
        .map(|field| ConfigItem {
            key: field.key.to_string(),
            value: resolved.document.display_value(field),
            source: resolved.source_of(field.key).to_string(),
        })
        .collect();

    println!("{}", format_table(Table::new(&items), cli.no_color));
    Ok(())
}

#[derive(Tabled, Serialize)]
struct KeyItem {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Environment")]
    env: &'static str,
    #[tabled(rename = "Default")]
    default: String,
}

fn execute_keys(cli: &Cli) -> Result<()> {
    let template = SettingsDocument::template();
    let items: Vec<KeyItem> = FIELDS
        .iter()
        .map(|field| KeyItem {
            key: field.key,
            env: field.env,
            default: template.display_value(field),
        })
        .collect();

    if cli.format != OutputFormat::Table {
        println!("{}", render_structured(&items, cli.format)?);
    } else {
        println!("{}", format_table(Table::new(&items), cli.no_color));
    }
    Ok(())
}

/// Write the default template to `path`, refusing to replace an existing file unless `force`
pub async fn init_config_file(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(MindmapError::invalid_argument(format!(
            "{} already exists; use --force to overwrite it",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let contents = format!("{TEMPLATE_HEADER}{}", SettingsDocument::template().to_toml_string()?);
    tokio::fs::write(path, contents).await?;
    info!(path = %path.display(), "configuration template written");
    Ok(())
}

/// On-disk format of an existing config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Json,
}

fn parse_existing(path: &Path, contents: &str) -> Result<(SettingsDocument, FileFormat)> {
    if let Ok(document) = SettingsDocument::from_toml_str(contents) {
        return Ok((document, FileFormat::Toml));
    }
    SettingsDocument::from_json_str(contents)
        .map(|document| (document, FileFormat::Json))
        .map_err(|e| {
            MindmapError::configuration(path.display().to_string(), format!("failed to parse: {e}"))
        })
}

/// Comment and blank lines at the top of a TOML file
fn leading_comments(contents: &str) -> String {
    let mut header = String::new();
    for line in contents.lines() {
        let trimmed = line.trim();
        if !(trimmed.is_empty() || trimmed.starts_with('#')) {
            break;
        }
        header.push_str(line);
        header.push('\n');
    }
    header
}

/// Update one key in the file at `path`, creating the file if needed.
///
/// The value is checked with the same per-key rules as a full load before
/// anything is written. An existing file keeps its format and its leading
/// comment block.
pub async fn set_config_value(path: &Path, key: &str, value: &str) -> Result<&'static FieldSpec> {
    let (mut document, format, header) = if path.exists() {
        let contents = tokio::fs::read_to_string(path).await?;
        let (document, format) = parse_existing(path, &contents)?;
        (document, format, leading_comments(&contents))
    } else {
        (SettingsDocument::new(), FileFormat::Toml, TEMPLATE_HEADER.to_string())
    };

    let field = document.set(key, value)?;
    Settings::validate_field(&document, field)?;
    if field.kind == FieldKind::Secret && !value.trim().is_empty() {
        warn!(key = field.key, "secret written to config file; prefer {}", field.env);
    }

    let contents = match format {
        FileFormat::Toml => format!("{header}{}", document.to_toml_string()?),
        FileFormat::Json => format!("{}\n", serde_json::to_string_pretty(&document)?),
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(field)
}
