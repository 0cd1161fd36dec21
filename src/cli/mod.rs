//! # Command Line Interface
//!
//! Operator tooling around the connectors: list them, dump their settings
//! descriptors, provision a form's backend structures, purge the secure
//! records of entries and show the effective configuration.

pub mod output;

use crate::config::{load_config, AppConfig, EnvOverrides};
use crate::domain::{EntryId, EntryStatus, Form, FormId};
use crate::errors::Result as StorageResult;
use crate::observability::{init_logging, log_config_info};
use crate::orchestrator::{EntryLookup, SubmissionOrchestrator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use output::{print_structured, render_table, OutputFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "secure-form-storage")]
#[command(about = "Secure form storage connector tooling")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (json, yaml, table)
    #[arg(short, long, global = true, default_value = "table")]
    pub output: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered connectors
    Connectors,

    /// Show the settings fields of a connector, or the full section for a form
    SettingsFields {
        /// Connector identifier or alias
        #[arg(conflicts_with = "form")]
        connector: Option<String>,

        /// Form definition file (JSON or YAML)
        #[arg(long)]
        form: Option<PathBuf>,
    },

    /// Provision the backend structures of a form
    Provision {
        /// Form definition file (JSON or YAML)
        #[arg(long)]
        form: PathBuf,

        /// Treat the form as newly created
        #[arg(long)]
        new: bool,
    },

    /// Delete the secure records of entries
    Purge {
        /// Form definition file (JSON or YAML)
        #[arg(long)]
        form: PathBuf,

        /// Entry ids, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        entries: Vec<i64>,
    },

    /// Print the effective configuration
    ShowConfig,
}

/// Run CLI commands
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let format: OutputFormat = cli.output.parse()?;

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }
    init_logging(&config.observability)?;
    log_config_info(&config);

    let overrides = EnvOverrides::from_env();
    let orchestrator = SubmissionOrchestrator::from_config(&config, overrides.clone());

    match cli.command {
        Commands::Connectors => list_connectors(&orchestrator, format)?,
        Commands::SettingsFields { connector, form } => {
            settings_fields(&orchestrator, connector.as_deref(), form.as_deref(), format)?
        }
        Commands::Provision { form, new } => {
            let form = load_form(&form)?;
            orchestrator
                .after_form_save(&form, new)
                .await
                .with_context(|| format!("Failed to provision form {}", form.id))?;
            println!("Provisioned secure storage for form {}", form.id);
        }
        Commands::Purge { form, entries } => {
            let form = load_form(&form)?;
            let lookup = ListedEntries(entries.into_iter().map(EntryId::new).collect());
            let report = orchestrator
                .delete_entries(&form, None, &lookup)
                .await
                .with_context(|| format!("Failed to purge entries of form {}", form.id))?;
            println!(
                "Purged {} entries of form {}: {} deleted, {} not found, {} conflicts, {} unsupported",
                report.attempted,
                form.id,
                report.deleted,
                report.not_found,
                report.conflicts,
                report.unsupported
            );
        }
        Commands::ShowConfig => show_config(&config, &overrides, format)?,
    }

    Ok(())
}

/// Entries named on the command line
struct ListedEntries(Vec<EntryId>);

#[async_trait]
impl EntryLookup for ListedEntries {
    async fn entry_ids(
        &self,
        _form_id: FormId,
        _status: Option<EntryStatus>,
    ) -> StorageResult<Vec<EntryId>> {
        Ok(self.0.clone())
    }
}

/// Read a form definition; YAML for `.yaml`/`.yml`, JSON otherwise
pub fn load_form(path: &Path) -> Result<Form> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read form definition {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "yaml" | "yml"));

    if is_yaml {
        serde_yaml::from_str(&raw).with_context(|| format!("Invalid form YAML in {}", path.display()))
    } else {
        serde_json::from_str(&raw).with_context(|| format!("Invalid form JSON in {}", path.display()))
    }
}

#[derive(Serialize)]
struct ConnectorSummary {
    id: String,
    label: String,
}

fn list_connectors(orchestrator: &SubmissionOrchestrator, format: OutputFormat) -> Result<()> {
    let connectors: Vec<ConnectorSummary> = orchestrator
        .registry()
        .labels()
        .into_iter()
        .map(|(id, label)| ConnectorSummary { id, label })
        .collect();

    if format == OutputFormat::Table {
        let rows: Vec<Vec<String>> =
            connectors.iter().map(|c| vec![c.id.clone(), c.label.clone()]).collect();
        print!("{}", render_table(&[("ID", 12), ("LABEL", 30)], &rows));
        return Ok(());
    }
    print_structured(&connectors, format)
}

fn settings_fields(
    orchestrator: &SubmissionOrchestrator,
    connector: Option<&str>,
    form: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    if let Some(path) = form {
        let form = load_form(path)?;
        return print_structured(&orchestrator.form_settings_sections(&form), format);
    }

    let id = connector
        .map(str::to_string)
        .or_else(|| orchestrator.policy().default_connector.clone())
        .context("No connector given")?;
    let connector = orchestrator
        .registry()
        .resolve(&id)
        .with_context(|| format!("Unknown connector '{}'", id))?;

    let fields = connector.settings_fields();
    if format == OutputFormat::Table {
        let rows: Vec<Vec<String>> = fields
            .iter()
            .map(|f| vec![f.name.clone(), f.label.clone(), f.required.to_string()])
            .collect();
        print!("{}", render_table(&[("NAME", 28), ("LABEL", 24), ("REQUIRED", 8)], &rows));
        return Ok(());
    }
    print_structured(&fields, format)
}

#[derive(Serialize)]
struct EffectiveConfig<'a> {
    #[serde(flatten)]
    config: &'a AppConfig,
    /// Names only; values are credentials
    overridden_settings: Vec<&'a str>,
}

fn show_config(config: &AppConfig, overrides: &EnvOverrides, format: OutputFormat) -> Result<()> {
    let effective = EffectiveConfig { config, overridden_settings: overrides.names().collect() };
    match format {
        OutputFormat::Json => output::print_json(&effective),
        OutputFormat::Yaml | OutputFormat::Table => output::print_yaml(&effective),
    }
}
