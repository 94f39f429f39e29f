use anyhow::Context;
use clap::{Parser, Subcommand};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Repo automation for smtlab")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write JSON Schemas for the report, run listing and config documents.
    Schema {
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,

        /// Fail instead of writing when a schema file is missing or stale
        #[arg(long, default_value_t = false)]
        check: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Schema { out_dir, check } => {
            let schemas = schemas()?;
            if check {
                check_schemas(&out_dir, &schemas)
            } else {
                write_schemas(&out_dir, &schemas)
            }
        }
    }
}

/// File name and pretty JSON of every published document schema.
fn schemas() -> anyhow::Result<Vec<(&'static str, String)>> {
    Ok(vec![
        (
            "smtlab.report.v1.schema.json",
            serde_json::to_string_pretty(&schema_for!(smtlab_types::RunReport))?,
        ),
        (
            "smtlab.runs.v1.schema.json",
            serde_json::to_string_pretty(&schema_for!(Vec<smtlab_types::RunListing>))?,
        ),
        (
            "smtlab.config.v1.schema.json",
            serde_json::to_string_pretty(&schema_for!(smtlab_types::ConfigFile))?,
        ),
    ])
}

fn write_schemas(out_dir: &Path, schemas: &[(&str, String)]) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create dir {}", out_dir.display()))?;
    for (name, json) in schemas {
        let path = out_dir.join(name);
        fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}

fn check_schemas(out_dir: &Path, schemas: &[(&str, String)]) -> anyhow::Result<()> {
    let mut stale = Vec::new();
    for (name, json) in schemas {
        let path = out_dir.join(name);
        match fs::read_to_string(&path) {
            Ok(existing) if existing == *json => {}
            _ => stale.push(path.display().to_string()),
        }
    }
    if !stale.is_empty() {
        anyhow::bail!(
            "schemas out of date (run `cargo run -p xtask -- schema`): {}",
            stale.join(", ")
        );
    }
    Ok(())
}
