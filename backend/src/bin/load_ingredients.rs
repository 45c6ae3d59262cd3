//! Import the ingredient catalogue from a JSON file.
//!
//! The file holds an array of `{"name": "...", "measurement_unit": "..."}`
//! objects. Pairs already present are skipped, so the import can be rerun.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use recipes::domain::IngredientDraft;
use recipes::domain::ports::IngredientRepository;
use recipes::outbound::persistence::{DbPool, DieselIngredientRepository, PoolConfig};
use serde::Deserialize;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `load-ingredients` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "load-ingredients",
    about = "Load ingredients from a JSON file into the catalogue",
    version
)]
struct CliArgs {
    /// JSON array of ingredients.
    #[arg(value_name = "file.json")]
    file: PathBuf,
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IngredientRecord {
    name: Option<String>,
    measurement_unit: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct LoadSummary {
    created: usize,
    existing: usize,
    invalid: usize,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let raw = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let records = parse_records(&raw)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;

    let database_url = resolve_database_url(args.database_url)?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .wrap_err("failed to create database pool")?;
    let summary = load(&DieselIngredientRepository::new(pool), records).await?;

    info!(
        created = summary.created,
        existing = summary.existing,
        invalid = summary.invalid,
        "ingredients loaded"
    );
    Ok(())
}

fn parse_records(raw: &[u8]) -> serde_json::Result<Vec<IngredientRecord>> {
    serde_json::from_slice(raw)
}

async fn load<R>(repo: &R, records: Vec<IngredientRecord>) -> Result<LoadSummary>
where
    R: IngredientRepository + ?Sized,
{
    let mut summary = LoadSummary::default();
    for (index, record) in records.into_iter().enumerate() {
        let draft = match IngredientDraft::validate(record.name, record.measurement_unit) {
            Ok(draft) => draft,
            Err(error) => {
                warn!(index, error = %error, "skipping invalid ingredient");
                summary.invalid += 1;
                continue;
            }
        };
        if repo
            .create_if_absent(&draft)
            .await
            .wrap_err_with(|| format!("failed to store ingredient {}", draft.name()))?
        {
            summary.created += 1;
        } else {
            summary.existing += 1;
        }
    }
    Ok(summary)
}

fn resolve_database_url(explicit: Option<String>) -> Result<String> {
    let url = match explicit {
        Some(value) => value,
        None => env::var("DATABASE_URL")
            .map_err(|_| eyre!("database URL missing: set --database-url or DATABASE_URL"))?,
    };
    if url.trim().is_empty() {
        return Err(eyre!("database URL must not be empty"));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    //! Unit tests for parsing and loading.

    use env_lock::lock_env;
    use recipes::outbound::memory::InMemoryStore;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn load_counts_created_existing_and_invalid() {
        let store = InMemoryStore::new();
        let records = parse_records(
            br#"[
                {"name": "flour", "measurement_unit": "g"},
                {"name": "egg", "measurement_unit": "pcs"},
                {"name": "flour", "measurement_unit": "g"},
                {"name": "flour", "measurement_unit": "kg"},
                {"name": "", "measurement_unit": "g"},
                {"measurement_unit": "ml"}
            ]"#,
        )
        .expect("valid json");

        let summary = load(&store, records).await.expect("load");
        assert_eq!(
            summary,
            LoadSummary {
                created: 3,
                existing: 1,
                invalid: 2
            }
        );

        let again = parse_records(br#"[{"name": "egg", "measurement_unit": "pcs"}]"#)
            .expect("valid json");
        let summary = load(&store, again).await.expect("reload");
        assert_eq!(summary.existing, 1);
        assert_eq!(
            IngredientRepository::list(&store, None)
                .await
                .expect("list")
                .len(),
            3
        );
    }

    #[rstest]
    fn non_array_input_is_rejected() {
        assert!(parse_records(br#"{"name": "flour"}"#).is_err());
    }

    #[rstest]
    fn explicit_database_url_wins() {
        let _guard = lock_env([("DATABASE_URL", Some("postgres://env/db".to_owned()))]);
        assert_eq!(
            resolve_database_url(Some("postgres://flag/db".to_owned())).expect("url"),
            "postgres://flag/db"
        );
        assert_eq!(resolve_database_url(None).expect("url"), "postgres://env/db");
    }

    #[rstest]
    #[case(Some("  "))]
    #[case(None)]
    fn missing_or_blank_database_url_fails(#[case] explicit: Option<&str>) {
        let _guard = lock_env([("DATABASE_URL", None::<String>)]);
        assert!(resolve_database_url(explicit.map(str::to_owned)).is_err());
    }
}
