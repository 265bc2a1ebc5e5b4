mod enrich;
mod search;

use std::sync::Arc;

use serde_json::Value;

use assayer_core::{EnrichError, EnrichmentEngine, EodhdAdapter, ReqwestHttpClient};
use assayer_store::{DuckDbAssetStore, StoreConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let engine = build_engine(cli)?;

    match &cli.command {
        Command::Search(args) => search::run(args, &engine).await,
        Command::Enrich(args) => enrich::run(args, &engine).await,
    }
}

fn build_engine(cli: &Cli) -> Result<EnrichmentEngine, CliError> {
    let config = match &cli.db {
        Some(path) => StoreConfig::at_path(path),
        None => StoreConfig::default(),
    };
    let store = DuckDbAssetStore::open(config).map_err(EnrichError::from)?;

    let source = if cli.mock {
        EodhdAdapter::default()
    } else {
        let api_token = std::env::var("ASSAYER_EODHD_API_KEY")
            .unwrap_or_else(|_| String::from("demo"));
        EodhdAdapter::with_http_client(Arc::new(ReqwestHttpClient::new()), api_token)
    };

    Ok(EnrichmentEngine::new(Arc::new(store), Arc::new(source)))
}
