use serde_json::Value;

use assayer_core::{EnrichRequest, EnrichScope, EnrichmentEngine};

use crate::cli::{EnrichArgs, EnrichCommand};
use crate::error::CliError;

pub async fn run(args: &EnrichArgs, engine: &EnrichmentEngine) -> Result<Value, CliError> {
    let request = to_request(&args.command)?;
    let report = engine.run(&request).await?;
    Ok(serde_json::to_value(report)?)
}

fn to_request(command: &EnrichCommand) -> Result<EnrichRequest, CliError> {
    let request = match command {
        EnrichCommand::Asset(args) => EnrichRequest {
            asset_id: Some(args.asset_id.clone()),
            query: args.query.clone(),
            exchange: args.exchange.clone(),
            ticker: args.ticker.clone(),
            ..EnrichRequest::new(EnrichScope::Single)
        },
        EnrichCommand::Query(args) => {
            let query = args.query.trim();
            if query.is_empty() {
                return Err(CliError::Command(String::from("query must not be empty")));
            }
            EnrichRequest {
                portfolio_id: Some(args.portfolio.clone()),
                company_id: args.company,
                query: Some(query.to_string()),
                exchange: args.exchange.clone(),
                ..EnrichRequest::new(EnrichScope::Single)
            }
        }
        EnrichCommand::Portfolio(args) => EnrichRequest {
            portfolio_id: Some(args.portfolio_id.clone()),
            skip_enriched: Some(!args.include_enriched),
            concurrency: args.concurrency,
            exchange: args.exchange.clone(),
            ..EnrichRequest::new(EnrichScope::Portfolio)
        },
        EnrichCommand::Company(args) => EnrichRequest {
            company_id: Some(args.company_id),
            skip_enriched: Some(!args.include_enriched),
            concurrency: args.concurrency,
            exchange: args.exchange.clone(),
            ..EnrichRequest::new(EnrichScope::Company)
        },
        EnrichCommand::Customer(args) => EnrichRequest {
            customer_id: Some(args.customer_id),
            skip_enriched: Some(!args.include_enriched),
            concurrency: args.concurrency,
            exchange: args.exchange.clone(),
            ..EnrichRequest::new(EnrichScope::Customer)
        },
    };

    Ok(request)
}
