use ::duckdb::Connection;

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_assets",
        sql: r#"
CREATE TABLE IF NOT EXISTS assets (
    id TEXT PRIMARY KEY,
    portfolio_id TEXT,
    company_id BIGINT,
    ticker TEXT,
    name TEXT,
    exchange TEXT,
    exchange_code TEXT,
    country TEXT,
    country_name TEXT,
    category TEXT,
    sector TEXT,
    industry TEXT,
    description TEXT,
    officers TEXT,
    owner_comment TEXT,
    currency TEXT,
    ticker_eod TEXT,
    isin TEXT,
    asset_class TEXT,
    website_url TEXT,
    logo_url TEXT,
    fiscal_year_end TEXT,
    other_listings TEXT,
    watchlist BOOLEAN NOT NULL DEFAULT FALSE,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS portfolio_links (
    customer_id BIGINT NOT NULL,
    portfolio_id TEXT NOT NULL,
    PRIMARY KEY(customer_id, portfolio_id)
);
"#,
    },
    Migration {
        version: "0002_indexes",
        sql: r#"
CREATE INDEX IF NOT EXISTS idx_assets_portfolio ON assets(portfolio_id);
CREATE INDEX IF NOT EXISTS idx_assets_company ON assets(company_id);
CREATE INDEX IF NOT EXISTS idx_assets_ticker_eod ON assets(ticker_eod);
"#,
    },
];

pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let query = format!(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = '{}'",
            escape_sql_string(migration.version)
        );
        let applied_count: i64 = connection.query_row(query.as_str(), [], |row| row.get(0))?;

        if applied_count == 0 {
            connection.execute_batch(migration.sql)?;
            let insert = format!(
                "INSERT INTO schema_migrations (version) VALUES ('{}')",
                escape_sql_string(migration.version)
            );
            connection.execute_batch(insert.as_str())?;
        }
    }

    Ok(())
}

fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}
