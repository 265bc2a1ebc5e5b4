//! Canonical provider ticker newtype.

use serde::{Deserialize, Serialize};

use crate::error::EnrichError;

/// A validated `CODE.EXCHANGE` ticker.
///
/// The split happens on the FIRST dot only; an exchange segment may itself
/// contain dots (e.g. `BRK-B.NYSE.ARCA` keeps `NYSE.ARCA` intact).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalTicker(String);

impl CanonicalTicker {
    /// Parses a raw ticker string, trimming surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self, EnrichError> {
        let trimmed = input.trim();
        let Some((code, exchange)) = trimmed.split_once('.') else {
            return Err(EnrichError::InvalidTickerFormat {
                ticker: input.to_string(),
            });
        };
        if code.is_empty() || exchange.is_empty() {
            return Err(EnrichError::InvalidTickerFormat {
                ticker: input.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Builds a ticker from already-separated code and exchange segments.
    pub fn from_parts(code: &str, exchange: &str) -> Result<Self, EnrichError> {
        let code = code.trim();
        let exchange = exchange.trim();
        if code.is_empty() || exchange.is_empty() {
            return Err(EnrichError::MissingTickerOrExchange);
        }
        Ok(Self(format!("{code}.{exchange}")))
    }

    /// The instrument code before the first dot.
    pub fn code(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    /// The exchange segment after the first dot (may contain further dots).
    pub fn exchange(&self) -> &str {
        self.0.split_once('.').map(|(_, rest)| rest).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
