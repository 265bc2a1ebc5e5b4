use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Market-data provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Eodhd,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eodhd => "eodhd",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
