use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Identifiers of trade sources used in metadata and envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// Databento historical API.
    Databento,
    /// Local CSV tape in `ts_event,price,size` layout.
    Csv,
}

impl SourceId {
    pub const ALL: [Self; 2] = [Self::Databento, Self::Csv];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Databento => "databento",
            Self::Csv => "csv",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "databento" => Ok(Self::Databento),
            "csv" => Ok(Self::Csv),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_source_from_its_name() {
        for source in SourceId::ALL {
            assert_eq!(SourceId::from_str(source.as_str()), Ok(source));
        }
    }

    #[test]
    fn rejects_unknown_source() {
        let err = SourceId::from_str("polygon").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidSource { .. }));
    }
}
