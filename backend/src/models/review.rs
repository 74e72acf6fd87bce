use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Session-scoped selector between the two review pipelines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewMode {
    /// Generic legal-contract review.
    #[default]
    Legal,
    /// Creator / brand-deal review with deliverable extraction.
    Creator,
}

impl ReviewMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legal => "legal",
            Self::Creator => "creator",
        }
    }
}

impl fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legal" => Ok(Self::Legal),
            "creator" => Ok(Self::Creator),
            _ => Err(()),
        }
    }
}

/// JSON body returned by the upload endpoint on every path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_round_trips_through_str() {
        for mode in [ReviewMode::Legal, ReviewMode::Creator] {
            assert_eq!(mode.as_str().parse::<ReviewMode>(), Ok(mode));
        }
        assert!("brand".parse::<ReviewMode>().is_err());
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReviewMode::Creator).unwrap(),
            "\"creator\""
        );
    }
}
