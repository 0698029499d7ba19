use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app_config::ChoreographyConfig;

/// Named states of the ceremony choreography
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Opening shot
    #[default]
    Establish,
    /// Vows are exchanged
    Vows,
    /// Waiting for the ceremony action
    Before,
    /// Song starts after the ceremony action
    Singing,
    Kiss,
    Celebration,
    /// Final tableau, waiting for the replay action
    Freeze,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Establish,
        Stage::Vows,
        Stage::Before,
        Stage::Singing,
        Stage::Kiss,
        Stage::Celebration,
        Stage::Freeze,
    ];

    /// The delay-based transition this stage owns, if any.
    ///
    /// `Before` and `Freeze` have none: they wait for the user.
    pub fn timed_transition(self, config: &ChoreographyConfig) -> Option<(Duration, Stage)> {
        let (delay_ms, next) = match self {
            Stage::Establish => (config.establish_ms, Stage::Vows),
            Stage::Vows => (config.vows_ms, Stage::Before),
            Stage::Singing => (config.singing_ms, Stage::Kiss),
            Stage::Kiss => (config.kiss_ms, Stage::Celebration),
            Stage::Celebration => (config.celebration_ms, Stage::Freeze),
            Stage::Before | Stage::Freeze => return None,
        };
        Some((Duration::from_millis(delay_ms), next))
    }

    /// Whether the ceremony action does anything in this stage
    pub fn accepts_advance(self) -> bool {
        matches!(self, Stage::Before | Stage::Freeze)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Establish => write!(f, "establish"),
            Stage::Vows => write!(f, "vows"),
            Stage::Before => write!(f, "before"),
            Stage::Singing => write!(f, "singing"),
            Stage::Kiss => write!(f, "kiss"),
            Stage::Celebration => write!(f, "celebration"),
            Stage::Freeze => write!(f, "freeze"),
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "establish" => Ok(Stage::Establish),
            "vows" => Ok(Stage::Vows),
            "before" => Ok(Stage::Before),
            "singing" => Ok(Stage::Singing),
            "kiss" => Ok(Stage::Kiss),
            "celebration" => Ok(Stage::Celebration),
            "freeze" => Ok(Stage::Freeze),
            _ => Err(anyhow::anyhow!("Invalid stage: {}", s)),
        }
    }
}
