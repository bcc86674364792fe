use crate::gambler::{Gambler, HighRiskGambler, StableGambler, StreakGambler};
use crate::Money;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs::OpenOptions;
use std::io;

#[derive(Debug)]
pub enum ConfigError {
    Io(String, io::Error),
    Parse(String, serde_json::Error),
    InvalidGambler(String, &'static str),
    EmptyRoster(),
}

impl Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(fname, e) => write!(f, "Error opening roster {}: {}", fname, e),
            ConfigError::Parse(fname, e) => write!(f, "Error parsing roster from {}: {}", fname, e),
            ConfigError::InvalidGambler(name, why) => write!(f, "Gambler {}: {}", name, why),
            ConfigError::EmptyRoster() => write!(f, "Roster has no gamblers"),
        }
    }
}

/// How to build one gambler. Rosters are JSON arrays of these, e.g.
/// `{"strategy": "stable", "name": "Alice", "balance": 100, "target": 150, "bet": 10}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum GamblerSpec {
    Stable {
        name: String,
        balance: Money,
        target: Money,
        bet: Money,
    },
    HighRisk {
        name: String,
        balance: Money,
        target: Money,
        yolo: Money,
    },
    Streak {
        name: String,
        balance: Money,
        target: Money,
        initial_bet: Money,
        minimum: Money,
    },
}

fn check(name: &str, ok: bool, why: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidGambler(name.to_string(), why))
    }
}

impl GamblerSpec {
    pub fn name(&self) -> &str {
        match self {
            GamblerSpec::Stable { name, .. }
            | GamblerSpec::HighRisk { name, .. }
            | GamblerSpec::Streak { name, .. } => name,
        }
    }

    pub fn build(&self) -> Result<Box<dyn Gambler>, ConfigError> {
        let name = self.name();
        let (balance, target) = match self {
            GamblerSpec::Stable {
                balance, target, ..
            }
            | GamblerSpec::HighRisk {
                balance, target, ..
            }
            | GamblerSpec::Streak {
                balance, target, ..
            } => (*balance, *target),
        };
        check(name, balance.is_finite() && balance >= 0.0, "balance must be a non-negative number")?;
        check(name, target.is_finite(), "target must be a number")?;
        let g: Box<dyn Gambler> = match self {
            GamblerSpec::Stable { bet, .. } => {
                check(name, bet.is_finite() && *bet > 0.0, "bet must be positive")?;
                Box::new(StableGambler::new(name, balance, target, *bet))
            }
            GamblerSpec::HighRisk { yolo, .. } => {
                check(name, yolo.is_finite() && *yolo >= 0.0, "yolo must be non-negative")?;
                Box::new(HighRiskGambler::new(name, balance, target, *yolo))
            }
            GamblerSpec::Streak {
                initial_bet,
                minimum,
                ..
            } => {
                check(
                    name,
                    initial_bet.is_finite() && *initial_bet > 0.0,
                    "initial_bet must be positive",
                )?;
                check(name, minimum.is_finite() && *minimum >= 0.0, "minimum must be non-negative")?;
                Box::new(StreakGambler::new(name, balance, target, *initial_bet, *minimum))
            }
        };
        Ok(g)
    }
}

/// Alice, Bob and Camille. All three start at or above their targets.
pub fn classic_specs() -> Vec<GamblerSpec> {
    vec![
        GamblerSpec::Stable {
            name: "Alice".to_string(),
            balance: 100.0,
            target: 15.0,
            bet: 10.0,
        },
        GamblerSpec::HighRisk {
            name: "Bob".to_string(),
            balance: 50.0,
            target: 10.0,
            yolo: 20.0,
        },
        GamblerSpec::Streak {
            name: "Camille".to_string(),
            balance: 200.0,
            target: 10.0,
            initial_bet: 10.0,
            minimum: 2.0,
        },
    ]
}

pub fn classic() -> Vec<Box<dyn Gambler>> {
    // unwrap ok: the classic specs are valid
    build(&classic_specs()).unwrap()
}

pub fn build(specs: &[GamblerSpec]) -> Result<Vec<Box<dyn Gambler>>, ConfigError> {
    if specs.is_empty() {
        return Err(ConfigError::EmptyRoster());
    }
    specs.iter().map(|s| s.build()).collect()
}

pub fn from_str(s: &str) -> Result<Vec<GamblerSpec>, ConfigError> {
    serde_json::from_str(s).map_err(|e| ConfigError::Parse("<string>".to_string(), e))
}

pub fn load(fname: &str) -> Result<Vec<GamblerSpec>, ConfigError> {
    let fd = OpenOptions::new()
        .read(true)
        .open(fname)
        .map_err(|e| ConfigError::Io(fname.to_string(), e))?;
    serde_json::from_reader(fd).map_err(|e| ConfigError::Parse(fname.to_string(), e))
}
