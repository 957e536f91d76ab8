//! Engine configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::strategy::{
    BarrierStrategy, DependencyCounterStrategy, SequentialStrategy, SolveStrategy,
};

/// Scheduling strategy used to distribute back-substitution across workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Single-threaded reference solve (requires exactly one worker)
    Sequential,
    /// Round-robin ownership, broadcast of each solved unknown, barrier per step
    Barrier,
    /// Per-row dependency counters, no global barrier
    DependencyCounter,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::Sequential,
        Strategy::Barrier,
        Strategy::DependencyCounter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Barrier => "barrier",
            Strategy::DependencyCounter => "dependency-counter",
        }
    }

    /// Concrete implementation of this strategy.
    pub fn backend(self) -> Box<dyn SolveStrategy> {
        match self {
            Strategy::Sequential => Box::new(SequentialStrategy),
            Strategy::Barrier => Box::new(BarrierStrategy),
            Strategy::DependencyCounter => Box::new(DependencyCounterStrategy),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown strategy {0:?} (expected sequential, barrier or dependency-counter)")]
pub struct ParseStrategyError(String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| ParseStrategyError(s.to_string()))
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Number of workers `P` (must satisfy `1 <= P <= n`)
    pub workers: usize,
    /// Scheduling strategy
    pub strategy: Strategy,
    /// Longest a worker may wait on a peer before the solve is declared stalled
    #[serde(rename = "step_timeout_ms", with = "millis")]
    pub step_timeout: Duration,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            strategy: Strategy::Barrier,
            step_timeout: Duration::from_secs(30),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_names_parse_back() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.as_str().parse::<Strategy>(), Ok(strategy));
        }
        assert_eq!(
            "Dependency_Counter".parse::<Strategy>(),
            Ok(Strategy::DependencyCounter)
        );
        assert!("openmp".parse::<Strategy>().is_err());
    }

    #[test]
    fn backend_names_match_strategy() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.backend().name(), strategy.as_str());
        }
    }

    #[test]
    fn config_reads_millisecond_timeout() {
        let config: SolverConfig =
            serde_json::from_str(r#"{"workers": 4, "strategy": "dependency-counter", "step_timeout_ms": 250}"#)
                .expect("valid config");
        assert_eq!(config.workers, 4);
        assert_eq!(config.strategy, Strategy::DependencyCounter);
        assert_eq!(config.step_timeout, Duration::from_millis(250));

        let defaults: SolverConfig = serde_json::from_str("{}").expect("empty config");
        assert_eq!(defaults, SolverConfig::default());
    }
}
