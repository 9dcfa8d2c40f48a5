use std::path::PathBuf;

use chrono::{DateTime, Utc};
use qsweeper_agent::{AgentParams, RewardParams, TrainingReport};
use qsweeper_engine::BoardConfig;
use serde::{Deserialize, Serialize};

/// Record of a training run, written next to the Q-table on request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub trained_at: DateTime<Utc>,
    pub q_table: PathBuf,
    pub board: BoardConfig,
    pub params: AgentParams,
    pub rewards: RewardParams,
    pub seed: Option<u64>,
    pub report: TrainingReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_json_shape() {
        let summary = TrainingSummary {
            trained_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            q_table: PathBuf::from("qtable.json"),
            board: BoardConfig::new(5, 5, 5).unwrap(),
            params: AgentParams::default(),
            rewards: RewardParams::default(),
            seed: Some(7),
            report: TrainingReport {
                episodes: 100,
                wins: 12,
                final_exploration_rate: 0.95,
                q_table_size: 40,
            },
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["trained_at"], "2023-11-14T22:13:20Z");
        assert_eq!(value["board"]["mines"], 5);
        assert_eq!(value["params"]["learning_rate"], 0.1);
        assert_eq!(value["rewards"]["loss"], -100.0);
        assert_eq!(value["report"]["wins"], 12);

        let back: TrainingSummary = serde_json::from_value(value).unwrap();
        assert_eq!(back.board, summary.board);
        assert_eq!(back.report, summary.report);
    }
}
