use qsweeper_engine::GameState;
use serde::{Deserialize, Serialize};

/// Error returned when a learning hyperparameter is out of range.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("{name} = {value} is out of range, expected {expected}")]
pub struct AgentParamsError {
    name: &'static str,
    value: f64,
    expected: &'static str,
}

/// Hyperparameters of the Q-learning update and exploration schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    /// Step size of the Bellman update (alpha).
    pub learning_rate: f64,
    /// Weight of the best next-state value (gamma).
    pub discount_factor: f64,
    /// Initial probability of a random action (epsilon).
    pub exploration_rate: f64,
    /// Factor applied to epsilon after every training episode.
    pub exploration_decay: f64,
    /// Lower bound for epsilon during training.
    pub min_exploration_rate: f64,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            exploration_rate: 1.0,
            exploration_decay: 0.9995,
            min_exploration_rate: 0.01,
        }
    }
}

impl AgentParams {
    /// Checks that every parameter lies in its meaningful range.
    pub fn validate(&self) -> Result<(), AgentParamsError> {
        check("learning_rate", self.learning_rate, 0.0, false, "0 < alpha <= 1")?;
        check("discount_factor", self.discount_factor, 0.0, true, "0 <= gamma <= 1")?;
        check("exploration_rate", self.exploration_rate, 0.0, true, "0 <= epsilon <= 1")?;
        check("exploration_decay", self.exploration_decay, 0.0, false, "0 < decay <= 1")?;
        check(
            "min_exploration_rate",
            self.min_exploration_rate,
            0.0,
            true,
            "0 <= min epsilon <= 1",
        )?;
        Ok(())
    }
}

fn check(
    name: &'static str,
    value: f64,
    low: f64,
    low_inclusive: bool,
    expected: &'static str,
) -> Result<(), AgentParamsError> {
    let above_low = if low_inclusive { value >= low } else { value > low };
    if above_low && value <= 1.0 {
        Ok(())
    } else {
        Err(AgentParamsError {
            name,
            value,
            expected,
        })
    }
}

/// Reward shaping for a single reveal.
///
/// Revealing several cells at once (a cascade) scores per cell, a single safe
/// reveal scores a small constant, and terminal outcomes dominate both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardParams {
    pub loss: f64,
    pub win: f64,
    pub per_cascaded_cell: f64,
    pub single_reveal: f64,
}

impl Default for RewardParams {
    fn default() -> Self {
        Self {
            loss: -100.0,
            win: 200.0,
            per_cascaded_cell: 5.0,
            single_reveal: 1.0,
        }
    }
}

impl RewardParams {
    /// Reward for a reveal that opened `revealed` cells and left the game in `state`.
    #[must_use]
    pub fn reward(&self, state: GameState, revealed: usize) -> f64 {
        match state {
            GameState::Loss => self.loss,
            GameState::Win => self.win,
            GameState::InProgress if revealed > 1 => {
                #[expect(clippy::cast_precision_loss)]
                let revealed = revealed as f64;
                self.per_cascaded_cell * revealed
            }
            GameState::InProgress => self.single_reveal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(AgentParams::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let params = AgentParams {
            learning_rate: 0.0,
            ..AgentParams::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().starts_with("learning_rate = 0"));

        let params = AgentParams {
            discount_factor: 1.5,
            ..AgentParams::default()
        };
        assert!(params.validate().is_err());

        let params = AgentParams {
            exploration_rate: f64::NAN,
            ..AgentParams::default()
        };
        assert!(params.validate().is_err());

        let params = AgentParams {
            discount_factor: 0.0,
            exploration_rate: 0.0,
            ..AgentParams::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_reward_shape() {
        let rewards = RewardParams::default();
        assert!((rewards.reward(GameState::Loss, 1) - -100.0).abs() < f64::EPSILON);
        assert!((rewards.reward(GameState::Win, 12) - 200.0).abs() < f64::EPSILON);
        assert!((rewards.reward(GameState::InProgress, 1) - 1.0).abs() < f64::EPSILON);
        assert!((rewards.reward(GameState::InProgress, 6) - 30.0).abs() < f64::EPSILON);
    }
}
