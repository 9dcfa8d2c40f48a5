use crate::command::{
    test::{self, TestOutputArg},
    train::{self, TrainArg},
};

const DEFAULT_TEST_EPISODES: usize = 10;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RunArg {
    #[clap(flatten)]
    train: TrainArg,
    /// Number of test games played after training
    #[arg(long, default_value_t = DEFAULT_TEST_EPISODES)]
    test_episodes: usize,
    #[clap(flatten)]
    output: TestOutputArg,
}

impl Default for RunArg {
    fn default() -> Self {
        Self {
            train: TrainArg::default(),
            test_episodes: DEFAULT_TEST_EPISODES,
            output: TestOutputArg::default(),
        }
    }
}

pub(crate) fn run(arg: &RunArg) -> anyhow::Result<()> {
    let config = arg.train.board.to_config()?;
    let mut agent = arg.train.agent.build_agent()?;
    train::load_for_training(&mut agent, &arg.train.q_table.path);
    train::train_and_save(&mut agent, config, &arg.train)?;
    test::test_agent(agent, config, arg.test_episodes, &arg.output)
}
