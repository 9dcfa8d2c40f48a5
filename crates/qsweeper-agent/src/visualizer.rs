use qsweeper_engine::Board;

use crate::EpisodeOutcome;

/// Receiver of board updates while the agent plays test games.
///
/// `show_board` is called once when a new game starts and `redraw` after
/// every move. Implementations must not block for long; the agent waits for
/// each call before its next move.
pub trait Visualizer {
    fn show_board(&mut self, board: &Board);
    fn redraw(&mut self, board: &Board);

    /// Called after the final `redraw` of a game.
    fn episode_finished(&mut self, _episode: usize, _outcome: &EpisodeOutcome) {}
}

/// Visualizer that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Visualizer for Headless {
    fn show_board(&mut self, _board: &Board) {}
    fn redraw(&mut self, _board: &Board) {}
}

impl<V> Visualizer for &mut V
where
    V: Visualizer + ?Sized,
{
    fn show_board(&mut self, board: &Board) {
        (**self).show_board(board);
    }

    fn redraw(&mut self, board: &Board) {
        (**self).redraw(board);
    }

    fn episode_finished(&mut self, episode: usize, outcome: &EpisodeOutcome) {
        (**self).episode_finished(episode, outcome);
    }
}
