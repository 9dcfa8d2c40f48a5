//! Minimal ratatui application runner.
//!
//! [`Tui::run`] drives an [`App`]: fixed-rate ticks update state, every state
//! change triggers a redraw, and terminal input is forwarded in between.

mod app;
mod event;
mod event_loop;
mod runner;

pub use self::{app::App, runner::Tui};
