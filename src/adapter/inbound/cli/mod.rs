//! CLI module graph.

pub mod check;
pub mod command;
pub mod history;
pub mod output;
pub mod run;
