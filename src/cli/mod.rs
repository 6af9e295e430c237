pub mod app;
pub mod commands;
pub mod output;
pub mod validation;

pub use app::Cli;
