//! CLI commands

mod generate;
mod models;

pub use generate::generate_command;
pub use models::models_command;
