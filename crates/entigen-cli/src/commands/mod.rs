// Command handlers for the entigen CLI

pub mod config;
pub mod generate;
pub mod plan;
pub mod types;
pub mod validate;

pub use config::{ConfigAction, ConfigCommand};
pub use generate::GenerateCommand;
pub use plan::PlanCommand;
pub use types::TypesCommand;
pub use validate::ValidateCommand;

use crate::error::CliResult;

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self) -> CliResult<()>;
}
