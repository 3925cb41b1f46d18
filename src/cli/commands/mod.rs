//! Command execution functions.

mod list;
mod upload;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::EnvConfig;
use crate::error::Result;

use list::execute_list;
use upload::execute_upload;

/// Execute the command selected by the parsed arguments, returning the exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);
    let env = EnvConfig::from_env();

    let result = match &args.command {
        Command::Upload { .. } => execute_upload(&args.command, &env, &config).await,
        Command::List { release } => execute_list(release, &env, &config).await,
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
