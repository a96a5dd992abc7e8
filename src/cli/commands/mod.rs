//! Command execution.

mod release;

use crate::cli::{Args, OutputManager};
use crate::error::Result;

use release::execute_release;

/// Execute the release described by the parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    let output = OutputManager::new(false);

    if let Err(validation_error) = args.validate() {
        output.error(&format!("Invalid arguments: {validation_error}"));
        return Ok(1);
    }

    execute_release(&args, &output).await
}
