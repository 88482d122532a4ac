//! Shared helpers for command handlers.

use motorlog_core::{CoreError, EntityId};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Unwrap a mutation result. A change queued while offline is reported and
/// yields `None` instead of failing the command.
pub fn settle<T>(result: Result<T, CoreError>, global: &GlobalOpts) -> Result<Option<T>, CliError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CoreError::QueuedOffline { change_id }) => {
            output::print_done(
                global,
                &format!("Offline: change {change_id} saved locally (see: motorlog offline pending)"),
            );
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Error for an id that the fetched list does not contain.
pub fn not_found(resource_type: &str, id: &EntityId, list_command: &str) -> CliError {
    CliError::NotFound {
        resource_type: resource_type.into(),
        identifier: id.to_string(),
        list_command: list_command.into(),
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
