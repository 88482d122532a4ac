//! Local copies and the pending-change queue.

use serde::Serialize;
use tabled::Tabled;

use motorlog_core::{Garage, PendingChange};

use crate::cli::{GlobalOpts, OfflineArgs, OfflineCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "Record")]
    record: String,
    #[tabled(rename = "Recorded")]
    recorded: String,
}

impl From<&PendingChange> for ChangeRow {
    fn from(c: &PendingChange) -> Self {
        Self {
            id: c.id.to_string(),
            change: format!("{} {}", c.kind, c.entity),
            record: c
                .data
                .get("id")
                .map_or_else(|| "(new)".into(), ToString::to_string),
            recorded: c.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Serialize)]
struct OfflineStatus {
    online: bool,
    last_sync: Option<String>,
    pending_changes: usize,
}

fn status_detail(s: &OfflineStatus) -> String {
    output::detail_block(&[
        ("Online", if s.online { "yes" } else { "no" }.into()),
        ("Last sync", s.last_sync.clone().unwrap_or_else(|| "never".into())),
        ("Pending", s.pending_changes.to_string()),
    ])
}

pub fn handle(garage: &Garage, args: OfflineArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        OfflineCommand::Status => {
            let status = OfflineStatus {
                online: garage.is_online(),
                last_sync: garage.last_sync().map(|t| t.to_rfc3339()),
                pending_changes: garage.pending_changes()?.len(),
            };
            let out = output::render_single(&global.output, &status, status_detail, |s| {
                s.pending_changes.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OfflineCommand::Pending => {
            let changes = garage.pending_changes()?;
            let out = output::render_list(
                &global.output,
                &changes,
                |c| ChangeRow::from(c),
                |c| c.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OfflineCommand::Drop { id } => {
            if garage.remove_pending_change(id)? {
                output::print_done(global, &format!("Dropped change {id}"));
                Ok(())
            } else {
                Err(CliError::NotFound {
                    resource_type: "pending change".into(),
                    identifier: id.to_string(),
                    list_command: "offline pending".into(),
                })
            }
        }

        OfflineCommand::Clear => {
            if !util::confirm(
                "Remove every saved copy and all unsent changes?",
                global.yes,
            )? {
                return Ok(());
            }
            garage.clear_all_data()?;
            output::print_done(global, "Local data cleared");
            Ok(())
        }
    }
}
