//! Reminder command handlers.

use tabled::Tabled;

use motorlog_core::{Garage, Reminder, ReminderInput};

use crate::cli::{GlobalOpts, RemindersArgs, RemindersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ReminderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Vehicle")]
    vehicle: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Due km")]
    due_mileage: String,
    #[tabled(rename = "Done")]
    done: String,
}

impl From<&Reminder> for ReminderRow {
    fn from(r: &Reminder) -> Self {
        Self {
            id: r.id.to_string(),
            vehicle: r.vehicle_id.to_string(),
            title: r.title.clone(),
            due: output::opt(r.due_date),
            due_mileage: output::opt(r.due_mileage),
            done: if r.is_completed { "✓".into() } else { String::new() },
        }
    }
}

fn detail(r: &Reminder) -> String {
    output::detail_block(&[
        ("ID", r.id.to_string()),
        ("Vehicle", r.vehicle_id.to_string()),
        ("Title", r.title.clone()),
        ("Type", output::opt(r.reminder_type_id.as_ref())),
        ("Due", output::opt(r.due_date)),
        ("Due km", output::opt(r.due_mileage)),
        (
            "Repeats",
            r.repeat_interval_days
                .map(|d| format!("every {d} days"))
                .unwrap_or_default(),
        ),
        ("Notes", output::opt(r.description.as_ref())),
        ("Done", if r.is_completed { "yes".into() } else { "no".into() }),
    ])
}

/// Input that re-sends `r` with the completed flag set.
fn completed(r: &Reminder) -> ReminderInput {
    ReminderInput {
        vehicle_id: r.vehicle_id.clone(),
        title: r.title.clone(),
        reminder_type_id: r.reminder_type_id.clone(),
        description: r.description.clone(),
        due_date: r.due_date,
        due_mileage: r.due_mileage,
        repeat_interval_days: r.repeat_interval_days,
        is_completed: Some(true),
    }
}

pub async fn handle(
    garage: &Garage,
    args: RemindersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RemindersCommand::List { vehicle, open } => {
            let fetched = garage.get_reminders().await?;
            output::print_source(global, &fetched.source);
            let reminders: Vec<Reminder> = fetched
                .data
                .into_iter()
                .filter(|r| vehicle.as_ref().is_none_or(|v| &r.vehicle_id == v))
                .filter(|r| !(open && r.is_completed))
                .collect();
            let out = output::render_list(
                &global.output,
                &reminders,
                |r| ReminderRow::from(r),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RemindersCommand::Add {
            vehicle,
            title,
            reminder_type,
            due,
            due_mileage,
            repeat_days,
            description,
        } => {
            let input = ReminderInput {
                vehicle_id: vehicle,
                title,
                reminder_type_id: reminder_type,
                description,
                due_date: due,
                due_mileage,
                repeat_interval_days: repeat_days,
                is_completed: None,
            };
            if let Some(reminder) = util::settle(garage.create_reminder(&input).await, global)? {
                output::print_done(global, &format!("Reminder {} created", reminder.id));
                let out = output::render_single(&global.output, &reminder, detail, |r| {
                    r.id.to_string()
                });
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        RemindersCommand::Complete { id } => {
            let reminders = garage.get_reminders().await?.data;
            let current = reminders
                .iter()
                .find(|r| r.id == id)
                .ok_or_else(|| util::not_found("reminder", &id, "reminders list"))?;
            let input = completed(current);
            if util::settle(garage.update_reminder(&id, &input).await, global)?.is_some() {
                output::print_done(global, &format!("Reminder {id} marked done"));
            }
            Ok(())
        }

        RemindersCommand::Delete { id } => {
            if !util::confirm(&format!("Delete reminder {id}?"), global.yes)? {
                return Ok(());
            }
            if util::settle(garage.delete_reminder(&id).await, global)?.is_some() {
                output::print_done(global, &format!("Reminder {id} deleted"));
            }
            Ok(())
        }
    }
}
