//! Command handlers, one module per resource.

pub mod account;
pub mod auth;
pub mod config_cmd;
pub mod dictionary;
pub mod expenses;
pub mod history;
pub mod offline;
pub mod reminders;
pub mod stations;
pub mod util;
pub mod vehicles;

use motorlog_core::Garage;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a backend command to its handler. `Config` and `Completions`
/// never reach here.
pub async fn dispatch(cmd: Command, garage: &Garage, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Auth(args) => auth::handle(garage, args, global).await,
        Command::Account(args) => account::handle(garage, args, global).await,
        Command::Vehicles(args) => vehicles::handle(garage, args, global).await,
        Command::Reminders(args) => reminders::handle(garage, args, global).await,
        Command::History(args) => history::handle(garage, args, global).await,
        Command::Expenses(args) => expenses::handle(garage, args, global).await,
        Command::Stations(args) => stations::handle(garage, args, global).await,
        Command::Dictionary(args) => dictionary::handle(garage, &args, global).await,
        Command::Offline(args) => offline::handle(garage, args, global),
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
