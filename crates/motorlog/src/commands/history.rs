//! Service-history command handlers.

use tabled::Tabled;

use motorlog_core::{Garage, ServiceRecord, ServiceRecordInput};

use crate::cli::{GlobalOpts, HistoryArgs, HistoryCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Vehicle")]
    vehicle: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Mileage")]
    mileage: String,
    #[tabled(rename = "Cost")]
    cost: String,
}

fn money(amount: Option<f64>, currency: Option<&String>) -> String {
    match (amount, currency) {
        (Some(a), Some(c)) => format!("{a:.2} {c}"),
        (Some(a), None) => format!("{a:.2}"),
        _ => String::new(),
    }
}

impl From<&ServiceRecord> for RecordRow {
    fn from(r: &ServiceRecord) -> Self {
        Self {
            id: r.id.to_string(),
            vehicle: r.vehicle_id.to_string(),
            date: output::opt(r.performed_at),
            service: r.service_type.clone(),
            mileage: output::opt(r.mileage),
            cost: money(r.cost, r.currency.as_ref()),
        }
    }
}

fn detail(r: &ServiceRecord) -> String {
    output::detail_block(&[
        ("ID", r.id.to_string()),
        ("Vehicle", r.vehicle_id.to_string()),
        ("Service", r.service_type.clone()),
        ("Date", output::opt(r.performed_at)),
        ("Mileage", output::opt(r.mileage)),
        ("Cost", money(r.cost, r.currency.as_ref())),
        ("Station", output::opt(r.station_name.as_ref())),
        ("Notes", output::opt(r.description.as_ref())),
    ])
}

pub async fn handle(
    garage: &Garage,
    args: HistoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        HistoryCommand::List { vehicle } => {
            let fetched = match vehicle {
                Some(ref id) => garage.get_vehicle_service_history(id).await?,
                None => garage.get_service_history().await?,
            };
            output::print_source(global, &fetched.source);
            let out = output::render_list(
                &global.output,
                &fetched.data,
                |r| RecordRow::from(r),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HistoryCommand::Add {
            vehicle,
            service_type,
            date,
            mileage,
            cost,
            station,
            description,
        } => {
            let input = ServiceRecordInput {
                vehicle_id: vehicle,
                service_type,
                description,
                performed_at: date,
                mileage,
                cost,
                station_name: station,
            };
            if let Some(record) = util::settle(garage.add_service_record(&input).await, global)? {
                output::print_done(global, &format!("Service record {} added", record.id));
                let out = output::render_single(&global.output, &record, detail, |r| {
                    r.id.to_string()
                });
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        HistoryCommand::Delete { id } => {
            if !util::confirm(&format!("Delete service record {id}?"), global.yes)? {
                return Ok(());
            }
            if util::settle(garage.delete_service_record(&id).await, global)?.is_some() {
                output::print_done(global, &format!("Service record {id} deleted"));
            }
            Ok(())
        }
    }
}
