//! Vehicle command handlers.

use tabled::Tabled;

use motorlog_core::{Garage, Vehicle, VehicleInput};

use crate::cli::{GlobalOpts, VehicleDetails, VehiclesArgs, VehiclesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct VehicleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Vehicle")]
    name: String,
    #[tabled(rename = "Year")]
    year: String,
    #[tabled(rename = "Plate")]
    plate: String,
    #[tabled(rename = "Mileage")]
    mileage: String,
}

impl From<&Vehicle> for VehicleRow {
    fn from(v: &Vehicle) -> Self {
        Self {
            id: v.id.to_string(),
            name: format!("{} {}", v.brand, v.model),
            year: output::opt(v.year),
            plate: output::opt(v.license_plate.as_ref()),
            mileage: output::opt(v.mileage),
        }
    }
}

fn detail(v: &Vehicle) -> String {
    output::detail_block(&[
        ("ID", v.id.to_string()),
        ("Brand", v.brand.clone()),
        ("Model", v.model.clone()),
        ("Year", output::opt(v.year)),
        ("VIN", output::opt(v.vin.as_ref())),
        ("Plate", output::opt(v.license_plate.as_ref())),
        ("Mileage", output::opt(v.mileage)),
        ("Fuel", output::opt(v.fuel_type.as_ref())),
        ("Colour", output::opt(v.color.as_ref())),
    ])
}

/// Overlay the given flags on an existing record.
fn merge(
    current: &Vehicle,
    brand: Option<String>,
    model: Option<String>,
    d: VehicleDetails,
) -> VehicleInput {
    VehicleInput {
        brand: brand.unwrap_or_else(|| current.brand.clone()),
        model: model.unwrap_or_else(|| current.model.clone()),
        year: d.year.or(current.year),
        vin: d.vin.or_else(|| current.vin.clone()),
        license_plate: d.plate.or_else(|| current.license_plate.clone()),
        mileage: d.mileage.or(current.mileage),
        fuel_type: d.fuel.or_else(|| current.fuel_type.clone()),
        color: d.paint.or_else(|| current.color.clone()),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    garage: &Garage,
    args: VehiclesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        VehiclesCommand::List => {
            let fetched = garage.get_vehicles().await?;
            output::print_source(global, &fetched.source);
            let out = output::render_list(
                &global.output,
                &fetched.data,
                |v| VehicleRow::from(v),
                |v| v.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VehiclesCommand::Get { id } => {
            let fetched = garage.get_vehicle(&id).await?;
            output::print_source(global, &fetched.source);
            let out = output::render_single(&global.output, &fetched.data, detail, |v| {
                v.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VehiclesCommand::Add {
            brand,
            model,
            details,
        } => {
            let input = merge(&Vehicle::default(), Some(brand), Some(model), details);
            if let Some(vehicle) = util::settle(garage.add_vehicle(&input).await, global)? {
                output::print_done(global, &format!("Vehicle {} added", vehicle.id));
                let out = output::render_single(&global.output, &vehicle, detail, |v| {
                    v.id.to_string()
                });
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        VehiclesCommand::Update {
            id,
            brand,
            model,
            details,
        } => {
            let current = garage.get_vehicle(&id).await?.data;
            let input = merge(&current, brand, model, details);
            if let Some(vehicle) = util::settle(garage.update_vehicle(&id, &input).await, global)? {
                output::print_done(global, &format!("Vehicle {} updated", vehicle.id));
            }
            Ok(())
        }

        VehiclesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete vehicle {id} and its records?"), global.yes)? {
                return Ok(());
            }
            if util::settle(garage.delete_vehicle(&id).await, global)?.is_some() {
                output::print_done(global, &format!("Vehicle {id} deleted"));
            }
            Ok(())
        }
    }
}
