//! Service-station handlers.

use tabled::Tabled;

use motorlog_core::{Garage, ServiceStation};

use crate::cli::{GlobalOpts, StationsArgs, StationsCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct StationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Rating")]
    rating: String,
}

impl From<&ServiceStation> for StationRow {
    fn from(s: &ServiceStation) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            address: output::opt(s.address.as_ref()),
            distance: s
                .distance_km
                .map(|d| format!("{d:.1} km"))
                .unwrap_or_default(),
            rating: s.rating.map(|r| format!("{r:.1}")).unwrap_or_default(),
        }
    }
}

fn print_stations(global: &GlobalOpts, stations: &[ServiceStation]) {
    let out = output::render_list(
        &global.output,
        stations,
        |s| StationRow::from(s),
        |s| s.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

pub async fn handle(
    garage: &Garage,
    args: StationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        StationsCommand::Nearby { lat, lng, radius } => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(CliError::Validation {
                    field: "coordinates".into(),
                    reason: format!("{lat},{lng} is not a valid position"),
                });
            }
            let stations = garage.get_service_stations(lat, lng, radius).await?;
            print_stations(global, &stations);
            Ok(())
        }

        StationsCommand::Saved => {
            let stations = garage.get_user_stations().await?;
            print_stations(global, &stations);
            Ok(())
        }

        StationsCommand::Save { id } => {
            let station = garage.save_user_station(&id).await?;
            let name = if station.name.is_empty() {
                id.to_string()
            } else {
                station.name
            };
            output::print_done(global, &format!("Saved {name}"));
            Ok(())
        }
    }
}
