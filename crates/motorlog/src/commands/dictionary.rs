//! Reference-list handler.

use tabled::Tabled;

use motorlog_core::{CacheSource, DictionaryItem, Garage};

use crate::cli::{DictionaryArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Slug")]
    slug: String,
}

impl From<&DictionaryItem> for ItemRow {
    fn from(i: &DictionaryItem) -> Self {
        Self {
            id: i.id.to_string(),
            name: i.name.clone(),
            slug: output::opt(i.slug.as_ref()),
        }
    }
}

pub async fn handle(
    garage: &Garage,
    args: &DictionaryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let lookup = garage.dictionary(args.resource.into()).await?;
    match lookup.source {
        CacheSource::Fresh => tracing::debug!("served from cache"),
        CacheSource::Network => tracing::debug!("fetched from backend"),
        CacheSource::Stale => tracing::warn!("backend unavailable, showing an expired copy"),
    }

    let out = output::render_list(
        &global.output,
        &lookup.items,
        |i| ItemRow::from(i),
        |i| i.id.to_string(),
    );
    output::print_output(&out, global.quiet);

    // Let the background refresh land in the cache before the process exits.
    if let Some(refresh) = lookup.refresh {
        if let Err(e) = refresh.await {
            tracing::debug!(error = %e, "dictionary refresh did not complete");
        }
    }
    Ok(())
}
