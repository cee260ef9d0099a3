//! Validate-km command implementation

use crate::cli::{Cli, ValidateKmArgs};
use crate::output::OutputWriter;
use crate::storage::Storage;
use anyhow::Result;
use roadspan_core::config::LayeredConfig;
use roadspan_core::models::{HighwayId, KmRange};
use roadspan_resolve::Resolver;
use tabled::Tabled;

#[derive(Tabled)]
struct GapRow {
    #[tabled(rename = "From km")]
    start: f64,
    #[tabled(rename = "To km")]
    end: f64,
}

pub async fn execute(
    cli: &Cli,
    args: &ValidateKmArgs,
    layered: &LayeredConfig,
    output: &OutputWriter,
) -> Result<()> {
    let settings = layered.settings()?;
    let storage = Storage::new(cli.storage, cli.reference.as_deref()).await?;
    let resolver = Resolver::new(storage.highways, storage.segments, settings);

    let range = KmRange::new(args.km_start, args.km_end);
    let validation = resolver.validate_km(HighwayId(args.highway_id), range).await?;

    if output.is_json() {
        output.result(&validation)?;
        return Ok(());
    }

    output.kv("Highway", format!("#{}", args.highway_id));
    output.kv("Range", range);
    output.kv("Checked against", format!("{:?}", validation.coverage));

    if let Some(warning) = &validation.warning {
        output.warning(warning);
    }

    if validation.valid {
        output.success("Range is covered by reference data");
    } else {
        output.warning(format!("{} uncovered stretch(es)", validation.gaps.len()));
        output.table(
            validation
                .gaps
                .iter()
                .map(|gap| GapRow { start: gap.start, end: gap.end })
                .collect(),
        );
    }
    Ok(())
}
