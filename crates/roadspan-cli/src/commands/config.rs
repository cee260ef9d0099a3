//! Config command implementation

use crate::output::OutputWriter;
use anyhow::Result;
use roadspan_core::config::LayeredConfig;
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
struct ConfigRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: String,
}

pub fn execute(layered: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mut rows: Vec<ConfigRow> = layered
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: format!("{:?}", source) })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    let validation = layered.settings();

    if output.is_json() {
        output.result(serde_json::json!({
            "values": rows,
            "valid": validation.is_ok(),
            "error": validation.err().map(|e| e.to_string()),
        }))?;
        return Ok(());
    }

    output.section("Resolver Configuration");
    output.table(rows);
    match validation {
        Ok(_) => output.success("Configuration is valid"),
        Err(e) => output.warning(format!("Configuration is invalid: {}", e)),
    }
    Ok(())
}
