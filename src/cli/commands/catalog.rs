use crate::cli::OutputFormat;
use crate::errors::{AppError, AppResult};
use crate::gate::{Harness, HarnessSettings};
use crate::script::extract_destinations;
use bitcoin::Network;
use clap::Args;
use serde_json::json;
use std::str::FromStr;

/// Print the script catalog and the probe transaction built from it
#[derive(Args)]
pub struct CatalogCommand {
    /// Network used to encode addresses
    #[arg(long, default_value = "regtest")]
    network: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    format: OutputFormat,
}

impl CatalogCommand {
    pub fn run(&self) -> AppResult<()> {
        println!("{}", self.render()?);
        Ok(())
    }

    fn render(&self) -> AppResult<String> {
        let network = Network::from_str(&self.network)
            .map_err(|e| AppError::Config(format!("Unknown network '{}': {}", self.network, e)))?;
        let harness = Harness::new(HarnessSettings::new(network));
        let built = harness.build_probe()?;

        let entries: Vec<_> = harness
            .settings()
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let destinations = extract_destinations(&entry.script, network);
                json!({
                    "index": index,
                    "label": entry.label,
                    "kind": entry.kind,
                    "type": entry.expected_type,
                    "hex": hex::encode(entry.script.as_bytes()),
                    "reqSigs": destinations.as_ref().map(|d| d.required),
                    "addresses": destinations.map(|d| d.addresses),
                })
            })
            .collect();

        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "network": network.to_string(),
                "txid": built.txid().to_string(),
                "hex": built.hex,
                "outputs": entries,
            }))?),
            OutputFormat::Console => {
                let mut out = String::new();
                out.push_str(&format!("Probe transaction {}\n", built.txid()));
                for entry in &entries {
                    out.push_str(&format!(
                        "  [{}] {:<26} {:<20} type={}\n",
                        entry["index"],
                        entry["label"].as_str().unwrap_or_default(),
                        entry["kind"].as_str().unwrap_or_default(),
                        entry["type"].as_str().unwrap_or_default(),
                    ));
                    if let Some(addresses) = entry["addresses"].as_array() {
                        out.push_str(&format!(
                            "        reqSigs={} addresses={}\n",
                            entry["reqSigs"],
                            serde_json::to_string(addresses)?
                        ));
                    } else {
                        out.push_str("        no derivable destination\n");
                    }
                }
                out.push_str(&format!("Hex: {}\n", built.hex));
                Ok(out)
            }
        }
    }
}
