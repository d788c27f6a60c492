// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Args;
use ethers::types::Address;
use url::Url;

use crate::config::app::DEFAULT_PORTER_URI;
use crate::sdk::{CohortDirectory, PorterClient};

/// Arguments for ursulas command
#[derive(Args, Debug)]
pub struct UrsulasArgs {
    /// Porter endpoint
    #[arg(long, env = "CBD_PORTER_URI", default_value = DEFAULT_PORTER_URI)]
    pub porter_uri: String,

    /// Number of nodes to request
    #[arg(long, default_value_t = 3)]
    pub quantity: usize,

    /// Comma-separated node addresses that must be selected
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Comma-separated node addresses to exclude
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,
}

fn parse_addresses(raw: &[String]) -> Result<Vec<Address>> {
    raw.iter()
        .map(|a| {
            a.trim()
                .parse::<Address>()
                .map_err(|e| anyhow!("Invalid address {}: {}", a, e))
        })
        .collect()
}

pub async fn list_ursulas(args: UrsulasArgs) -> Result<()> {
    let base = Url::parse(&args.porter_uri).map_err(|e| anyhow!("Invalid porter URI: {}", e))?;
    let client = PorterClient::new(base)?
        .with_include(parse_addresses(&args.include)?)
        .with_exclude(parse_addresses(&args.exclude)?);

    println!("📡 Requesting {} ursulas from {}", args.quantity, args.porter_uri);
    let ursulas = client.get_ursulas(args.quantity).await?;
    for ursula in &ursulas {
        println!("  {:?}  {}", ursula.checksum_address, ursula.uri);
    }
    println!("✅ {} ursulas", ursulas.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addresses() {
        let raw = vec![format!(" 0x{} ", "ab".repeat(20))];
        assert_eq!(parse_addresses(&raw).unwrap(), vec![Address::repeat_byte(0xab)]);
        assert!(parse_addresses(&["0x12".to_string()]).is_err());
    }
}
