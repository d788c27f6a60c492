// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Porter Directory Client
//!
//! HTTP client for the Porter service that lists available service nodes.
//! Only node selection goes through here; everything cryptographic stays
//! with the network.

use async_trait::async_trait;
use ethers::types::Address;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::cohort::Ursula;
use super::error::SdkError;
use super::CohortDirectory;

#[derive(Debug, Deserialize)]
struct GetUrsulasResponse {
    result: GetUrsulasResult,
}

#[derive(Debug, Deserialize)]
struct GetUrsulasResult {
    ursulas: Vec<Ursula>,
}

/// Parse a `get_ursulas` response body
pub fn parse_get_ursulas(body: &str) -> Result<Vec<Ursula>, serde_json::Error> {
    let response: GetUrsulasResponse = serde_json::from_str(body)?;
    Ok(response.result.ursulas)
}

#[derive(Debug, Clone)]
pub struct PorterClient {
    client: Client,
    base: Url,
    include: Vec<Address>,
    exclude: Vec<Address>,
}

impl PorterClient {
    pub fn new(base: Url) -> Result<Self, SdkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SdkError::Directory {
                endpoint: base.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            base,
            include: Vec::new(),
            exclude: Vec::new(),
        })
    }

    /// Nodes that must be part of every selection
    pub fn with_include(mut self, nodes: Vec<Address>) -> Self {
        self.include = nodes;
        self
    }

    /// Nodes that must never be selected
    pub fn with_exclude(mut self, nodes: Vec<Address>) -> Self {
        self.exclude = nodes;
        self
    }

    /// Endpoint for a `get_ursulas` request
    pub fn get_ursulas_url(&self, quantity: usize) -> Result<Url, SdkError> {
        let mut url = self.base.join("get_ursulas").map_err(|e| SdkError::Directory {
            endpoint: self.base.to_string(),
            reason: e.to_string(),
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("quantity", &quantity.to_string());
            if !self.include.is_empty() {
                query.append_pair("include_ursulas", &join_addresses(&self.include));
            }
            if !self.exclude.is_empty() {
                query.append_pair("exclude_ursulas", &join_addresses(&self.exclude));
            }
        }
        Ok(url)
    }
}

fn join_addresses(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(|a| format!("{:?}", a))
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl CohortDirectory for PorterClient {
    async fn get_ursulas(&self, quantity: usize) -> Result<Vec<Ursula>, SdkError> {
        let url = self.get_ursulas_url(quantity)?;
        let endpoint = url.to_string();
        debug!("Requesting {} ursulas from {}", quantity, endpoint);

        let directory_error = |reason: String| SdkError::Directory {
            endpoint: endpoint.clone(),
            reason,
        };
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| directory_error(e.to_string()))?;
        if !response.status().is_success() {
            return Err(directory_error(format!("HTTP {}", response.status())));
        }
        let body = response
            .text()
            .await
            .map_err(|e| directory_error(e.to_string()))?;
        let ursulas =
            parse_get_ursulas(&body).map_err(|e| directory_error(format!("bad response: {}", e)))?;

        info!("📡 Porter returned {} ursulas", ursulas.len());
        Ok(ursulas)
    }
}
