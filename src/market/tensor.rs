//! Tensor marketplace API client.
//!
//! Thin typed wrapper over the four REST endpoints the seller consumes.
//! Every request carries the `x-tensor-api-key` header. Calls are
//! single-attempt: no retries, no rate limiting. The first failure
//! aborts the run.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::TensorConfig;
use crate::market::models::{CollectionBid, CollectionHolding, EncodedSaleTx, OwnedMint};

const API_KEY_HEADER: &str = "x-tensor-api-key";
const ERROR_BODY_SNIPPET_LEN: usize = 220;

#[derive(Debug, Error)]
pub enum TensorApiError {
    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("tensor api http {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },

    #[error("failed to decode tensor response: {source}. body={body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

/// Parameters for the sale transaction builder endpoint.
///
/// `bid_address` is the explicit selection outcome; the API contract wants
/// an empty `bidAddress` query value when no bid was selected, and that
/// mapping happens here, nowhere upstream.
#[derive(Debug, Clone)]
pub struct SellTxRequest {
    pub seller: String,
    pub mint: String,
    pub bid_address: Option<String>,
    pub min_price_lamports: u64,
    pub blockhash: String,
}

impl SellTxRequest {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("seller", self.seller.clone()),
            ("mint", self.mint.clone()),
            ("bidAddress", self.bid_address.clone().unwrap_or_default()),
            ("minPrice", self.min_price_lamports.to_string()),
            ("blockhash", self.blockhash.clone()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct BidsResponse {
    bids: Vec<CollectionBid>,
}

#[derive(Debug, Deserialize)]
struct InventoryResponse {
    mints: Vec<OwnedMint>,
}

#[derive(Debug, Deserialize)]
struct SellTxResponse {
    txs: Vec<EncodedSaleTx>,
}

pub struct TensorClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    bid_limit: u32,
    mint_limit: u32,
}

impl TensorClient {
    pub fn new(config: &TensorConfig, api_key: SecretString) -> Result<Self, TensorApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(TensorApiError::Transport)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            bid_limit: config.bid_limit,
            mint_limit: config.mint_limit,
        })
    }

    /// Collections the wallet holds, compressed NFTs included.
    #[instrument(skip(self))]
    pub async fn portfolio(
        &self,
        wallet: &str,
    ) -> Result<Vec<CollectionHolding>, TensorApiError> {
        self.get_json(
            "/user/portfolio",
            &[
                ("wallet", wallet.to_string()),
                ("includeCompressed", "true".to_string()),
            ],
        )
        .await
    }

    /// Open bids on a collection, best-first as the API returns them.
    #[instrument(skip(self))]
    pub async fn collection_bids(
        &self,
        coll_id: &str,
    ) -> Result<Vec<CollectionBid>, TensorApiError> {
        let response: BidsResponse = self
            .get_json(
                "/collections/coll_bids",
                &[
                    ("collId", coll_id.to_string()),
                    ("limit", self.bid_limit.to_string()),
                ],
            )
            .await?;
        Ok(response.bids)
    }

    /// The wallet's owned mints inside one collection.
    #[instrument(skip(self))]
    pub async fn inventory(
        &self,
        wallet: &str,
        coll_id: &str,
    ) -> Result<Vec<OwnedMint>, TensorApiError> {
        let response: InventoryResponse = self
            .get_json(
                "/user/inventory_by_collection",
                &[
                    ("wallet", wallet.to_string()),
                    ("collId", coll_id.to_string()),
                    ("limit", self.mint_limit.to_string()),
                ],
            )
            .await?;
        Ok(response.mints)
    }

    /// Ask Tensor to build the unsigned sale transaction(s).
    #[instrument(skip(self, request), fields(mint = %request.mint))]
    pub async fn sell_transactions(
        &self,
        request: &SellTxRequest,
    ) -> Result<Vec<EncodedSaleTx>, TensorApiError> {
        let response: SellTxResponse =
            self.get_json("/tx/sell", &request.query_pairs()).await?;
        Ok(response.txs)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TensorApiError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .query(query)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .send()
            .await
            .map_err(TensorApiError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(TensorApiError::Transport)?;

        if !status.is_success() {
            return Err(TensorApiError::HttpStatus {
                status,
                body: summarize_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| TensorApiError::Decode {
            source,
            body: summarize_body(&body),
        })
    }
}

fn summarize_body(body: &str) -> String {
    body.chars().take(ERROR_BODY_SNIPPET_LEN).collect()
}
