//! Single-shot sale orchestration.
//!
//! Walks the wallet's collections in portfolio order and sells into the
//! first one with an acceptable bid: fetch bids, select, fetch blockhash
//! and mint, request the sale transactions, sign, broadcast, confirm. Any
//! error at any stage aborts the run; only per-collection absence of
//! bids or mints advances the loop.

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::chain::rpc::SolanaRpc;
use crate::chain::tx::SaleTransaction;
use crate::chain::wallet::Wallet;
use crate::config::{AppConfig, Secrets};
use crate::execution::selector;
use crate::market::tensor::{SellTxRequest, TensorClient};

/// Outcome of a successful run: the one sale that was confirmed.
#[derive(Debug, Clone)]
pub struct SaleReceipt {
    pub collection_id: String,
    pub collection_name: String,
    pub mint: String,
    pub bid_address: String,
    pub bid_amount_lamports: u64,
    pub submission_floor_lamports: u64,
    pub signatures: Vec<String>,
}

pub struct Seller {
    tensor: TensorClient,
    rpc: SolanaRpc,
    wallet: Wallet,
}

impl Seller {
    pub fn new(config: &AppConfig, secrets: &Secrets) -> Result<Self> {
        let wallet = Wallet::from_base58_secret(&secrets.private_key)
            .context("Failed to create wallet")?;
        let tensor = TensorClient::new(&config.tensor, secrets.tensor_api_key.clone())
            .context("Failed to create Tensor client")?;
        let rpc = SolanaRpc::new(&config.solana).context("Failed to create RPC client")?;

        info!(wallet = %wallet.pubkey(), "Wallet loaded");

        Ok(Self {
            tensor,
            rpc,
            wallet,
        })
    }

    /// Sell at most one NFT, stopping at the first collection that yields
    /// a confirmed sale.
    pub async fn sell_one(&self, min_price_lamports: Option<u64>) -> Result<SaleReceipt> {
        let wallet_address = self.wallet.pubkey().to_string();
        info!(wallet = %wallet_address, "Starting NFT sale process");

        let portfolio = self
            .tensor
            .portfolio(&wallet_address)
            .await
            .context("Failed to fetch portfolio")?;

        if portfolio.is_empty() {
            bail!("no collections found in portfolio");
        }
        info!(collections = portfolio.len(), "Portfolio fetched");

        for collection in &portfolio {
            let bids = self
                .tensor
                .collection_bids(&collection.id)
                .await
                .with_context(|| format!("Failed to fetch bids for collection {}", collection.id))?;

            let selection = match selector::select_best_bid(&bids, min_price_lamports) {
                Ok(selection) => selection,
                Err(reason) => {
                    info!(collection = %collection.name, %reason, "Skipping collection");
                    continue;
                }
            };

            info!(
                collection = %collection.name,
                bid = %selection.bid.address,
                amount_lamports = selection.bid.amount,
                floor_lamports = selection.submission_floor_lamports,
                "Best bid selected"
            );

            let blockhash = self
                .rpc
                .latest_blockhash()
                .await
                .context("Failed to fetch latest blockhash")?;

            let mints = self
                .tensor
                .inventory(&wallet_address, &collection.id)
                .await
                .with_context(|| {
                    format!("Failed to fetch inventory for collection {}", collection.id)
                })?;

            let Some(owned) = mints.first() else {
                info!(collection = %collection.name, "No mints found, skipping");
                continue;
            };

            let request = SellTxRequest {
                seller: wallet_address.clone(),
                mint: owned.mint.clone(),
                bid_address: Some(selection.bid.address.clone()),
                min_price_lamports: selection.submission_floor_lamports,
                blockhash,
            };

            let txs = self
                .tensor
                .sell_transactions(&request)
                .await
                .context("Failed to build sale transactions")?;

            if txs.is_empty() {
                bail!("sale builder returned no transactions for mint {}", owned.mint);
            }

            let mut signatures = Vec::with_capacity(txs.len());
            for encoded in &txs {
                let signed = SaleTransaction::decode(encoded)
                    .context("Failed to decode sale transaction")?
                    .sign(self.wallet.keypair())
                    .context("Failed to sign sale transaction")?;

                let signature = self
                    .rpc
                    .send_transaction(&signed.to_base64()?)
                    .await
                    .context("Failed to broadcast transaction")?;

                self.rpc
                    .confirm_signature(&signature)
                    .await
                    .context("Transaction was not confirmed")?;

                info!(
                    signature = %signature,
                    format = signed.format(),
                    explorer = %format!("https://solscan.io/tx/{signature}"),
                    "Transaction confirmed"
                );
                signatures.push(signature);
            }

            return Ok(SaleReceipt {
                collection_id: collection.id.clone(),
                collection_name: collection.name.clone(),
                mint: owned.mint.clone(),
                bid_address: selection.bid.address.clone(),
                bid_amount_lamports: selection.bid.amount,
                submission_floor_lamports: selection.submission_floor_lamports,
                signatures,
            });
        }

        bail!("no suitable bids found in any collection")
    }
}
