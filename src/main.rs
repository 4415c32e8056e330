use anyhow::{bail, Result};
use clap::Parser;
use rust_decimal::Decimal;
use tracing::info;

use tensor_seller::config::AppConfig;
use tensor_seller::execution::selector;
use tensor_seller::execution::seller::Seller;
use tensor_seller::monitoring::logger;

/// Sell one NFT from the wallet's holdings into the best Tensor bid.
#[derive(Debug, Parser)]
#[command(name = "tensor-seller")]
struct Cli {
    /// Minimum acceptable sale price in SOL (e.g. 0.001)
    min_price_sol: Option<Decimal>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, secrets) = AppConfig::load()?;
    logger::init_logging(&config.monitoring)?;

    let min_price_lamports = match cli.min_price_sol {
        Some(sol) => {
            if sol <= Decimal::ZERO {
                bail!("minimum price must be greater than zero, got {sol}");
            }
            let lamports = selector::sol_to_lamports(sol).ok_or_else(|| {
                anyhow::anyhow!("minimum price of {sol} SOL does not fit in lamports")
            })?;
            Some(lamports)
        }
        None => None,
    };

    info!(min_price_lamports = ?min_price_lamports, "Tensor seller starting");

    let seller = Seller::new(&config, &secrets)?;
    let receipt = seller.sell_one(min_price_lamports).await?;

    info!(
        collection = %receipt.collection_name,
        mint = %receipt.mint,
        bid_amount_lamports = receipt.bid_amount_lamports,
        signatures = ?receipt.signatures,
        "Sale complete"
    );

    Ok(())
}
