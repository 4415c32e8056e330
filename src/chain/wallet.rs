//! Wallet identity derived from the base58 private key secret.

use secrecy::{ExposeSecret, SecretString};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("private key is not valid base58: {0}")]
    InvalidBase58(#[from] bs58::decode::Error),

    #[error("private key bytes do not form a valid keypair: {0}")]
    InvalidKeyBytes(String),
}

/// The signing identity for the whole run. Built once at startup,
/// read-only afterwards.
pub struct Wallet {
    keypair: Keypair,
}

impl Wallet {
    pub fn from_base58_secret(secret: &SecretString) -> Result<Self, WalletError> {
        let bytes = bs58::decode(secret.expose_secret()).into_vec()?;
        let keypair = Keypair::try_from(bytes.as_slice())
            .map_err(|e| WalletError::InvalidKeyBytes(e.to_string()))?;
        Ok(Self { keypair })
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}
