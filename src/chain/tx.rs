//! Decoding and signing of the sale transactions Tensor builds.
//!
//! The builder endpoint returns each transaction in one of two mutually
//! exclusive base64 wire encodings: `tx` (legacy) or `txV0` (versioned).
//! The format is resolved once here, into a tagged union.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use solana_sdk::signature::Keypair;
use solana_sdk::signer::SignerError;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use thiserror::Error;

use crate::market::models::EncodedSaleTx;

#[derive(Debug, Error)]
pub enum SignTxError {
    #[error("sale transaction carries neither a legacy nor a versioned payload")]
    MissingPayload,

    #[error("decode unsigned tx b64: {0}")]
    DecodeBase64(#[from] base64::DecodeError),

    #[error("deserialize unsigned tx: {0}")]
    Deserialize(bincode::Error),

    #[error("sign tx: {0}")]
    Sign(#[from] SignerError),

    #[error("serialize signed tx: {0}")]
    Serialize(bincode::Error),
}

/// One sale transaction, resolved to its wire format.
#[derive(Debug, Clone)]
pub enum SaleTransaction {
    Legacy(Transaction),
    Versioned(VersionedTransaction),
}

impl SaleTransaction {
    /// Resolve the declared format and deserialize. `txV0` wins when both
    /// fields are populated; neither present is an error, not a skip.
    pub fn decode(encoded: &EncodedSaleTx) -> Result<Self, SignTxError> {
        if let Some(b64) = encoded.tx_v0.as_deref() {
            let raw = BASE64_STANDARD.decode(b64)?;
            let tx: VersionedTransaction =
                bincode::deserialize(&raw).map_err(SignTxError::Deserialize)?;
            return Ok(Self::Versioned(tx));
        }

        if let Some(b64) = encoded.tx.as_deref() {
            let raw = BASE64_STANDARD.decode(b64)?;
            let tx: Transaction = bincode::deserialize(&raw).map_err(SignTxError::Deserialize)?;
            return Ok(Self::Legacy(tx));
        }

        Err(SignTxError::MissingPayload)
    }

    /// Sign with the wallet identity. Legacy transactions sign against the
    /// blockhash already embedded in their message.
    pub fn sign(self, keypair: &Keypair) -> Result<Self, SignTxError> {
        match self {
            Self::Legacy(mut tx) => {
                let blockhash = tx.message.recent_blockhash;
                tx.try_sign(&[keypair], blockhash)?;
                Ok(Self::Legacy(tx))
            }
            Self::Versioned(tx) => {
                let signed = VersionedTransaction::try_new(tx.message, &[keypair])?;
                Ok(Self::Versioned(signed))
            }
        }
    }

    pub fn to_base64(&self) -> Result<String, SignTxError> {
        let raw = match self {
            Self::Legacy(tx) => bincode::serialize(tx).map_err(SignTxError::Serialize)?,
            Self::Versioned(tx) => bincode::serialize(tx).map_err(SignTxError::Serialize)?,
        };
        Ok(BASE64_STANDARD.encode(raw))
    }

    pub fn format(&self) -> &'static str {
        match self {
            Self::Legacy(_) => "legacy",
            Self::Versioned(_) => "v0",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::hash::Hash;
    use solana_sdk::message::{Message, VersionedMessage};
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::{Signature, Signer};
    use solana_sdk::system_instruction;

    fn unsigned_transfer_message(payer: &Pubkey) -> Message {
        let instruction = system_instruction::transfer(payer, &Pubkey::new_unique(), 1);
        let mut message = Message::new(&[instruction], Some(payer));
        message.recent_blockhash = Hash::new_unique();
        message
    }

    fn encode<T: serde::Serialize>(tx: &T) -> String {
        BASE64_STANDARD.encode(bincode::serialize(tx).unwrap())
    }

    #[test]
    fn test_legacy_decode_sign_roundtrip() {
        let keypair = Keypair::new();
        let unsigned = Transaction::new_unsigned(unsigned_transfer_message(&keypair.pubkey()));
        let encoded = EncodedSaleTx {
            tx: Some(encode(&unsigned)),
            tx_v0: None,
        };

        let decoded = SaleTransaction::decode(&encoded).unwrap();
        assert_eq!(decoded.format(), "legacy");

        let signed = decoded.sign(&keypair).unwrap();
        assert!(!signed.to_base64().unwrap().is_empty());
        let SaleTransaction::Legacy(tx) = signed else {
            panic!("expected legacy transaction");
        };
        assert_ne!(tx.signatures[0], Signature::default());
    }

    #[test]
    fn test_versioned_decode_sign_roundtrip() {
        let keypair = Keypair::new();
        let unsigned = VersionedTransaction {
            signatures: vec![Signature::default()],
            message: VersionedMessage::Legacy(unsigned_transfer_message(&keypair.pubkey())),
        };
        let encoded = EncodedSaleTx {
            tx: None,
            tx_v0: Some(encode(&unsigned)),
        };

        let decoded = SaleTransaction::decode(&encoded).unwrap();
        assert_eq!(decoded.format(), "v0");

        let signed = decoded.sign(&keypair).unwrap();
        let SaleTransaction::Versioned(tx) = signed else {
            panic!("expected versioned transaction");
        };
        assert_ne!(tx.signatures[0], Signature::default());
    }

    #[test]
    fn test_versioned_payload_wins_when_both_present() {
        let keypair = Keypair::new();
        let legacy = Transaction::new_unsigned(unsigned_transfer_message(&keypair.pubkey()));
        let versioned = VersionedTransaction {
            signatures: vec![Signature::default()],
            message: VersionedMessage::Legacy(unsigned_transfer_message(&keypair.pubkey())),
        };
        let encoded = EncodedSaleTx {
            tx: Some(encode(&legacy)),
            tx_v0: Some(encode(&versioned)),
        };

        let decoded = SaleTransaction::decode(&encoded).unwrap();
        assert_eq!(decoded.format(), "v0");
    }

    #[test]
    fn test_missing_payload_is_an_error() {
        let encoded = EncodedSaleTx {
            tx: None,
            tx_v0: None,
        };
        let result = SaleTransaction::decode(&encoded);
        assert!(matches!(result, Err(SignTxError::MissingPayload)));
    }

    #[test]
    fn test_garbage_base64_rejected() {
        let encoded = EncodedSaleTx {
            tx: Some("not/base64!!".to_string()),
            tx_v0: None,
        };
        let result = SaleTransaction::decode(&encoded);
        assert!(matches!(result, Err(SignTxError::DecodeBase64(_))));
    }

    #[test]
    fn test_undeserializable_bytes_rejected() {
        let encoded = EncodedSaleTx {
            tx: None,
            tx_v0: Some(BASE64_STANDARD.encode([0xFFu8; 4])),
        };
        let result = SaleTransaction::decode(&encoded);
        assert!(matches!(result, Err(SignTxError::Deserialize(_))));
    }
}
