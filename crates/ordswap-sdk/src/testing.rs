//! Test utilities for exercising swap assembly without a live network.
//!
//! [`StaticOracle`] plays back canned inscription, UTXO and fee data so
//! integration tests can cover the full path from coin selection through
//! PSBT construction deterministically.

use crate::error::Result;
use crate::network::Network;
use crate::oracle::{Inscription, Oracle, Utxo};
use crate::swap::FeeConfig;
use crate::wallet::WalletType;

/// secp256k1 generator point G, compressed.
pub const OWNER_PUBKEY: &str =
    "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
/// 2G, compressed.
pub const BUYER_PUBKEY: &str =
    "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";
/// 3G, compressed. Used for the marketplace admin.
pub const ADMIN_PUBKEY: &str =
    "02f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9";

/// An [`Oracle`] that answers from fixed in-memory data.
#[derive(Debug, Default, Clone)]
pub struct StaticOracle {
    pub inscriptions: Vec<Inscription>,
    pub utxos: Vec<Utxo>,
    pub fee_rate: u64,
    /// Raw transactions by txid, for nested-segwit funding inputs.
    pub raw_transactions: Vec<(String, Vec<u8>)>,
}

impl Oracle for StaticOracle {
    fn list_inscriptions(&self, address: &str) -> Result<Vec<Inscription>> {
        Ok(self
            .inscriptions
            .iter()
            .filter(|ins| ins.address == address)
            .cloned()
            .collect())
    }

    fn list_utxos(&self, _address: &str) -> Result<Vec<Utxo>> {
        Ok(self.utxos.clone())
    }

    fn fee_rate(&self) -> Result<u64> {
        Ok(self.fee_rate)
    }

    fn fetch_raw_transaction(&self, txid: &str) -> Result<Vec<u8>> {
        self.raw_transactions
            .iter()
            .find(|(id, _)| id == txid)
            .map(|(_, raw)| raw.clone())
            .ok_or_else(|| crate::error::Error::OracleData(format!("no raw tx for {txid}")))
    }
}

/// A deterministic 64-hex-char txid built from a single byte tag.
pub fn test_txid(tag: u8) -> String {
    hex::encode([tag; 32])
}

/// The seller's taproot address for [`OWNER_PUBKEY`].
pub fn seller_address(network: Network) -> String {
    let spend = WalletType::Taproot
        .resolve_spend(OWNER_PUBKEY, network)
        .expect("valid owner pubkey");
    spend.address.to_string()
}

/// The buyer's address for [`BUYER_PUBKEY`] under the given wallet family.
pub fn buyer_address(wallet_type: WalletType, network: Network) -> String {
    let spend = wallet_type
        .resolve_spend(BUYER_PUBKEY, network)
        .expect("valid buyer pubkey");
    spend.address.to_string()
}

/// Fee config with a 2% marketplace cut paid to a taproot admin address.
pub fn test_fee_config(network: Network) -> FeeConfig {
    let admin = WalletType::Taproot
        .resolve_spend(ADMIN_PUBKEY, network)
        .expect("valid admin pubkey");
    FeeConfig {
        fee_percent: 2,
        admin_address: admin.address.to_string(),
    }
}

/// An inscription sitting at vout 0 of `test_txid(tag)`.
pub fn test_inscription(tag: u8, address: &str, output_value: u64) -> Inscription {
    Inscription {
        address: address.to_string(),
        inscription_id: format!("{}i0", test_txid(tag)),
        inscription_number: i64::from(tag),
        output: format!("{}:0", test_txid(tag)),
        output_value,
    }
}

/// A plain funding UTXO at vout 1 of `test_txid(tag)`.
pub fn funding_utxo(tag: u8, value: u64) -> Utxo {
    Utxo {
        txid: test_txid(tag),
        vout: 1,
        value,
    }
}

/// Serialized previous transaction whose vout 1 pays `value` to the buyer's
/// nested-segwit script, with enough zero-value padding outputs before it.
pub fn raw_funding_transaction(value: u64, network: Network) -> Vec<u8> {
    use bitcoin::absolute::LockTime;
    use bitcoin::consensus::encode::serialize;
    use bitcoin::transaction::Version;
    use bitcoin::{Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Witness};

    let spend = WalletType::NestedSegwit
        .resolve_spend(BUYER_PUBKEY, network)
        .expect("valid buyer pubkey");
    // One placeholder input keeps the legacy encoding round-trippable; a
    // zero-input transaction decodes as a malformed segwit marker.
    let tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::null(),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::default(),
        }],
        output: vec![
            TxOut {
                value: Amount::ZERO,
                script_pubkey: ScriptBuf::new(),
            },
            TxOut {
                value: Amount::from_sat(value),
                script_pubkey: spend.address.script_pubkey(),
            },
        ],
    };
    serialize(&tx)
}
