use bitcoin::key::CompressedPublicKey;
use bitcoin::secp256k1::{PublicKey, Secp256k1, XOnlyPublicKey};
use bitcoin::{Address, Amount, ScriptBuf, Transaction, TxOut};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::network::Network;

/// Wallet families supported by the marketplace, one per address scheme.
///
/// Each variant owns the full spend recipe for its scheme: how a public key
/// becomes an address and output script ([`resolve_spend`]), and which signing
/// metadata a funding input of that scheme requires
/// ([`populate_funding_input`]). Adding a wallet family is a change local to
/// this enum.
///
/// [`resolve_spend`]: WalletType::resolve_spend
/// [`populate_funding_input`]: WalletType::populate_funding_input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalletType {
    /// Single-key P2WPKH.
    NativeSegwit,
    /// Single-key P2TR (key-spend only).
    Taproot,
    /// P2SH-wrapped P2WPKH.
    NestedSegwit,
}

/// A wallet's resolved spend data for one public key.
#[derive(Debug, Clone)]
pub struct ResolvedSpend {
    pub address: Address,
    /// The script needed to spend outputs paying `address`: the witness
    /// scriptPubKey for native-segwit and taproot, but the inner p2wpkh
    /// redeem script for nested segwit (the outer script is only a hash).
    pub script: ScriptBuf,
    /// X-only internal key, present for taproot spends.
    pub tap_internal_key: Option<XOnlyPublicKey>,
}

impl WalletType {
    /// Derive the address and spend script for `pubkey_hex` on `network`.
    pub fn resolve_spend(&self, pubkey_hex: &str, network: Network) -> Result<ResolvedSpend> {
        let pubkey = parse_pubkey(pubkey_hex)?;
        let network = network.into_bitcoin();
        match self {
            WalletType::NativeSegwit => {
                let address = Address::p2wpkh(&pubkey, network);
                let script = address.script_pubkey();
                Ok(ResolvedSpend {
                    address,
                    script,
                    tap_internal_key: None,
                })
            }
            WalletType::Taproot => {
                let internal_key = internal_key(&pubkey);
                let secp = Secp256k1::new();
                let address = Address::p2tr(&secp, internal_key, None, network);
                let script = address.script_pubkey();
                Ok(ResolvedSpend {
                    address,
                    script,
                    tap_internal_key: Some(internal_key),
                })
            }
            WalletType::NestedSegwit => {
                let redeem = ScriptBuf::new_p2wpkh(&pubkey.wpubkey_hash());
                let address = Address::p2sh(&redeem, network)
                    .map_err(|e| Error::InvalidPublicKey(e.to_string()))?;
                Ok(ResolvedSpend {
                    address,
                    script: redeem,
                    tap_internal_key: None,
                })
            }
        }
    }

    /// Whether funding inputs of this scheme need the whole previous
    /// transaction. Legacy-style signing hashes the entire spent transaction,
    /// not just its output.
    pub fn needs_previous_transaction(&self) -> bool {
        matches!(self, WalletType::NestedSegwit)
    }

    /// Whether callers of this wallet family expect PSBTs in base64 rather
    /// than hex.
    pub fn uses_base64_psbt(&self) -> bool {
        matches!(self, WalletType::NestedSegwit)
    }

    /// Attach the signing metadata for one funding input of `value` sats
    /// paying the resolved spend.
    pub fn populate_funding_input(
        &self,
        input: &mut bitcoin::psbt::Input,
        spend: &ResolvedSpend,
        value: u64,
        prev_tx: Option<Transaction>,
    ) -> Result<()> {
        match self {
            WalletType::NativeSegwit => {
                input.witness_utxo = Some(TxOut {
                    value: Amount::from_sat(value),
                    script_pubkey: spend.script.clone(),
                });
            }
            WalletType::Taproot => {
                input.witness_utxo = Some(TxOut {
                    value: Amount::from_sat(value),
                    script_pubkey: spend.script.clone(),
                });
                input.tap_internal_key = spend.tap_internal_key;
            }
            WalletType::NestedSegwit => {
                let prev_tx = prev_tx.ok_or_else(|| {
                    Error::Psbt("nested-segwit funding input requires the previous transaction".into())
                })?;
                input.redeem_script = Some(spend.script.clone());
                input.non_witness_utxo = Some(prev_tx);
            }
        }
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WalletType::NativeSegwit => "native-segwit",
            WalletType::Taproot => "taproot",
            WalletType::NestedSegwit => "nested-segwit",
        }
    }
}

impl std::str::FromStr for WalletType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "native-segwit" | "segwit" | "p2wpkh" => Ok(WalletType::NativeSegwit),
            "taproot" | "p2tr" => Ok(WalletType::Taproot),
            "nested-segwit" | "p2sh-p2wpkh" => Ok(WalletType::NestedSegwit),
            other => Err(Error::UnsupportedWalletType(other.to_string())),
        }
    }
}

/// Parse a 33-byte compressed public key from hex.
fn parse_pubkey(pubkey_hex: &str) -> Result<CompressedPublicKey> {
    let bytes = hex::decode(pubkey_hex).map_err(|e| Error::InvalidPublicKey(e.to_string()))?;
    if bytes.len() != 33 {
        return Err(Error::InvalidPublicKey(format!(
            "expected 33 bytes, got {}",
            bytes.len()
        )));
    }
    let inner = PublicKey::from_slice(&bytes).map_err(|e| Error::InvalidPublicKey(e.to_string()))?;
    Ok(CompressedPublicKey(inner))
}

/// X-only internal key: the compressed key with its parity byte dropped.
fn internal_key(pubkey: &CompressedPublicKey) -> XOnlyPublicKey {
    pubkey.0.x_only_public_key().0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const PUBKEY: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    #[test]
    fn native_segwit_resolves_to_p2wpkh() {
        let spend = WalletType::NativeSegwit
            .resolve_spend(PUBKEY, Network::Testnet)
            .unwrap();
        assert!(spend.script.is_p2wpkh());
        assert_eq!(spend.script, spend.address.script_pubkey());
        assert!(spend.tap_internal_key.is_none());
    }

    #[test]
    fn taproot_resolves_to_p2tr_with_internal_key() {
        let spend = WalletType::Taproot
            .resolve_spend(PUBKEY, Network::Testnet)
            .unwrap();
        assert!(spend.script.is_p2tr());
        assert_eq!(spend.script, spend.address.script_pubkey());
        let key = spend.tap_internal_key.expect("internal key");
        // x-only key is the compressed key minus its parity byte
        assert_eq!(hex::encode(key.serialize()), PUBKEY[2..]);
    }

    #[test]
    fn nested_segwit_resolves_to_p2sh_with_inner_redeem() {
        let spend = WalletType::NestedSegwit
            .resolve_spend(PUBKEY, Network::Testnet)
            .unwrap();
        assert!(spend.address.script_pubkey().is_p2sh());
        assert!(spend.script.is_p2wpkh());
    }

    #[test]
    fn wrong_length_pubkey_is_rejected() {
        let err = WalletType::NativeSegwit
            .resolve_spend("0279be66", Network::Testnet)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPublicKey(_)));
    }

    #[test]
    fn non_hex_pubkey_is_rejected() {
        let err = WalletType::Taproot
            .resolve_spend("zz79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f817", Network::Testnet)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPublicKey(_)));
    }

    #[test]
    fn unknown_wallet_type_string_is_rejected() {
        let err = WalletType::from_str("multisig").unwrap_err();
        assert!(matches!(err, Error::UnsupportedWalletType(_)));
    }

    #[test]
    fn mainnet_and_testnet_addresses_differ() {
        let main = WalletType::Taproot
            .resolve_spend(PUBKEY, Network::Bitcoin)
            .unwrap();
        let test = WalletType::Taproot
            .resolve_spend(PUBKEY, Network::Testnet)
            .unwrap();
        assert_ne!(main.address.to_string(), test.address.to_string());
        // the witness program itself is network-independent
        assert_eq!(main.script, test.script);
    }
}
