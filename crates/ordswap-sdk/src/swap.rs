use std::str::FromStr;

use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode::deserialize as consensus_deserialize;
use bitcoin::transaction::Version;
use bitcoin::{
    Address, Amount, OutPoint, Psbt, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
};

use crate::error::{Error, Result};
use crate::network::Network;
use crate::oracle::{transferable_utxos, Oracle};
use crate::select::{required_fee, select_utxos};
use crate::wallet::WalletType;

/// Marketplace fee parameters, fixed at construction time so builds are
/// deterministic under test.
#[derive(Debug, Clone)]
pub struct FeeConfig {
    /// Marketplace cut, in whole percent of the sale price.
    pub fee_percent: u64,
    /// Address collecting the marketplace cut.
    pub admin_address: String,
}

/// Parameters for one buy-now swap PSBT.
#[derive(Debug, Clone)]
pub struct SwapParams {
    /// Seller's compressed public key, hex.
    pub owner_pubkey: String,
    /// Buyer's compressed public key, hex.
    pub buyer_pubkey: String,
    /// Buyer's wallet family.
    pub wallet_type: WalletType,
    /// Address receiving the inscription.
    pub recipient: String,
    /// Inscription being sold.
    pub inscription_id: String,
    /// Sale price in sats.
    pub price: u64,
}

/// A built swap skeleton: the unsigned PSBT and its total input count.
#[derive(Debug, Clone)]
pub struct SwapPsbt {
    pub psbt: Psbt,
    /// Inscription input plus funding inputs.
    pub input_count: usize,
}

/// Weight already fixed in the swap shape before funding selection, in input
/// units: the inscription input plus the four-output overhead.
const SWAP_BASE_INPUTS: u64 = 5;

/// Assemble the unsigned swap transaction.
///
/// ```text
/// Inputs:  [0]      inscription output (seller, key-spend taproot)
///          [1..=N]  buyer funding outputs
///
/// Outputs: [0] inscription value -> recipient
///          [1] marketplace fee   -> admin address
///          [2] seller proceeds   -> seller address
///          [3] funding change    -> buyer address
/// ```
///
/// Conservation holds exactly: `sum(inputs) == sum(outputs) +
/// required_fee(N)`. The inscription's value passes through untouched, and
/// outputs 1 and 2 always sum to the sale price.
pub fn build_swap_psbt<O: Oracle>(
    oracle: &O,
    network: Network,
    fees: &FeeConfig,
    params: &SwapParams,
) -> Result<SwapPsbt> {
    if fees.fee_percent > 100 {
        return Err(Error::InvalidFeePercent(fees.fee_percent));
    }

    let buyer = params
        .wallet_type
        .resolve_spend(&params.buyer_pubkey, network)?;
    // The seller side always signs key-spend taproot.
    let seller = WalletType::Taproot.resolve_spend(&params.owner_pubkey, network)?;

    let seller_address = seller.address.to_string();
    let inscriptions = oracle.list_inscriptions(&seller_address)?;
    let inscription = inscriptions
        .iter()
        .find(|ins| ins.inscription_id == params.inscription_id)
        .ok_or_else(|| Error::InscriptionNotFound(params.inscription_id.clone()))?;
    let (inscription_txid, inscription_vout) = inscription.outpoint()?;

    let buyer_address = buyer.address.to_string();
    let utxos = oracle.list_utxos(&buyer_address)?;
    let buyer_inscriptions = oracle.list_inscriptions(&buyer_address)?;
    let candidates = transferable_utxos(utxos, &buyer_inscriptions);

    let fee_rate = oracle.fee_rate()?;
    let selection = select_utxos(&candidates, params.price, fee_rate, SWAP_BASE_INPUTS)?;
    let funding_count = selection.chosen.len() as u64;

    let mut inputs = vec![swap_txin(&inscription_txid, inscription_vout)?];
    for utxo in &selection.chosen {
        inputs.push(swap_txin(&utxo.txid, utxo.vout)?);
    }

    let recipient = parse_address(&params.recipient, network)?;
    let admin = parse_address(&fees.admin_address, network)?;

    let marketplace_fee = params.price * fees.fee_percent / 100;
    let seller_proceeds = params.price - marketplace_fee;
    let miner_fee = required_fee(funding_count, SWAP_BASE_INPUTS, fee_rate);
    let change = selection.total - (params.price + miner_fee);

    let outputs = vec![
        swap_txout(inscription.output_value, recipient.script_pubkey()),
        swap_txout(marketplace_fee, admin.script_pubkey()),
        swap_txout(seller_proceeds, seller.address.script_pubkey()),
        swap_txout(change, buyer.address.script_pubkey()),
    ];

    let unsigned_tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: inputs,
        output: outputs,
    };
    let mut psbt = Psbt::from_unsigned_tx(unsigned_tx).map_err(|e| Error::Psbt(e.to_string()))?;

    // Inscription input: carries its original value and the seller's taproot
    // script. Fee logic never touches it.
    psbt.inputs[0].witness_utxo = Some(TxOut {
        value: Amount::from_sat(inscription.output_value),
        script_pubkey: seller.script.clone(),
    });
    psbt.inputs[0].tap_internal_key = seller.tap_internal_key;

    for (i, utxo) in selection.chosen.iter().enumerate() {
        let prev_tx = if params.wallet_type.needs_previous_transaction() {
            let raw = oracle.fetch_raw_transaction(&utxo.txid)?;
            let tx: Transaction = consensus_deserialize(&raw)
                .map_err(|e| Error::OracleData(format!("bad raw transaction {}: {e}", utxo.txid)))?;
            Some(tx)
        } else {
            None
        };
        params
            .wallet_type
            .populate_funding_input(&mut psbt.inputs[i + 1], &buyer, utxo.value, prev_tx)?;
    }

    let input_count = psbt.unsigned_tx.input.len();
    Ok(SwapPsbt { psbt, input_count })
}

fn swap_txin(txid: &str, vout: u32) -> Result<TxIn> {
    let txid =
        Txid::from_str(txid).map_err(|e| Error::OracleData(format!("bad txid {txid}: {e}")))?;
    Ok(TxIn {
        previous_output: OutPoint { txid, vout },
        script_sig: ScriptBuf::new(),
        sequence: Sequence::MAX,
        witness: Witness::default(),
    })
}

fn swap_txout(value: u64, script_pubkey: ScriptBuf) -> TxOut {
    TxOut {
        value: Amount::from_sat(value),
        script_pubkey,
    }
}

fn parse_address(s: &str, network: Network) -> Result<Address> {
    Address::from_str(s)
        .map_err(|e| Error::InvalidAddress(format!("{s}: {e}")))?
        .require_network(network.into_bitcoin())
        .map_err(|e| Error::InvalidAddress(format!("{s}: {e}")))
}
