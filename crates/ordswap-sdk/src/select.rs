use crate::error::{Error, Result};
use crate::oracle::Utxo;

/// Marginal virtual-size contribution of one input, in bytes.
///
/// A fixed estimate shared by all wallet families. Taproot and nested-segwit
/// inputs differ in true witness weight, but the estimate is kept uniform so
/// funding outcomes stay stable across wallet types.
pub const BYTES_PER_INPUT: u64 = 60;

/// Outcome of a successful coin selection.
#[derive(Debug, Clone)]
pub struct CoinSelection {
    pub chosen: Vec<Utxo>,
    /// Combined value of `chosen`, in sats.
    pub total: u64,
}

/// Miner fee required once `inputs` funding inputs have been selected.
///
/// `base_inputs` is the weight already fixed in the transaction shape before
/// funding begins, expressed in input units.
pub fn required_fee(inputs: u64, base_inputs: u64, fee_rate: u64) -> u64 {
    (inputs + base_inputs) * BYTES_PER_INPUT * fee_rate
}

/// Greedily select funding UTXOs covering `target` plus the input-dependent
/// miner fee.
///
/// Candidates are consumed in the order given; no sorting or optimization is
/// attempted. The funding threshold is re-evaluated before every inclusion
/// because each added input raises the required fee. Selection is
/// deterministic and depends on candidate order.
pub fn select_utxos(
    candidates: &[Utxo],
    target: u64,
    fee_rate: u64,
    base_inputs: u64,
) -> Result<CoinSelection> {
    let mut chosen: Vec<Utxo> = Vec::new();
    let mut total: u64 = 0;

    for utxo in candidates {
        if total >= target + required_fee(chosen.len() as u64, base_inputs, fee_rate) {
            break;
        }
        total += utxo.value;
        chosen.push(utxo.clone());
    }

    let required = target + required_fee(chosen.len() as u64, base_inputs, fee_rate);
    if total < required {
        return Err(Error::InsufficientFunds {
            available: total,
            required,
        });
    }

    Ok(CoinSelection { chosen, total })
}
