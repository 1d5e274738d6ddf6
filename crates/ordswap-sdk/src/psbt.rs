use bitcoin::Psbt;

use crate::error::{Error, Result};

/// Serialize a PSBT to its hex textual encoding.
pub fn encode_hex(psbt: &Psbt) -> String {
    hex::encode(psbt.serialize())
}

/// Parse a PSBT from its hex textual encoding.
pub fn decode_hex(s: &str) -> Result<Psbt> {
    let bytes = hex::decode(s).map_err(|e| Error::PsbtDecode(e.to_string()))?;
    Psbt::deserialize(&bytes).map_err(|e| Error::PsbtDecode(e.to_string()))
}

/// Re-encode a hex PSBT as base64. [`base64_to_hex`] inverts it exactly.
pub fn hex_to_base64(s: &str) -> Result<String> {
    Ok(decode_hex(s)?.to_string())
}

/// Re-encode a base64 PSBT as hex. [`hex_to_base64`] inverts it exactly.
pub fn base64_to_hex(s: &str) -> Result<String> {
    let psbt = s
        .parse::<Psbt>()
        .map_err(|e| Error::PsbtDecode(e.to_string()))?;
    Ok(encode_hex(&psbt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::absolute::LockTime;
    use bitcoin::transaction::Version;
    use bitcoin::Transaction;

    fn minimal_psbt_hex() -> String {
        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![],
            output: vec![],
        };
        encode_hex(&Psbt::from_unsigned_tx(tx).unwrap())
    }

    #[test]
    fn hex_base64_round_trip_is_lossless() {
        let hex_psbt = minimal_psbt_hex();
        let base64_psbt = hex_to_base64(&hex_psbt).unwrap();
        assert_ne!(hex_psbt, base64_psbt);
        assert_eq!(base64_to_hex(&base64_psbt).unwrap(), hex_psbt);
    }

    #[test]
    fn garbage_hex_is_rejected() {
        assert!(matches!(decode_hex("zzzz"), Err(Error::PsbtDecode(_))));
        assert!(matches!(decode_hex("00ff"), Err(Error::PsbtDecode(_))));
    }

    #[test]
    fn garbage_base64_is_rejected() {
        assert!(matches!(
            base64_to_hex("not a psbt"),
            Err(Error::PsbtDecode(_))
        ));
    }
}
