pub use bitcoin;

pub mod error;
pub mod network;
pub mod oracle;
pub mod psbt;
pub mod select;
pub mod swap;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod wallet;

// Core types
pub use error::{Error, Result};
pub use network::Network;
pub use oracle::{HttpOracle, Inscription, Oracle, Utxo, transferable_utxos};
pub use select::{CoinSelection, required_fee, select_utxos};
pub use swap::{FeeConfig, SwapParams, SwapPsbt, build_swap_psbt};
pub use wallet::{ResolvedSpend, WalletType};

// PSBT encoding helpers
pub use psbt::{base64_to_hex, decode_hex, encode_hex, hex_to_base64};
