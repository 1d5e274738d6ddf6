use serde::Deserialize;

use crate::error::{Error, Result};
use crate::network::Network;

/// An inscription-bearing output as reported by the indexer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inscription {
    pub address: String,
    pub inscription_id: String,
    pub inscription_number: i64,
    /// Holding outpoint as `txid:vout`.
    pub output: String,
    /// Value of the holding output, in sats.
    pub output_value: u64,
}

impl Inscription {
    /// Split the `txid:vout` output reference.
    pub fn outpoint(&self) -> Result<(String, u32)> {
        let (txid, vout) = self
            .output
            .split_once(':')
            .ok_or_else(|| Error::OracleData(format!("bad output reference: {}", self.output)))?;
        let vout = vout
            .parse()
            .map_err(|_| Error::OracleData(format!("bad output reference: {}", self.output)))?;
        Ok((txid.to_string(), vout))
    }
}

/// A spendable output controlled by an address.
#[derive(Debug, Clone, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    /// Value in sats.
    pub value: u64,
}

/// Read-only source of inscription locations, spendable outputs, and fee
/// rates.
///
/// Implementations are blocking and single-attempt; the core never retries.
/// A transport or decoding failure fails the one build using it.
pub trait Oracle {
    /// All inscriptions currently held by `address`.
    fn list_inscriptions(&self, address: &str) -> Result<Vec<Inscription>>;

    /// All unspent outputs controlled by `address`.
    fn list_utxos(&self, address: &str) -> Result<Vec<Utxo>>;

    /// Current recommended fee rate in sat/vB.
    fn fee_rate(&self) -> Result<u64>;

    /// Raw consensus-serialized transaction bytes for `txid`. Legacy-style
    /// signing of nested-segwit inputs needs the whole spent transaction.
    fn fetch_raw_transaction(&self, txid: &str) -> Result<Vec<u8>>;
}

/// Filter `utxos` down to outputs safe to spend as swap funding.
///
/// An output is excluded when it carries an inscription itself, or when it is
/// vout 0 of a transaction holding an inscription at any index (such outputs
/// commonly carry the artifact's postage).
pub fn transferable_utxos(utxos: Vec<Utxo>, inscriptions: &[Inscription]) -> Vec<Utxo> {
    utxos
        .into_iter()
        .filter(|utxo| {
            let outpoint = format!("{}:{}", utxo.txid, utxo.vout);
            if inscriptions.iter().any(|ins| ins.output == outpoint) {
                return false;
            }
            let same_tx = inscriptions
                .iter()
                .any(|ins| ins.output.starts_with(&utxo.txid));
            !(same_tx && utxo.vout == 0)
        })
        .collect()
}

/// Oracle backed by public REST indexers: a mempool.space-style API for
/// UTXOs, fee rates, and raw transactions, and a UniSat-style wallet API for
/// inscription locations.
pub struct HttpOracle {
    client: reqwest::blocking::Client,
    mempool_url: String,
    inscription_url: String,
}

#[derive(Deserialize)]
struct InscriptionListResponse {
    result: InscriptionList,
}

#[derive(Deserialize)]
struct InscriptionList {
    list: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendedFees {
    half_hour_fee: u64,
}

impl HttpOracle {
    pub fn new(network: Network) -> Self {
        HttpOracle {
            client: reqwest::blocking::Client::new(),
            mempool_url: network.mempool_api_url().to_string(),
            inscription_url: network.inscription_api_url().to_string(),
        }
    }

    /// Point the oracle at custom endpoints (local indexer, test server).
    pub fn with_endpoints(mempool_url: &str, inscription_url: &str) -> Self {
        HttpOracle {
            client: reqwest::blocking::Client::new(),
            mempool_url: mempool_url.trim_end_matches('/').to_string(),
            inscription_url: inscription_url.trim_end_matches('/').to_string(),
        }
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        log::debug!("oracle request: {url}");
        self.client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| Error::OracleUnavailable(e.to_string()))
    }
}

impl Oracle for HttpOracle {
    fn list_inscriptions(&self, address: &str) -> Result<Vec<Inscription>> {
        let url = format!(
            "{}/address/inscriptions?address={}&cursor=0&size=100",
            self.inscription_url, address
        );
        let resp = self
            .client
            .get(&url)
            .header("X-Address", address)
            .header("X-Channel", "store")
            .header("X-Client", "UniSat Wallet")
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| Error::OracleUnavailable(e.to_string()))?;

        let body: InscriptionListResponse = resp
            .json()
            .map_err(|e| Error::OracleData(e.to_string()))?;

        let mut inscriptions = Vec::new();
        for entry in body.result.list {
            match serde_json::from_value::<Inscription>(entry) {
                Ok(ins) => inscriptions.push(ins),
                Err(e) => log::warn!("skipping unparseable inscription entry: {e}"),
            }
        }
        Ok(inscriptions)
    }

    fn list_utxos(&self, address: &str) -> Result<Vec<Utxo>> {
        let url = format!("{}/address/{}/utxo", self.mempool_url, address);
        self.get(&url)?
            .json()
            .map_err(|e| Error::OracleData(e.to_string()))
    }

    fn fee_rate(&self) -> Result<u64> {
        let url = format!("{}/v1/fees/recommended", self.mempool_url);
        let fees: RecommendedFees = self
            .get(&url)?
            .json()
            .map_err(|e| Error::OracleData(e.to_string()))?;
        Ok(fees.half_hour_fee)
    }

    fn fetch_raw_transaction(&self, txid: &str) -> Result<Vec<u8>> {
        let url = format!("{}/tx/{}/hex", self.mempool_url, txid);
        let body = self
            .get(&url)?
            .text()
            .map_err(|e| Error::OracleData(e.to_string()))?;
        hex::decode(body.trim()).map_err(|e| Error::OracleData(format!("bad tx hex: {e}")))
    }
}
