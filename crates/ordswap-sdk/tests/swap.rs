//! End-to-end swap assembly tests against a canned oracle.

use ordswap_sdk::testing::{
    buyer_address, funding_utxo, raw_funding_transaction, seller_address, test_fee_config,
    test_inscription, test_txid, StaticOracle, BUYER_PUBKEY, OWNER_PUBKEY,
};
use ordswap_sdk::{
    build_swap_psbt, hex_to_base64, Error, Network, SwapParams, Utxo, WalletType,
};

const NETWORK: Network = Network::Bitcoin;
const PRICE: u64 = 100_000;
const INSCRIPTION_VALUE: u64 = 546;

fn swap_params(wallet_type: WalletType, price: u64) -> SwapParams {
    SwapParams {
        owner_pubkey: OWNER_PUBKEY.to_string(),
        buyer_pubkey: BUYER_PUBKEY.to_string(),
        wallet_type,
        // The inscription lands at an address distinct from the buyer's
        // change address in every scenario.
        recipient: buyer_address(WalletType::Taproot, NETWORK),
        inscription_id: format!("{}i0", test_txid(0xaa)),
        price,
    }
}

fn oracle_with_funding(utxo_values: &[u64], fee_rate: u64) -> StaticOracle {
    let seller = seller_address(NETWORK);
    StaticOracle {
        inscriptions: vec![test_inscription(0xaa, &seller, INSCRIPTION_VALUE)],
        utxos: utxo_values
            .iter()
            .enumerate()
            .map(|(i, value)| funding_utxo(0xb0 + i as u8, *value))
            .collect(),
        fee_rate,
        raw_transactions: vec![],
    }
}

#[test]
fn builds_expected_outputs_and_conserves_value() {
    let oracle = oracle_with_funding(&[30_000, 80_000], 10);
    let fees = test_fee_config(NETWORK);
    let params = swap_params(WalletType::NativeSegwit, PRICE);

    let swap = build_swap_psbt(&oracle, NETWORK, &fees, &params).unwrap();
    let tx = &swap.psbt.unsigned_tx;

    // Inscription input plus both funding inputs.
    assert_eq!(swap.input_count, 3);
    assert_eq!(tx.input.len(), 3);
    assert_eq!(tx.input[0].previous_output.txid.to_string(), test_txid(0xaa));
    assert_eq!(tx.input[0].previous_output.vout, 0);

    // Fixed four-output shape: inscription, marketplace fee, proceeds, change.
    let values: Vec<u64> = tx.output.iter().map(|o| o.value.to_sat()).collect();
    assert_eq!(values, vec![INSCRIPTION_VALUE, 2_000, 98_000, 5_800]);

    // sum(inputs) == sum(outputs) + miner fee at 7 effective inputs * 60 vB * 10 sat/vB.
    let input_total = INSCRIPTION_VALUE + 30_000 + 80_000;
    let output_total: u64 = values.iter().sum();
    assert_eq!(input_total, output_total + 4_200);

    // Inscription input carries the seller's taproot metadata.
    assert_eq!(
        swap.psbt.inputs[0]
            .witness_utxo
            .as_ref()
            .unwrap()
            .value
            .to_sat(),
        INSCRIPTION_VALUE
    );
    assert!(swap.psbt.inputs[0].tap_internal_key.is_some());

    // Native-segwit funding inputs need only the witness UTXO.
    for input in &swap.psbt.inputs[1..] {
        assert!(input.witness_utxo.is_some());
        assert!(input.non_witness_utxo.is_none());
        assert!(input.tap_internal_key.is_none());
    }
}

#[test]
fn fee_and_proceeds_always_sum_to_price() {
    let oracle = oracle_with_funding(&[30_000, 80_000], 10);
    let fees = test_fee_config(NETWORK);
    let params = swap_params(WalletType::NativeSegwit, 99_999);

    let swap = build_swap_psbt(&oracle, NETWORK, &fees, &params).unwrap();
    let tx = &swap.psbt.unsigned_tx;

    // 2% of 99,999 truncates to 1,999; the seller absorbs the rounding.
    assert_eq!(tx.output[1].value.to_sat(), 1_999);
    assert_eq!(tx.output[2].value.to_sat(), 98_000);
    assert_eq!(
        tx.output[1].value.to_sat() + tx.output[2].value.to_sat(),
        99_999
    );
}

#[test]
fn rejects_underfunded_buyer() {
    let oracle = oracle_with_funding(&[5_000], 10);
    let fees = test_fee_config(NETWORK);
    let params = swap_params(WalletType::NativeSegwit, PRICE);

    match build_swap_psbt(&oracle, NETWORK, &fees, &params) {
        Err(Error::InsufficientFunds {
            available,
            required,
        }) => {
            assert_eq!(available, 5_000);
            assert_eq!(required, 103_600);
        }
        other => panic!("expected InsufficientFunds, got {other:?}"),
    }
}

#[test]
fn rejects_inscription_not_held_by_seller() {
    let oracle = oracle_with_funding(&[200_000], 10);
    let fees = test_fee_config(NETWORK);
    let mut params = swap_params(WalletType::NativeSegwit, PRICE);
    params.inscription_id = format!("{}i0", test_txid(0x99));

    match build_swap_psbt(&oracle, NETWORK, &fees, &params) {
        Err(Error::InscriptionNotFound(id)) => {
            assert_eq!(id, format!("{}i0", test_txid(0x99)));
        }
        other => panic!("expected InscriptionNotFound, got {other:?}"),
    }
}

#[test]
fn rejects_fee_percent_over_hundred() {
    let oracle = oracle_with_funding(&[200_000], 10);
    let mut fees = test_fee_config(NETWORK);
    fees.fee_percent = 101;
    let params = swap_params(WalletType::NativeSegwit, PRICE);

    assert!(matches!(
        build_swap_psbt(&oracle, NETWORK, &fees, &params),
        Err(Error::InvalidFeePercent(101))
    ));
}

#[test]
fn taproot_funding_inputs_carry_internal_key() {
    let oracle = oracle_with_funding(&[200_000], 10);
    let fees = test_fee_config(NETWORK);
    let params = swap_params(WalletType::Taproot, PRICE);

    let swap = build_swap_psbt(&oracle, NETWORK, &fees, &params).unwrap();

    assert_eq!(swap.input_count, 2);
    let funding = &swap.psbt.inputs[1];
    assert!(funding.witness_utxo.is_some());
    assert!(funding.tap_internal_key.is_some());
    // Buyer and seller keys differ, so the internal keys must too.
    assert_ne!(
        funding.tap_internal_key,
        swap.psbt.inputs[0].tap_internal_key
    );
}

#[test]
fn nested_segwit_funding_inputs_carry_previous_transactions() {
    let mut oracle = oracle_with_funding(&[200_000], 10);
    oracle.raw_transactions = vec![(
        test_txid(0xb0),
        raw_funding_transaction(200_000, NETWORK),
    )];
    let fees = test_fee_config(NETWORK);
    let params = swap_params(WalletType::NestedSegwit, PRICE);

    let swap = build_swap_psbt(&oracle, NETWORK, &fees, &params).unwrap();

    let funding = &swap.psbt.inputs[1];
    assert!(funding.redeem_script.is_some());
    let prev = funding.non_witness_utxo.as_ref().unwrap();
    assert_eq!(prev.output[1].value.to_sat(), 200_000);

    // Nested-segwit wallets consume base64; the hex form must convert.
    let hex = ordswap_sdk::encode_hex(&swap.psbt);
    assert!(params.wallet_type.uses_base64_psbt());
    assert!(hex_to_base64(&hex).is_ok());
}

#[test]
fn inscription_bearing_outputs_never_fund_a_swap() {
    let seller = seller_address(NETWORK);
    let buyer = buyer_address(WalletType::NativeSegwit, NETWORK);

    // Most of the buyer's balance sits on the output that carries their own
    // inscription; it must never be swept up as funding.
    let oracle = StaticOracle {
        inscriptions: vec![
            test_inscription(0xaa, &seller, INSCRIPTION_VALUE),
            test_inscription(0xcc, &buyer, 10_000),
        ],
        utxos: vec![
            Utxo {
                txid: test_txid(0xcc),
                vout: 0,
                value: 500_000,
            },
            funding_utxo(0xb0, 30_000),
        ],
        fee_rate: 10,
        raw_transactions: vec![],
    };
    let fees = test_fee_config(NETWORK);
    let params = swap_params(WalletType::NativeSegwit, PRICE);

    // Only the 30,000 sat output is eligible, which cannot cover the price.
    match build_swap_psbt(&oracle, NETWORK, &fees, &params) {
        Err(Error::InsufficientFunds { available, .. }) => assert_eq!(available, 30_000),
        other => panic!("expected InsufficientFunds, got {other:?}"),
    }
}
