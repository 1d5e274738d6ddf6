use std::str::FromStr;

use ordswap_sdk::WalletType;

use crate::error::StoreError;
use crate::models::{ListingRow, OfferRow};
use crate::store::{ListingInfo, OfferInfo, OfferStatus};

pub fn listing_row_to_info(row: ListingRow) -> crate::Result<ListingInfo> {
    if row.price < 0 {
        return Err(StoreError::InvalidData(format!(
            "negative listing price: {}",
            row.price
        )));
    }
    Ok(ListingInfo {
        id: row.id,
        owner_address: row.owner_address,
        owner_pubkey: row.owner_pubkey,
        inscription_id: row.inscription_id,
        price: row.price as u64,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub fn offer_row_to_info(row: OfferRow) -> crate::Result<OfferInfo> {
    let status = OfferStatus::from_i32(row.status)?;
    let wallet_type = WalletType::from_str(&row.wallet_type)?;
    Ok(OfferInfo {
        id: row.id,
        listing_id: row.listing_id,
        buyer_address: row.buyer_address,
        buyer_pubkey: row.buyer_pubkey,
        wallet_type,
        recipient_address: row.recipient_address,
        psbt: row.psbt,
        buyer_signed_psbt: row.buyer_signed_psbt,
        seller_signed_psbt: row.seller_signed_psbt,
        input_count: row.input_count as usize,
        status,
        is_read: row.is_read != 0,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
