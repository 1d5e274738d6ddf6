use diesel::prelude::*;

use crate::schema::offers;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = offers)]
pub struct OfferRow {
    pub id: i32,
    pub listing_id: i32,
    pub buyer_address: String,
    pub buyer_pubkey: String,
    pub wallet_type: String,
    pub recipient_address: String,
    pub psbt: String,
    pub buyer_signed_psbt: Option<String>,
    pub seller_signed_psbt: Option<String>,
    pub input_count: i32,
    pub status: i32,
    pub is_read: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = offers)]
pub struct NewOfferRow {
    pub listing_id: i32,
    pub buyer_address: String,
    pub buyer_pubkey: String,
    pub wallet_type: String,
    pub recipient_address: String,
    pub psbt: String,
    pub input_count: i32,
    pub status: i32,
}
