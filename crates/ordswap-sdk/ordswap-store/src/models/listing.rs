use diesel::prelude::*;

use crate::schema::listings;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = listings)]
pub struct ListingRow {
    pub id: i32,
    pub owner_address: String,
    pub owner_pubkey: String,
    pub inscription_id: String,
    pub price: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = listings)]
pub struct NewListingRow {
    pub owner_address: String,
    pub owner_pubkey: String,
    pub inscription_id: String,
    pub price: i64,
}
