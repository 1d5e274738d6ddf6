use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use ordswap_sdk::{
    base64_to_hex, build_swap_psbt, decode_hex, encode_hex, FeeConfig, Network, Oracle, SwapParams,
    WalletType,
};

use crate::conversions::{listing_row_to_info, offer_row_to_info};
use crate::error::StoreError;
use crate::models::{ListingRow, NewListingRow, NewOfferRow, OfferRow};
use crate::schema::{listings, offers};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// SQL expression for SQLite's `datetime('now')`.
const DATETIME_NOW: &str = "datetime('now')";

// --- Public types ---

/// Lifecycle of an offer. Transitions are monotonic: Created -> Signed ->
/// Accepted. Refreshing the PSBT resets a Signed offer back to Created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferStatus {
    Created = 0,
    Signed = 1,
    Accepted = 2,
}

impl OfferStatus {
    pub fn from_i32(v: i32) -> std::result::Result<Self, StoreError> {
        match v {
            0 => Ok(OfferStatus::Created),
            1 => Ok(OfferStatus::Signed),
            2 => Ok(OfferStatus::Accepted),
            other => Err(StoreError::InvalidData(format!(
                "invalid offer status: {other}"
            ))),
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// The seller side of a listing: their receive address and the compressed
/// public key their inscription output is keyed to.
#[derive(Debug, Clone)]
pub struct SellerIdentity {
    pub address: String,
    pub pubkey: String,
}

/// A buyer asking to take a listing.
#[derive(Debug, Clone)]
pub struct BuyerRequest {
    pub address: String,
    pub pubkey: String,
    pub wallet_type: WalletType,
    /// Where the inscription should land after the swap.
    pub recipient: String,
}

#[derive(Debug, Clone)]
pub struct ListingInfo {
    pub id: i32,
    pub owner_address: String,
    pub owner_pubkey: String,
    pub inscription_id: String,
    /// Asking price in sats.
    pub price: u64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct OfferInfo {
    pub id: i32,
    pub listing_id: i32,
    pub buyer_address: String,
    pub buyer_pubkey: String,
    pub wallet_type: WalletType,
    pub recipient_address: String,
    /// Unsigned swap skeleton, hex.
    pub psbt: String,
    pub buyer_signed_psbt: Option<String>,
    pub seller_signed_psbt: Option<String>,
    pub input_count: usize,
    pub status: OfferStatus,
    /// Whether the seller has seen this offer.
    pub is_read: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A buyer-signed offer awaiting the seller, joined with its listing.
#[derive(Debug, Clone)]
pub struct ActiveOffer {
    pub offer: OfferInfo,
    pub listing: ListingInfo,
}

/// Result of building (or rebuilding) an offer PSBT.
#[derive(Debug, Clone)]
pub struct CreatedOffer {
    pub offer_id: i32,
    /// PSBT in the buyer wallet's wire encoding: base64 for nested-segwit,
    /// hex otherwise.
    pub psbt: String,
    pub input_count: usize,
}

// --- MarketStore ---

/// Persistent storage for inscription listings and swap offers.
///
/// All methods take `&mut self` because Diesel's `SqliteConnection` requires
/// `&mut` for all operations, including reads.
pub struct MarketStore {
    conn: SqliteConnection,
}

impl MarketStore {
    /// Open (or create) a store at the given file path. Runs migrations automatically.
    pub fn open(path: &str) -> crate::Result<Self> {
        let mut conn = SqliteConnection::establish(path)?;
        diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut conn)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        Ok(MarketStore { conn })
    }

    /// Open an in-memory store for tests.
    pub fn open_in_memory() -> crate::Result<Self> {
        let mut conn = SqliteConnection::establish(":memory:")?;
        diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut conn)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        Ok(MarketStore { conn })
    }

    // ==================== Listings ====================

    /// Register an inscription for sale, or reprice it if the same owner has
    /// already listed it. Keyed on (owner address, inscription id); writers
    /// race last-write-wins on the price.
    pub fn upsert_listing(
        &mut self,
        seller: &SellerIdentity,
        inscription_id: &str,
        price: u64,
    ) -> crate::Result<ListingInfo> {
        let price = i64::try_from(price)
            .map_err(|_| StoreError::InvalidData(format!("listing price too large: {price}")))?;

        let existing: Option<ListingRow> = listings::table
            .filter(listings::owner_address.eq(&seller.address))
            .filter(listings::inscription_id.eq(inscription_id))
            .first(&mut self.conn)
            .optional()?;

        let id = match existing {
            Some(row) => {
                diesel::update(listings::table.filter(listings::id.eq(row.id)))
                    .set((
                        listings::price.eq(price),
                        listings::owner_pubkey.eq(&seller.pubkey),
                        listings::updated_at
                            .eq(diesel::dsl::sql::<diesel::sql_types::Text>(DATETIME_NOW)),
                    ))
                    .execute(&mut self.conn)?;
                row.id
            }
            None => {
                let row = NewListingRow {
                    owner_address: seller.address.clone(),
                    owner_pubkey: seller.pubkey.clone(),
                    inscription_id: inscription_id.to_string(),
                    price,
                };
                diesel::insert_into(listings::table)
                    .values(&row)
                    .execute(&mut self.conn)?;
                diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()"))
                    .get_result(&mut self.conn)?
            }
        };

        let row: ListingRow = listings::table
            .filter(listings::id.eq(id))
            .first(&mut self.conn)?;
        listing_row_to_info(row)
    }

    /// Look a listing up by the inscription on sale. Buyers only know the
    /// inscription id; ties across owners go to the oldest listing.
    pub fn get_listing(&mut self, inscription_id: &str) -> crate::Result<Option<ListingInfo>> {
        let row: Option<ListingRow> = listings::table
            .filter(listings::inscription_id.eq(inscription_id))
            .order(listings::id.asc())
            .first(&mut self.conn)
            .optional()?;
        row.map(listing_row_to_info).transpose()
    }

    pub fn get_listing_for_owner(
        &mut self,
        owner_address: &str,
        inscription_id: &str,
    ) -> crate::Result<Option<ListingInfo>> {
        let row: Option<ListingRow> = listings::table
            .filter(listings::owner_address.eq(owner_address))
            .filter(listings::inscription_id.eq(inscription_id))
            .first(&mut self.conn)
            .optional()?;
        row.map(listing_row_to_info).transpose()
    }

    pub fn get_listing_by_id(&mut self, listing_id: i32) -> crate::Result<Option<ListingInfo>> {
        let row: Option<ListingRow> = listings::table
            .filter(listings::id.eq(listing_id))
            .first(&mut self.conn)
            .optional()?;
        row.map(listing_row_to_info).transpose()
    }

    pub fn list_listings(&mut self, owner_address: &str) -> crate::Result<Vec<ListingInfo>> {
        let rows: Vec<ListingRow> = listings::table
            .filter(listings::owner_address.eq(owner_address))
            .order(listings::id.asc())
            .load(&mut self.conn)?;
        rows.into_iter().map(listing_row_to_info).collect()
    }

    // ==================== Offers ====================

    /// Build the swap PSBT for `listing_id` and record it as the buyer's
    /// offer. One offer exists per (listing, buyer address); calling again
    /// rebuilds the skeleton against current chain state, discards any
    /// collected signatures, and resets the offer to Created.
    pub fn create_or_refresh_offer<O: Oracle>(
        &mut self,
        oracle: &O,
        network: Network,
        fees: &FeeConfig,
        listing_id: i32,
        buyer: &BuyerRequest,
    ) -> crate::Result<CreatedOffer> {
        let listing = self
            .get_listing_by_id(listing_id)?
            .ok_or_else(|| StoreError::ListingNotFound(listing_id.to_string()))?;

        let params = SwapParams {
            owner_pubkey: listing.owner_pubkey.clone(),
            buyer_pubkey: buyer.pubkey.clone(),
            wallet_type: buyer.wallet_type,
            recipient: buyer.recipient.clone(),
            inscription_id: listing.inscription_id.clone(),
            price: listing.price,
        };
        let swap = build_swap_psbt(oracle, network, fees, &params)?;
        let psbt_hex = encode_hex(&swap.psbt);

        let existing: Option<OfferRow> = offers::table
            .filter(offers::listing_id.eq(listing_id))
            .filter(offers::buyer_address.eq(&buyer.address))
            .first(&mut self.conn)
            .optional()?;

        let offer_id = match existing {
            Some(row) => {
                diesel::update(offers::table.filter(offers::id.eq(row.id)))
                    .set((
                        offers::psbt.eq(&psbt_hex),
                        offers::input_count.eq(swap.input_count as i32),
                        offers::status.eq(OfferStatus::Created.as_i32()),
                        offers::buyer_signed_psbt.eq(None::<String>),
                        offers::seller_signed_psbt.eq(None::<String>),
                        offers::is_read.eq(0),
                        offers::updated_at
                            .eq(diesel::dsl::sql::<diesel::sql_types::Text>(DATETIME_NOW)),
                    ))
                    .execute(&mut self.conn)?;
                row.id
            }
            None => {
                let row = NewOfferRow {
                    listing_id,
                    buyer_address: buyer.address.clone(),
                    buyer_pubkey: buyer.pubkey.clone(),
                    wallet_type: buyer.wallet_type.as_str().to_string(),
                    recipient_address: buyer.recipient.clone(),
                    psbt: psbt_hex.clone(),
                    input_count: swap.input_count as i32,
                    status: OfferStatus::Created.as_i32(),
                };
                diesel::insert_into(offers::table)
                    .values(&row)
                    .execute(&mut self.conn)?;
                diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()"))
                    .get_result(&mut self.conn)?
            }
        };

        let psbt = if buyer.wallet_type.uses_base64_psbt() {
            ordswap_sdk::hex_to_base64(&psbt_hex)?
        } else {
            psbt_hex
        };

        Ok(CreatedOffer {
            offer_id,
            psbt,
            input_count: swap.input_count,
        })
    }

    pub fn get_offer(&mut self, offer_id: i32) -> crate::Result<Option<OfferInfo>> {
        let row: Option<OfferRow> = offers::table
            .filter(offers::id.eq(offer_id))
            .first(&mut self.conn)
            .optional()?;
        row.map(offer_row_to_info).transpose()
    }

    /// Record the buyer's half-signed PSBT and move the offer to Signed.
    ///
    /// The offer is matched by the unsigned PSBT the buyer signed, not by
    /// id: a signature produced against a skeleton that has since been
    /// refreshed no longer matches any stored row and is rejected as
    /// `OfferNotFound`. Both PSBTs arrive in the buyer wallet's wire
    /// encoding and are normalized to hex for storage. An offer that is
    /// already Accepted, or that belongs to a different buyer, is likewise
    /// treated as not found.
    pub fn record_buyer_signature(
        &mut self,
        buyer_address: &str,
        psbt: &str,
        signed_psbt: &str,
    ) -> crate::Result<OfferInfo> {
        let psbt_hex = wire_psbt_to_hex(psbt)?;
        let signed_hex = wire_psbt_to_hex(signed_psbt)?;

        let row: Option<OfferRow> = offers::table
            .filter(offers::psbt.eq(&psbt_hex))
            .filter(offers::buyer_address.eq(buyer_address))
            .filter(offers::status.ne(OfferStatus::Accepted.as_i32()))
            .first(&mut self.conn)
            .optional()?;
        let row = row.ok_or(StoreError::OfferNotFound)?;

        diesel::update(offers::table.filter(offers::id.eq(row.id)))
            .set((
                offers::buyer_signed_psbt.eq(&signed_hex),
                offers::status.eq(OfferStatus::Signed.as_i32()),
                offers::is_read.eq(0),
                offers::updated_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(DATETIME_NOW)),
            ))
            .execute(&mut self.conn)?;

        self.get_offer(row.id)?.ok_or(StoreError::OfferNotFound)
    }

    /// Record the seller's counter-signature and move the offer to Accepted.
    ///
    /// Matched by the unsigned PSBT the seller signed, so a signature over a
    /// refreshed-away skeleton is rejected. Only the listing's owner may
    /// accept, and only an offer the buyer has already signed. Anything else
    /// is treated as not found.
    pub fn record_seller_signature(
        &mut self,
        seller_address: &str,
        psbt: &str,
        signed_psbt: &str,
    ) -> crate::Result<OfferInfo> {
        let psbt_hex = wire_psbt_to_hex(psbt)?;
        let signed_hex = wire_psbt_to_hex(signed_psbt)?;

        let row: Option<(OfferRow, ListingRow)> = offers::table
            .inner_join(listings::table)
            .filter(offers::psbt.eq(&psbt_hex))
            .filter(listings::owner_address.eq(seller_address))
            .filter(offers::status.eq(OfferStatus::Signed.as_i32()))
            .first(&mut self.conn)
            .optional()?;
        let (row, _listing) = row.ok_or(StoreError::OfferNotFound)?;

        diesel::update(offers::table.filter(offers::id.eq(row.id)))
            .set((
                offers::seller_signed_psbt.eq(&signed_hex),
                offers::status.eq(OfferStatus::Accepted.as_i32()),
                offers::is_read.eq(1),
                offers::updated_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(DATETIME_NOW)),
            ))
            .execute(&mut self.conn)?;

        self.get_offer(row.id)?.ok_or(StoreError::OfferNotFound)
    }

    /// Buyer-signed offers across all of `seller_address`'s listings, oldest
    /// first.
    pub fn list_active_offers(&mut self, seller_address: &str) -> crate::Result<Vec<ActiveOffer>> {
        let rows: Vec<(OfferRow, ListingRow)> = offers::table
            .inner_join(listings::table)
            .filter(listings::owner_address.eq(seller_address))
            .filter(offers::status.eq(OfferStatus::Signed.as_i32()))
            .order(offers::id.asc())
            .load(&mut self.conn)?;
        rows.into_iter()
            .map(|(offer, listing)| {
                Ok(ActiveOffer {
                    offer: offer_row_to_info(offer)?,
                    listing: listing_row_to_info(listing)?,
                })
            })
            .collect()
    }

    /// Mark an offer as seen by the seller.
    pub fn mark_offer_read(&mut self, offer_id: i32) -> crate::Result<()> {
        let updated = diesel::update(offers::table.filter(offers::id.eq(offer_id)))
            .set(offers::is_read.eq(1))
            .execute(&mut self.conn)?;
        if updated == 0 {
            return Err(StoreError::OfferNotFound);
        }
        Ok(())
    }
}

/// Normalize a wire-encoded PSBT (hex, or base64 for nested-segwit wallets)
/// to the lowercase hex form used for storage and lookup.
fn wire_psbt_to_hex(s: &str) -> crate::Result<String> {
    match decode_hex(s) {
        Ok(_) => Ok(s.to_ascii_lowercase()),
        Err(_) => Ok(base64_to_hex(s)?),
    }
}
