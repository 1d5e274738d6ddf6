mod conversions;
mod error;
mod models;
mod schema;
mod store;

pub use error::StoreError;
pub use store::{
    ActiveOffer, BuyerRequest, CreatedOffer, ListingInfo, MarketStore, OfferInfo, OfferStatus,
    SellerIdentity,
};

pub type Result<T> = std::result::Result<T, StoreError>;
