pub mod listing;
pub mod offer;

pub use listing::{ListingRow, NewListingRow};
pub use offer::{NewOfferRow, OfferRow};
