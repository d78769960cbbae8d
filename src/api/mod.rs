// Backend API surface

pub mod categories;
pub mod client;
pub mod listings;

pub use categories::{CategoryApi, HttpCategoryApi};
pub use client::{ApiClient, ApiConfig};
pub use listings::{HttpListingApi, ListingApi};
