pub mod client;
pub mod error;
pub mod normalize;
pub mod rate_limit;
pub mod types;

pub use client::InstagramClient;
pub use error::ScraperError;
pub use normalize::normalize_item;
pub use rate_limit::{retry_with_backoff, Transient};
pub use types::{ActorInput, DatasetItem, RunData};
