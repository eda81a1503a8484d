//! Filter and classifier stages applied to each fetched transaction

pub mod classifier;
pub mod errors;
pub mod filter;
pub mod registry;

pub use classifier::{classify, Classification, SaleCandidate};
pub use errors::ClassifyError;
pub use filter::{admit, FilterDecision};
pub use registry::MarketplaceRegistry;
