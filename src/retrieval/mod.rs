//! Recipe retrieval: cache-first loading with fallback to the cached snapshot

mod retriever;
mod status;

pub use retriever::{decide, Decision, Load, RecipeRetriever};
pub use status::{Epoch, RetrievalStatus};
