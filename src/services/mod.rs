// Service exports
pub mod extraction;
pub mod memory;
pub mod openrouter;
pub mod postgres;
pub mod reranker;
pub mod store;

pub use extraction::{extract_text, keyword_skills, ExtractedProfile, ProfileExtractor};
pub use memory::MemoryStore;
pub use openrouter::{OpenRouterClient, OpenRouterError};
pub use postgres::PgStore;
pub use reranker::{RerankCandidate, RerankClient, RerankMode, RerankScore, Reranker};
pub use store::{ProfileStore, StoreError};
