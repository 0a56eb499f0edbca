//! Data models for Lectern

pub mod author;
pub mod book;
pub mod user;

// Re-export commonly used types
pub use author::AuthorPayload;
pub use book::{BookDetailRecord, BookSummary, CoverSize, PatchChange, RecordPatch, WorkKey};
pub use user::{Session, UserProfile};
