//! Wire-level data structures and the mapping between typed resources and stored documents.

pub mod contact;
pub mod document;

pub use contact::*;
pub use document::*;
