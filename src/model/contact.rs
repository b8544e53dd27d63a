use serde::{Deserialize, Serialize};

use super::document::Resource;

/// A person in the address book.
///
/// The store-assigned identity lives in `_id` on the wire and in storage. It is
/// optional here because a contact submitted for creation has none yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub firstname: String,
    pub lastname: String,
    pub age: u32,
}

impl Contact {
    /// Creates an unsaved contact.
    pub fn new(firstname: impl Into<String>, lastname: impl Into<String>, age: u32) -> Self {
        Self {
            id: None,
            firstname: firstname.into(),
            lastname: lastname.into(),
            age,
        }
    }
}

impl Resource for Contact {
    const COLLECTION: &'static str = "contacts";
    const NAME: &'static str = "Contact";
}
