//! Records produced by the two crawl phases

use serde::{Deserialize, Serialize};

/// One follower of the target account, as collected during pagination
///
/// Field names on the wire follow the platform (`pk`, `full_name`) because the
/// external collaborator persists these records and hands them back on resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerRecord {
    /// Opaque platform identifier, the identity key of the record
    #[serde(rename = "pk")]
    pub id: String,

    pub username: String,

    #[serde(rename = "full_name", default)]
    pub display_name: String,
}

impl FollowerRecord {
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            display_name: display_name.into(),
        }
    }
}

/// Profile details of one follower, produced during enrichment
///
/// Every field has a zero value; missing or null upstream fields never
/// surface as null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BioRecord {
    pub biography: String,
    pub external_url: String,
    pub follower_count: u64,
    pub following_count: u64,
    pub is_private: bool,
    pub is_verified: bool,
    pub category: String,
    pub media_count: u64,
}
