use serde::{Deserialize, Serialize};

/// A catalogued tag that items reference by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub image: Option<String>,
}
