use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCharacter {
    pub id: i64,
    pub slug: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCostume {
    pub id: i64,
    pub character_id: i64,
    pub slug: String,
    pub display_name: String,
}

/// Payload of the catalog listing call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogListResponse {
    pub characters: Vec<CatalogCharacter>,
    pub costumes: Vec<CatalogCostume>,
}
