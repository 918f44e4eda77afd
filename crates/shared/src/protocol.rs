use serde::{Deserialize, Serialize};

use crate::domain::{LocationId, LocationRecord, ResidentId, ResidentRecord, ResidentStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationResponse {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub dimension: String,
    #[serde(default)]
    pub residents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginRef {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub status: String,
    pub origin: OriginRef,
    #[serde(default)]
    pub episode: Vec<String>,
}

impl From<LocationResponse> for LocationRecord {
    fn from(value: LocationResponse) -> Self {
        Self {
            location_id: LocationId(value.id),
            name: value.name,
            kind: value.kind,
            dimension: value.dimension,
            resident_refs: value.residents,
        }
    }
}

impl From<CharacterResponse> for ResidentRecord {
    fn from(value: CharacterResponse) -> Self {
        Self {
            resident_id: ResidentId(value.id),
            name: value.name,
            image_url: value.image,
            status: ResidentStatus::from_api_str(&value.status),
            origin_name: value.origin.name,
            episode_count: value.episode.len(),
        }
    }
}
