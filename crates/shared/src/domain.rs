use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(LocationId);
id_newtype!(ResidentId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidentStatus {
    Alive,
    Dead,
    Unknown,
}

impl ResidentStatus {
    /// Parses the status string the API reports (`"Alive"`, `"Dead"`, `"unknown"`).
    pub fn from_api_str(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("alive") {
            Self::Alive
        } else if raw.eq_ignore_ascii_case("dead") {
            Self::Dead
        } else {
            Self::Unknown
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Alive => "Alive",
            Self::Dead => "Dead",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ResidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub location_id: LocationId,
    pub name: String,
    pub kind: String,
    pub dimension: String,
    pub resident_refs: Vec<String>,
}

impl LocationRecord {
    pub fn resident_count(&self) -> usize {
        self.resident_refs.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentRecord {
    pub resident_id: ResidentId,
    pub name: String,
    pub image_url: String,
    pub status: ResidentStatus,
    pub origin_name: String,
    pub episode_count: usize,
}
