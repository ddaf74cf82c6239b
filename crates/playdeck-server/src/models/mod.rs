//! Domain models shared by the gateway and the feature slices

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod speed_sorting;

pub use speed_sorting::{Category, Item, SpeedSortingDataset};

/// Known game types, identified by their template slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameTemplateKind {
    SpeedSorting,
    Quiz,
    PairOrNoPair,
}

impl GameTemplateKind {
    pub const fn slug(self) -> &'static str {
        match self {
            GameTemplateKind::SpeedSorting => "speed-sorting",
            GameTemplateKind::Quiz => "quiz",
            GameTemplateKind::PairOrNoPair => "pair-or-no-pair",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "speed-sorting" => Some(GameTemplateKind::SpeedSorting),
            "quiz" => Some(GameTemplateKind::Quiz),
            "pair-or-no-pair" => Some(GameTemplateKind::PairOrNoPair),
            _ => None,
        }
    }
}

/// A stored `game_json` blob, typed by the template it belongs to.
///
/// Only speed-sorting is decoded; every other template keeps its payload
/// verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum GameDataset {
    SpeedSorting(SpeedSortingDataset),
    Opaque { slug: String, payload: Value },
}

impl GameDataset {
    pub fn decode(slug: &str, payload: Value) -> Result<Self, serde_json::Error> {
        match GameTemplateKind::from_slug(slug) {
            Some(GameTemplateKind::SpeedSorting) => {
                Ok(GameDataset::SpeedSorting(serde_json::from_value(payload)?))
            },
            _ => Ok(GameDataset::Opaque {
                slug: slug.to_string(),
                payload,
            }),
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            GameDataset::SpeedSorting(_) => GameTemplateKind::SpeedSorting.slug(),
            GameDataset::Opaque { slug, .. } => slug,
        }
    }

    /// The JSON written to `games.game_json`.
    pub fn into_payload(self) -> Result<Value, serde_json::Error> {
        match self {
            GameDataset::SpeedSorting(dataset) => serde_json::to_value(dataset),
            GameDataset::Opaque { payload, .. } => Ok(payload),
        }
    }
}

impl From<SpeedSortingDataset> for GameDataset {
    fn from(dataset: SpeedSortingDataset) -> Self {
        GameDataset::SpeedSorting(dataset)
    }
}
