//! Core types for catalog search results and entity identification.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Score the service assigns to an exact match.
pub const PERFECT_SCORE: u8 = 100;

/// A ranked search result.
pub trait ResultItem {
    /// Relevance score in `0..=100`, higher is better.
    fn score(&self) -> u8;
}

/// A catalog record that can be searched for by entity kind.
pub trait CatalogEntity: ResultItem + DeserializeOwned {
    /// Which endpoint and response collection this record belongs to.
    const KIND: EntityKind;
}

/// Searchable catalog entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Performing artist or group.
    Artist,
    /// A released product (album, single, …).
    Release,
    /// A distinct recorded track.
    Recording,
    /// A record label.
    Label,
}

impl EntityKind {
    /// Returns the human-readable name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Artist => "Artist",
            Self::Release => "Release",
            Self::Recording => "Recording",
            Self::Label => "Label",
        }
    }

    /// Endpoint path segment, joined onto the service root.
    pub fn url_extension(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Release => "release",
            Self::Recording => "recording",
            Self::Label => "label",
        }
    }

    /// Key of the result array in a search response.
    pub fn collection_key(&self) -> &'static str {
        match self {
            Self::Artist => "artists",
            Self::Release => "releases",
            Self::Recording => "recordings",
            Self::Label => "labels",
        }
    }

    /// Returns all entity kinds.
    pub fn all() -> &'static [EntityKind] {
        &[Self::Artist, Self::Release, Self::Recording, Self::Label]
    }

    /// Parses a kind from its endpoint name (`artist`, `release`, …).
    pub fn from_url_extension(value: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.url_extension().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One artist in a release or recording credit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCredit {
    /// Credited name (may differ from the artist's canonical name).
    pub name: String,
    /// Text joining this credit to the next one, e.g. `" & "`.
    #[serde(default)]
    pub joinphrase: String,
}

/// Renders a credit list the way it is printed on a sleeve.
pub fn format_credits(credits: &[ArtistCredit]) -> String {
    credits
        .iter()
        .map(|credit| format!("{}{}", credit.name, credit.joinphrase))
        .collect()
}

/// An artist search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    #[serde(default)]
    pub score: u8,
    pub name: String,
    #[serde(rename = "sort-name", default)]
    pub sort_name: String,
    #[serde(rename = "type", default)]
    pub artist_type: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub disambiguation: Option<String>,
}

/// A release search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: String,
    #[serde(default)]
    pub score: u8,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(rename = "track-count", default)]
    pub track_count: Option<u32>,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<ArtistCredit>,
}

/// A recording (track) search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    pub id: String,
    #[serde(default)]
    pub score: u8,
    pub title: String,
    /// Duration in milliseconds.
    #[serde(default)]
    pub length: Option<u64>,
    #[serde(rename = "first-release-date", default)]
    pub first_release_date: Option<String>,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<ArtistCredit>,
}

/// A label search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    #[serde(default)]
    pub score: u8,
    pub name: String,
    #[serde(rename = "type", default)]
    pub label_type: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(rename = "label-code", default)]
    pub label_code: Option<u32>,
}

macro_rules! catalog_entity {
    ($ty:ty, $kind:expr) => {
        impl ResultItem for $ty {
            fn score(&self) -> u8 {
                self.score
            }
        }

        impl CatalogEntity for $ty {
            const KIND: EntityKind = $kind;
        }
    };
}

catalog_entity!(Artist, EntityKind::Artist);
catalog_entity!(Release, EntityKind::Release);
catalog_entity!(Recording, EntityKind::Recording);
catalog_entity!(Label, EntityKind::Label);
