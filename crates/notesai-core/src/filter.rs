//! Filter engine for the visible note list.
//!
//! A note is visible when it passes both the color facet and the text
//! search. The result keeps the input order; pinned-first ordering belongs
//! to the repository's `fetch_all`, not to this module.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::models::{Note, NoteColor};

/// Color facet of the filter: everything, or a single color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorFilter {
    #[default]
    All,
    Only(NoteColor),
}

impl fmt::Display for ColorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorFilter::All => f.write_str("all"),
            ColorFilter::Only(color) => write!(f, "{}", color),
        }
    }
}

impl FromStr for ColorFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(ColorFilter::All)
        } else {
            s.parse().map(ColorFilter::Only)
        }
    }
}

impl Serialize for ColorFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ColorFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Transient filter state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub selected_color: ColorFilter,
}

impl FilterCriteria {
    pub fn new(search_query: impl Into<String>, selected_color: ColorFilter) -> Self {
        Self {
            search_query: search_query.into(),
            selected_color,
        }
    }

    /// True when this criteria matches every note.
    pub fn is_unfiltered(&self) -> bool {
        self.search_query.is_empty() && self.selected_color == ColorFilter::All
    }
}

/// Color facet predicate.
pub fn matches_color(note: &Note, filter: ColorFilter) -> bool {
    match filter {
        ColorFilter::All => true,
        ColorFilter::Only(color) => note.color == color,
    }
}

/// Case-insensitive substring match against title or content.
///
/// `needle` must already be lowercased; an empty needle matches everything.
pub fn matches_search(note: &Note, needle: &str) -> bool {
    needle.is_empty()
        || note.title.to_lowercase().contains(needle)
        || note.content.to_lowercase().contains(needle)
}

/// Notes passing both predicates, in input order.
pub fn filter_notes<'a>(notes: &'a [Note], criteria: &FilterCriteria) -> Vec<&'a Note> {
    let needle = criteria.search_query.to_lowercase();
    notes
        .iter()
        .filter(|note| {
            matches_color(note, criteria.selected_color) && matches_search(note, &needle)
        })
        .collect()
}
