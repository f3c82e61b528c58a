//! Location types

use serde::{Deserialize, Serialize};

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Build coordinates from nullable columns. `(0, 0)` is how the catalog
    /// spells "unknown", so it is treated as missing.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() && (lat != 0.0 || lng != 0.0) => {
                Some(Self { lat, lng })
            }
            _ => None,
        }
    }
}

/// Where the traveler is: a place name plus coordinates when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    pub coordinates: Option<Coordinates>,
}

impl Location {
    pub fn new(name: impl Into<String>, coordinates: Option<Coordinates>) -> Self {
        Self {
            name: name.into(),
            coordinates,
        }
    }

    /// Same city after name normalization
    pub fn same_city_as(&self, other: &Location) -> bool {
        let a = normalize_city_name(&self.name);
        !a.is_empty() && a == normalize_city_name(&other.name)
    }
}

/// Words that only describe the kind of terminal, not the city.
const TERMINAL_WORDS: &[&str] = &[
    "international",
    "domestic",
    "airport",
    "railway",
    "rail",
    "station",
    "stn",
    "junction",
    "jn",
    "central",
    "egmore",
    "terminus",
    "stand",
];

/// First segment of a pipe-delimited location string, trimmed.
pub fn primary_name(raw: &str) -> &str {
    raw.split('|').next().unwrap_or("").trim()
}

/// Normalize a city name for matching: lower-case, punctuation to spaces,
/// terminal words ("airport", "railway station", "bus stand", ...) removed.
pub fn normalize_city_name(raw: &str) -> String {
    let lowered: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if matches!(c, '.' | ',' | '(' | ')') { ' ' } else { c })
        .collect();

    let tokens: Vec<&str> = lowered.split_whitespace().collect();
    let mut kept: Vec<&str> = Vec::with_capacity(tokens.len());

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        let next = tokens.get(i + 1).copied();

        // "air port" and "bus stand" are two-word terminal names
        if (token == "air" && next == Some("port")) || (token == "bus" && next == Some("stand")) {
            i += 2;
            continue;
        }
        if !TERMINAL_WORDS.contains(&token) {
            kept.push(token);
        }
        i += 1;
    }

    kept.join(" ")
}
