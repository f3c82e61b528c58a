//! Plan and day-leg types

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Traveler nationality, selects the entry-ticket price list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "nationality", rename_all = "snake_case")]
pub enum Nationality {
    Domestic,
    Foreign,
}

/// Itinerary plan header (read-only input to the timeline engine)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: i64,
    pub trip_start: NaiveDateTime,
    pub trip_end: NaiveDateTime,
    pub arrival_location: String,
    pub departure_location: String,
    pub total_adults: i32,
    pub total_children: i32,
    pub total_infants: i32,
    pub nationality: Nationality,
    pub entry_ticket_required: bool,
}

/// One calendar day of a plan
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DayLeg {
    pub id: i64,
    pub plan_id: i64,
    pub date: NaiveDate,
    pub source_location: String,
    pub destination_location: String,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// Skip scenic source-city stops and head for the destination
    pub direct_to_destination: bool,
    #[sqlx(skip)]
    #[serde(default)]
    pub via_stops: Vec<String>,
}

impl DayLeg {
    pub fn source_city(&self) -> &str {
        super::primary_name(&self.source_location)
    }

    pub fn destination_city(&self) -> &str {
        super::primary_name(&self.destination_location)
    }
}

/// Via stop row (intermediate city on a leg)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ViaStop {
    pub route_id: i64,
    pub location_name: String,
}

/// Attraction pinned by the traveler for a specific leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ManualSelection {
    pub route_id: i64,
    pub hotspot_id: i64,
}
