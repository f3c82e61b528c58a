//! Timeline output types

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Discriminator persisted with every timeline row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "segment_type", rename_all = "snake_case")]
pub enum SegmentType {
    Buffer,
    Travel,
    Visit,
    HotelTravel,
    HotelStay,
    Return,
}

impl SegmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentType::Buffer => "buffer",
            SegmentType::Travel => "travel",
            SegmentType::Visit => "visit",
            SegmentType::HotelTravel => "hotel_travel",
            SegmentType::HotelStay => "hotel_stay",
            SegmentType::Return => "return",
        }
    }
}

/// Distance and time figures of a travel-like row
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelFigures {
    pub distance_km: f64,
    pub travel_minutes: i64,
    pub buffer_minutes: i64,
}

/// Entry ticket amounts for the whole party
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFees {
    pub adults: f64,
    pub children: f64,
    pub infants: f64,
    pub total: f64,
}

/// Why a pinned attraction was kept even though it breaks a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conflict {
    /// Not open at the scheduled time
    Closed,
    /// Travel or visit would run past midnight; times are clamped
    CrossesMidnight,
    /// Ends after the leg's hard deadline
    PastCutoff,
    /// Leaves too little time to reach the destination city
    PastDeadline,
}

impl Conflict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conflict::Closed => "closed",
            Conflict::CrossesMidnight => "crosses_midnight",
            Conflict::PastCutoff => "past_cutoff",
            Conflict::PastDeadline => "past_deadline",
        }
    }

    /// Comma-separated labels for storage, `None` when there is no conflict
    pub fn describe(conflicts: &[Conflict]) -> Option<String> {
        if conflicts.is_empty() {
            return None;
        }
        Some(conflicts.iter().map(Conflict::as_str).collect::<Vec<_>>().join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentKind {
    /// Refreshment at the start of the day
    Buffer,
    /// Travel towards an attraction
    #[serde(rename_all = "camelCase")]
    Travel { hotspot_id: i64, figures: TravelFigures },
    #[serde(rename_all = "camelCase")]
    Visit {
        hotspot_id: i64,
        manual: bool,
        fees: EntryFees,
        /// Only pinned attractions are ever placed with conflicts
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        conflicts: Vec<Conflict>,
    },
    /// Travel to the destination city at the end of a non-final day
    HotelTravel { destination: String, figures: TravelFigures },
    HotelStay { destination: String },
    /// Travel to the departure point on the final day
    Return { destination: String, figures: TravelFigures },
}

impl SegmentKind {
    pub fn segment_type(&self) -> SegmentType {
        match self {
            SegmentKind::Buffer => SegmentType::Buffer,
            SegmentKind::Travel { .. } => SegmentType::Travel,
            SegmentKind::Visit { .. } => SegmentType::Visit,
            SegmentKind::HotelTravel { .. } => SegmentType::HotelTravel,
            SegmentKind::HotelStay { .. } => SegmentType::HotelStay,
            SegmentKind::Return { .. } => SegmentType::Return,
        }
    }

    pub fn hotspot_id(&self) -> Option<i64> {
        match self {
            SegmentKind::Travel { hotspot_id, .. } | SegmentKind::Visit { hotspot_id, .. } => Some(*hotspot_id),
            _ => None,
        }
    }

    pub fn figures(&self) -> Option<&TravelFigures> {
        match self {
            SegmentKind::Travel { figures, .. }
            | SegmentKind::HotelTravel { figures, .. }
            | SegmentKind::Return { figures, .. } => Some(figures),
            _ => None,
        }
    }
}

/// One row of the day-by-day timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub route_id: i64,
    /// Display order within the leg; gap-filled rows sit at `n - 0.5`
    pub order: f64,
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(flatten)]
    pub kind: SegmentKind,
}

impl Segment {
    pub fn is_visit(&self) -> bool {
        matches!(self.kind, SegmentKind::Visit { .. })
    }

    pub fn visited_hotspot(&self) -> Option<i64> {
        match self.kind {
            SegmentKind::Visit { hotspot_id, .. } => Some(hotspot_id),
            _ => None,
        }
    }
}

/// Parking fee row for a visited attraction and vehicle type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingChargeRow {
    pub route_id: i64,
    pub hotspot_id: i64,
    pub vehicle_type_id: i64,
    pub vehicle_count: i32,
    pub amount: f64,
}

/// Everything a rebuild produces for one plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResult {
    pub plan_id: i64,
    pub segments: Vec<Segment>,
    pub parking_charges: Vec<ParkingChargeRow>,
    /// Candidates that were considered but never placed
    pub dropped: Vec<i64>,
}

impl TimelineResult {
    pub fn empty(plan_id: i64) -> Self {
        Self {
            plan_id,
            ..Self::default()
        }
    }

    pub fn visit_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_visit()).count()
    }

    pub fn segments_for(&self, route_id: i64) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |s| s.route_id == route_id)
    }

    pub fn summary(&self) -> RebuildSummary {
        RebuildSummary {
            plan_id: self.plan_id,
            segments: self.segments.len(),
            visits: self.visit_count(),
            parking_charges: self.parking_charges.len(),
            dropped: self.dropped.clone(),
        }
    }
}

// ==========================================================================
// Request / response payloads
// ==========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildTimelineRequest {
    pub plan_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewManualRequest {
    pub plan_id: i64,
    pub route_id: i64,
    pub hotspot_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildSummary {
    pub plan_id: i64,
    pub segments: usize,
    pub visits: usize,
    pub parking_charges: usize,
    pub dropped: Vec<i64>,
}
