//! Timeline row builders.
//!
//! Each builder takes a start time plus precomputed figures and returns the
//! row together with the clock time at which the next row starts.

use chrono::{Duration, NaiveTime};

use super::clock;
use crate::services::distance::TravelEstimate;
use crate::types::{Conflict, EntryFees, EntryPrice, Location, Plan, Segment, SegmentKind};

/// Order of the refreshment row; attraction rows start right after it
pub const BUFFER_ORDER: f64 = 1.0;

pub fn buffer(route_id: i64, start: NaiveTime, refreshment: Duration) -> (Segment, NaiveTime) {
    let end = clock::advance_clamped(start, refreshment);
    let row = Segment {
        route_id,
        order: BUFFER_ORDER,
        start,
        end,
        kind: SegmentKind::Buffer,
    };
    (row, end)
}

pub fn travel(route_id: i64, order: f64, start: NaiveTime, hotspot_id: i64, estimate: &TravelEstimate) -> (Segment, NaiveTime) {
    let end = clock::advance_clamped(start, estimate.total());
    let row = Segment {
        route_id,
        order,
        start,
        end,
        kind: SegmentKind::Travel {
            hotspot_id,
            figures: estimate.figures(),
        },
    };
    (row, end)
}

#[allow(clippy::too_many_arguments)]
pub fn visit(
    route_id: i64,
    order: f64,
    start: NaiveTime,
    duration: Duration,
    hotspot_id: i64,
    manual: bool,
    fees: EntryFees,
    conflicts: Vec<Conflict>,
) -> (Segment, NaiveTime) {
    let end = clock::advance_clamped(start, duration);
    let row = Segment {
        route_id,
        order,
        start,
        end,
        kind: SegmentKind::Visit {
            hotspot_id,
            manual,
            fees,
            conflicts,
        },
    };
    (row, end)
}

/// Drive to the destination city; the row never ends after `deadline`
/// unless it already starts after it.
pub fn hotel_travel(
    route_id: i64,
    order: f64,
    start: NaiveTime,
    destination: &Location,
    estimate: &TravelEstimate,
    deadline: NaiveTime,
) -> (Segment, NaiveTime) {
    let arrival = clock::advance_clamped(start, estimate.total());
    let end = arrival.min(deadline).max(start);
    let row = Segment {
        route_id,
        order,
        start,
        end,
        kind: SegmentKind::HotelTravel {
            destination: destination.name.clone(),
            figures: estimate.figures(),
        },
    };
    (row, end)
}

pub fn hotel_stay(route_id: i64, order: f64, at: NaiveTime, destination: &Location) -> Segment {
    Segment {
        route_id,
        order,
        start: at,
        end: at,
        kind: SegmentKind::HotelStay {
            destination: destination.name.clone(),
        },
    }
}

pub fn return_trip(route_id: i64, order: f64, start: NaiveTime, destination: &Location, estimate: &TravelEstimate) -> (Segment, NaiveTime) {
    let end = clock::advance_clamped(start, estimate.total());
    let row = Segment {
        route_id,
        order,
        start,
        end,
        kind: SegmentKind::Return {
            destination: destination.name.clone(),
            figures: estimate.figures(),
        },
    };
    (row, end)
}

/// Entry tickets for the whole party, zero when the plan skips tickets
pub fn entry_fees(plan: &Plan, price: Option<&EntryPrice>) -> EntryFees {
    let price = match price {
        Some(p) if plan.entry_ticket_required => p,
        _ => return EntryFees::default(),
    };

    let adults = f64::from(plan.total_adults.max(0)) * price.adult_cost;
    let children = f64::from(plan.total_children.max(0)) * price.child_cost;
    let infants = f64::from(plan.total_infants.max(0)) * price.infant_cost;

    EntryFees {
        adults,
        children,
        infants,
        total: adults + children + infants,
    }
}
