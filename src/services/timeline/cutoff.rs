//! Latest allowed attraction end for a leg.
//!
//! The traveler has to reach the leg's destination city by a hard
//! deadline. Every proposed visit is checked from the attraction's own
//! position: a visit in the destination city only has to end by the
//! deadline, anywhere else the drive onward has to fit as well.

use chrono::NaiveTime;

use super::clock;
use crate::defaults::{default_leg_end, default_like_leg_ends, extended_leg_end};
use crate::services::distance::{DistanceCalculator, TravelClass};
use crate::types::{Conflict, Location};

#[derive(Debug, Clone)]
pub struct CutoffPolicy {
    deadline: NaiveTime,
    destination: Location,
    is_final: bool,
}

impl CutoffPolicy {
    /// `priority_picks` is true when the leg carries manual or boundary
    /// candidates, which earn a later deadline on default-ish leg ends.
    pub fn for_leg(leg_end: Option<NaiveTime>, destination: Location, is_final: bool, priority_picks: bool) -> Self {
        let end = leg_end.unwrap_or_else(default_leg_end);
        let deadline = if priority_picks && default_like_leg_ends().contains(&end) {
            extended_leg_end()
        } else {
            end
        };
        Self {
            deadline,
            destination,
            is_final,
        }
    }

    pub fn deadline(&self) -> NaiveTime {
        self.deadline
    }

    pub fn destination(&self) -> &Location {
        &self.destination
    }

    /// `None` means unbounded (final leg)
    pub fn latest_allowed_end(&self, calc: &DistanceCalculator, current: &Location, now: NaiveTime) -> Option<NaiveTime> {
        if self.is_final {
            return None;
        }
        if current.same_city_as(&self.destination) {
            return Some(self.deadline);
        }

        let to_destination = calc.estimate(current, &self.destination, TravelClass::Outstation);
        let latest = clock::retreat_clamped(self.deadline, to_destination.total());
        Some(latest.max(now))
    }

    /// Which deadline a visit at `at` ending at `visit_end` would break, if any
    pub fn violation(&self, calc: &DistanceCalculator, at: &Location, visit_end: NaiveTime) -> Option<Conflict> {
        if self.is_final {
            return None;
        }
        if visit_end > self.deadline {
            return Some(Conflict::PastCutoff);
        }
        if at.same_city_as(&self.destination) {
            return None;
        }

        let to_destination = calc.estimate(at, &self.destination, TravelClass::Outstation);
        match clock::advance(visit_end, to_destination.total()) {
            Some(arrival) if arrival <= self.deadline => None,
            _ => Some(Conflict::PastDeadline),
        }
    }
}
