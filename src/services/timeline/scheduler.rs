//! Greedy multi-pass scheduling of one day leg.
//!
//! A leg moves through these phases:
//!
//! 1. **Initializing** - cursor at the leg start, refreshment buffer,
//!    candidate selection and the first cutoff
//! 2. **Placing** - candidates in selector order; each is placed, deferred
//!    (opens later) or dropped
//! 3. **Deferred retry** - further passes over the deferred work queue while
//!    passes keep placing something
//! 4. **Gap filling** - at most one still-deferred candidate squeezed in
//!    before the first placed visit
//! 5. **Pinning** - manual picks still left over are placed regardless,
//!    waiting for their opening if they have one
//! 6. **Closing** - hotel travel and stay, or the final return trip
//!
//! A manual pick is never dropped. Where it breaks opening hours, the
//! deadline or midnight it is placed at its arrival anyway and the visit
//! row records the conflicts.
//!
//! Every leg gets its own cursor; nothing is shared between legs except the
//! set of already visited attractions handed in by the engine.

use std::collections::{HashSet, VecDeque};

use chrono::{Datelike, Duration, NaiveTime, Weekday};
use tracing::{debug, trace};

use super::clock;
use super::cutoff::CutoffPolicy;
use super::opening_hours::Availability;
use super::parking::ParkingChargeBuilder;
use super::prefetch::PlanData;
use super::segments::{self, BUFFER_ORDER};
use super::selector::{self, Candidate, SelectionInput};
use crate::defaults::default_leg_start;
use crate::services::distance::{TravelClass, TravelEstimate};
use crate::types::{Conflict, DayLeg, Hotspot, Location, ParkingChargeRow, SchedulerSettings, Segment, SegmentKind};

/// What one leg produced
#[derive(Debug, Clone, Default)]
pub struct LegOutcome {
    pub segments: Vec<Segment>,
    pub parking_charges: Vec<ParkingChargeRow>,
    /// Attractions visited on this leg, in placement order
    pub placed: Vec<i64>,
    /// Candidates of this leg that were never placed
    pub unplaced: Vec<i64>,
}

/// Per-leg inputs
pub struct LegContext<'a> {
    pub data: &'a PlanData,
    pub settings: &'a SchedulerSettings,
    pub leg: &'a DayLeg,
    pub is_final: bool,
    /// Attractions pinned to this leg
    pub pinned: &'a HashSet<i64>,
    /// Visited earlier in the plan or pinned to another leg
    pub excluded: &'a HashSet<i64>,
}

struct ScheduleCursor {
    now: NaiveTime,
    location: Location,
    segments: Vec<Segment>,
    placed: Vec<i64>,
    next_order: f64,
}

/// A candidate waiting in the work queue
struct Pending<'a> {
    candidate: Candidate<'a>,
    deferred_until: Option<NaiveTime>,
}

/// A visit that fits the opening hours when leaving `from` at a given time
struct VisitFit {
    location: Location,
    travel: TravelEstimate,
    arrival: NaiveTime,
    start: NaiveTime,
    end: NaiveTime,
    duration: Duration,
    conflicts: Vec<Conflict>,
}

/// How far a candidate may bend the rules to get placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Insist {
    No,
    /// Manual pick that can still wait for a later pass
    Defer,
    /// Manual pick out of passes: place it now
    Always,
}

impl Insist {
    fn for_candidate(candidate: &Candidate<'_>) -> Self {
        if candidate.is_manual() {
            Insist::Defer
        } else {
            Insist::No
        }
    }
}

enum Fit {
    Fits(VisitFit),
    Later(NaiveTime),
    Reject(&'static str),
}

enum Attempt {
    Placed,
    Deferred(NaiveTime),
    Dropped(&'static str),
}

struct LegScheduler<'a, 'p> {
    ctx: &'a LegContext<'a>,
    weekday: Weekday,
    policy: CutoffPolicy,
    cursor: ScheduleCursor,
    parking: &'a mut ParkingChargeBuilder<'p>,
    parking_rows: Vec<ParkingChargeRow>,
    /// Where and when attraction placement began (after the buffer)
    effective_start: NaiveTime,
    start_location: Location,
}

/// Schedule one leg end to end
pub fn schedule_leg(ctx: &LegContext<'_>, parking: &mut ParkingChargeBuilder<'_>) -> LegOutcome {
    let data = ctx.data;
    let leg = ctx.leg;

    // Initializing
    let start = leg.start_time.unwrap_or_else(default_leg_start);
    let start_location = data.city(&leg.source_location);
    let mut segments = Vec::new();
    let refreshment = data.distances.settings().refreshment();
    let now = if ctx.is_final {
        clock::advance_clamped(start, refreshment)
    } else {
        let (row, next) = segments::buffer(leg.id, start, refreshment);
        segments.push(row);
        next
    };

    let candidates = selector::select_for_leg(
        &data.catalog,
        &SelectionInput {
            leg,
            start: start_location.coordinates,
            pinned: ctx.pinned,
            excluded: ctx.excluded,
            scenic_source_limit: ctx.settings.scenic_source_limit,
        },
    );

    let priority_picks = candidates.iter().any(Candidate::extends_deadline);
    let policy = CutoffPolicy::for_leg(
        leg.end_time,
        data.city(&leg.destination_location),
        ctx.is_final,
        priority_picks,
    );
    let latest_end = policy.latest_allowed_end(&data.distances, &start_location, now);

    debug!(
        route_id = leg.id,
        date = %leg.date,
        candidates = candidates.len(),
        deadline = %policy.deadline(),
        latest_end = ?latest_end,
        is_final = ctx.is_final,
        "Scheduling leg"
    );

    let mut scheduler = LegScheduler {
        ctx,
        weekday: leg.date.weekday(),
        policy,
        cursor: ScheduleCursor {
            now,
            location: start_location.clone(),
            segments,
            placed: Vec::new(),
            next_order: BUFFER_ORDER + 1.0,
        },
        parking,
        parking_rows: Vec::new(),
        effective_start: now,
        start_location,
    };

    let considered: Vec<i64> = candidates.iter().map(Candidate::id).collect();
    let deferred = scheduler.place_passes(candidates);
    let deferred = scheduler.gap_fill(deferred);
    let deferred = scheduler.place_pinned(deferred);
    if !deferred.is_empty() {
        trace!(route_id = leg.id, remaining = deferred.len(), "Deferred candidates left unplaced");
    }
    scheduler.close();

    let LegScheduler { cursor, parking_rows, .. } = scheduler;
    let unplaced = considered.into_iter().filter(|id| !cursor.placed.contains(id)).collect();

    LegOutcome {
        segments: cursor.segments,
        parking_charges: parking_rows,
        placed: cursor.placed,
        unplaced,
    }
}

impl<'a, 'p> LegScheduler<'a, 'p> {
    fn route_id(&self) -> i64 {
        self.ctx.leg.id
    }

    /// Work out travel, arrival and opening hours for visiting `hotspot`
    /// when leaving `from` at `depart`. Manual picks never get `Reject`;
    /// whatever would reject them ends up in `VisitFit::conflicts`.
    fn fit_visit(&self, from: &Location, depart: NaiveTime, hotspot: &Hotspot, insist: Insist) -> Fit {
        let pinned = insist != Insist::No;
        if hotspot.coordinates().is_none() && !pinned {
            return Fit::Reject("no coordinates");
        }
        let duration = match hotspot.visit_duration() {
            Some(duration) => duration,
            None if pinned => Duration::zero(),
            None => return Fit::Reject("zero duration"),
        };

        let mut conflicts = Vec::new();
        let location = hotspot.as_location();
        let travel = self.ctx.data.distances.estimate_between(from, &location);
        let arrival = match clock::advance(depart, travel.total()) {
            Some(arrival) => arrival,
            None if pinned => {
                conflicts.push(Conflict::CrossesMidnight);
                clock::end_of_day()
            }
            None => return Fit::Reject("arrival after midnight"),
        };
        let end = clock::advance_clamped(arrival, duration);

        let start = match self.ctx.data.opening_hours.can_visit(hotspot.id, self.weekday, arrival, end) {
            Availability::Open => arrival,
            Availability::OpenAfterWait { start } => start,
            Availability::OpensLater { at } if insist == Insist::Always => at,
            Availability::OpensLater { at } => return Fit::Later(at),
            Availability::Closed if pinned => {
                conflicts.push(Conflict::Closed);
                arrival
            }
            Availability::Closed => return Fit::Reject("closed"),
        };
        let end = match clock::advance(start, duration) {
            Some(end) => end,
            None if pinned => {
                if !conflicts.contains(&Conflict::CrossesMidnight) {
                    conflicts.push(Conflict::CrossesMidnight);
                }
                clock::end_of_day()
            }
            None => return Fit::Reject("visit past midnight"),
        };

        Fit::Fits(VisitFit {
            location,
            travel,
            arrival,
            start,
            end,
            duration,
            conflicts,
        })
    }

    /// Pass 1 over the selector order, then retries of the deferred queue.
    /// Returns whatever is still deferred.
    fn place_passes(&mut self, candidates: Vec<Candidate<'a>>) -> Vec<Pending<'a>> {
        let mut queue: VecDeque<Pending<'a>> = candidates
            .into_iter()
            .map(|candidate| Pending {
                candidate,
                deferred_until: None,
            })
            .collect();

        for pass in 1..=self.ctx.settings.max_passes {
            let mut deferred = VecDeque::new();
            let mut placed_any = false;

            while let Some(mut pending) = queue.pop_front() {
                if pending.deferred_until.is_some_and(|until| self.still_closed(&pending.candidate, until)) {
                    trace!(pass, hotspot_id = pending.candidate.id(), "Still closed");
                    deferred.push_back(pending);
                    continue;
                }
                match self.attempt(&pending.candidate, Insist::for_candidate(&pending.candidate)) {
                    Attempt::Placed => placed_any = true,
                    Attempt::Deferred(at) => {
                        trace!(pass, hotspot_id = pending.candidate.id(), opens = %at, "Deferred");
                        pending.deferred_until = Some(at);
                        deferred.push_back(pending);
                    }
                    Attempt::Dropped(reason) => {
                        trace!(pass, hotspot_id = pending.candidate.id(), reason, "Dropped");
                    }
                }
            }

            queue = deferred;
            if !placed_any || queue.is_empty() {
                break;
            }
            trace!(route_id = self.route_id(), pass, deferred = queue.len(), "Retrying deferred candidates");
        }

        queue.into()
    }

    /// Whether a deferred candidate would still arrive too early for the
    /// opening it waits for, so another attempt is pointless
    fn still_closed(&self, candidate: &Candidate<'a>, until: NaiveTime) -> bool {
        let travel = self
            .ctx
            .data
            .distances
            .estimate_between(&self.cursor.location, &candidate.hotspot.as_location());
        clock::advance(self.cursor.now, travel.total() + self.ctx.settings.max_wait())
            .is_some_and(|latest_start| latest_start < until)
    }

    fn attempt(&mut self, candidate: &Candidate<'a>, insist: Insist) -> Attempt {
        let hotspot = candidate.hotspot;
        let mut fit = match self.fit_visit(&self.cursor.location, self.cursor.now, hotspot, insist) {
            Fit::Fits(fit) => fit,
            Fit::Later(at) => return Attempt::Deferred(at),
            Fit::Reject(reason) => return Attempt::Dropped(reason),
        };

        if let Some(conflict) = self.policy.violation(&self.ctx.data.distances, &fit.location, fit.end) {
            if insist == Insist::No {
                return Attempt::Dropped(conflict.as_str());
            }
            fit.conflicts.push(conflict);
        }

        self.place(candidate, fit);
        Attempt::Placed
    }

    fn place(&mut self, candidate: &Candidate<'a>, fit: VisitFit) {
        let route_id = self.route_id();
        let hotspot_id = candidate.id();
        let order = self.cursor.next_order;

        let (travel_row, _) = segments::travel(route_id, order, self.cursor.now, hotspot_id, &fit.travel);
        let (visit_row, end) = segments::visit(
            route_id,
            order,
            fit.start,
            fit.duration,
            hotspot_id,
            candidate.is_manual(),
            segments::entry_fees(&self.ctx.data.plan, self.ctx.data.price_for(hotspot_id)),
            fit.conflicts.clone(),
        );
        self.cursor.segments.push(travel_row);
        self.cursor.segments.push(visit_row);
        self.cursor.placed.push(hotspot_id);
        self.cursor.next_order += 1.0;
        self.cursor.now = end;
        self.cursor.location = fit.location;
        self.parking_rows.extend(self.parking.rows_for(route_id, hotspot_id));

        trace!(
            route_id,
            hotspot_id,
            arrival = %fit.arrival,
            start = %fit.start,
            end = %end,
            conflicts = ?fit.conflicts,
            "Placed"
        );
    }

    /// Try to use idle time before the first placed visit for one deferred
    /// candidate. Returns the candidates that remain deferred.
    fn gap_fill(&mut self, deferred: Vec<Pending<'a>>) -> Vec<Pending<'a>> {
        let Some(first_visit_idx) = self.cursor.segments.iter().position(Segment::is_visit) else {
            return deferred;
        };
        if deferred.is_empty() {
            return deferred;
        }

        let first_visit = self.cursor.segments[first_visit_idx].clone();
        let Some(first_travel_idx) = self
            .cursor
            .segments
            .iter()
            .position(|s| s.order == first_visit.order && matches!(s.kind, SegmentKind::Travel { .. }))
        else {
            return deferred;
        };
        let Some(first_hotspot) = first_visit.visited_hotspot().and_then(|id| self.ctx.data.hotspot(id)) else {
            return deferred;
        };
        let first_location = first_hotspot.as_location();
        let margin = self.ctx.settings.gap_fill_margin();

        let mut remaining = Vec::with_capacity(deferred.len());
        let mut filled = false;

        for pending in deferred {
            if filled {
                remaining.push(pending);
                continue;
            }
            match self.try_gap_fill(&pending, first_visit.start, &first_location, margin) {
                Some((fit, onward)) => {
                    self.insert_filler(&pending.candidate, fit, onward, first_travel_idx, first_visit.order);
                    filled = true;
                }
                None => remaining.push(pending),
            }
        }

        remaining
    }

    fn try_gap_fill(
        &self,
        pending: &Pending<'a>,
        first_start: NaiveTime,
        first_location: &Location,
        margin: Duration,
    ) -> Option<(VisitFit, TravelEstimate)> {
        let hotspot = pending.candidate.hotspot;
        let fit = match self.fit_visit(&self.start_location, self.effective_start, hotspot, Insist::No) {
            Fit::Fits(fit) => fit,
            _ => return None,
        };

        let onward = self.ctx.data.distances.estimate_between(&fit.location, first_location);
        let ready = clock::advance(fit.end, onward.total() + margin)?;
        if ready > first_start {
            trace!(hotspot_id = hotspot.id, ready = %ready, first_start = %first_start, "Gap too small");
            return None;
        }
        if self
            .policy
            .violation(&self.ctx.data.distances, &fit.location, fit.end)
            .is_some()
        {
            return None;
        }
        Some((fit, onward))
    }

    fn insert_filler(
        &mut self,
        candidate: &Candidate<'a>,
        fit: VisitFit,
        onward: TravelEstimate,
        first_travel_idx: usize,
        first_order: f64,
    ) {
        let route_id = self.route_id();
        let hotspot_id = candidate.id();
        let order = first_order - 0.5;

        let (travel_row, _) = segments::travel(route_id, order, self.effective_start, hotspot_id, &fit.travel);
        let (visit_row, filler_end) = segments::visit(
            route_id,
            order,
            fit.start,
            fit.duration,
            hotspot_id,
            candidate.is_manual(),
            segments::entry_fees(&self.ctx.data.plan, self.ctx.data.price_for(hotspot_id)),
            fit.conflicts,
        );

        // The first attraction is now reached from the filler
        if let Some(first_hotspot) = self.cursor.segments[first_travel_idx].kind.hotspot_id() {
            let (rebuilt, _) = segments::travel(route_id, first_order, filler_end, first_hotspot, &onward);
            self.cursor.segments[first_travel_idx] = rebuilt;
        }

        self.cursor.segments.insert(first_travel_idx, visit_row);
        self.cursor.segments.insert(first_travel_idx, travel_row);
        self.cursor.placed.push(hotspot_id);
        self.parking_rows.extend(self.parking.rows_for(route_id, hotspot_id));

        debug!(route_id, hotspot_id, start = %fit.start, end = %filler_end, "Gap filled before first visit");
    }

    /// Place the manual picks that survived every pass and the gap fill.
    /// Returns the regular candidates that stay unplaced.
    fn place_pinned(&mut self, deferred: Vec<Pending<'a>>) -> Vec<Pending<'a>> {
        let mut remaining = Vec::with_capacity(deferred.len());
        for pending in deferred {
            if !pending.candidate.is_manual() {
                remaining.push(pending);
                continue;
            }
            match self.attempt(&pending.candidate, Insist::Always) {
                Attempt::Placed => {
                    debug!(
                        route_id = self.route_id(),
                        hotspot_id = pending.candidate.id(),
                        "Pinned attraction placed after retries"
                    );
                }
                Attempt::Deferred(_) | Attempt::Dropped(_) => remaining.push(pending),
            }
        }
        remaining
    }

    fn close(&mut self) {
        let data = self.ctx.data;
        let route_id = self.route_id();
        let order = self.cursor.next_order;

        if self.ctx.is_final {
            let departure = data.city(&data.plan.departure_location);
            let estimate = data
                .distances
                .estimate(&self.cursor.location, &departure, TravelClass::Outstation);
            let (row, end) = segments::return_trip(route_id, order, self.cursor.now, &departure, &estimate);
            self.cursor.segments.push(row);
            self.cursor.now = end;
            self.cursor.location = departure;
        } else {
            let destination = self.policy.destination().clone();
            let estimate = data
                .distances
                .estimate(&self.cursor.location, &destination, TravelClass::Outstation);
            let (row, end) = segments::hotel_travel(
                route_id,
                order,
                self.cursor.now,
                &destination,
                &estimate,
                self.policy.deadline(),
            );
            self.cursor.segments.push(row);
            self.cursor
                .segments
                .push(segments::hotel_stay(route_id, order + 1.0, end, &destination));
            self.cursor.now = end;
            self.cursor.location = destination;
        }
    }
}
