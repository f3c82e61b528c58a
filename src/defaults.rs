use chrono::NaiveTime;

pub const DEFAULT_VISIT_DURATION_MINUTES: i64 = 60;
pub const DEFAULT_REFRESHMENT_MINUTES: i64 = 60;

pub const DEFAULT_LOCAL_SPEED_KMH: f64 = 40.0;
pub const DEFAULT_OUTSTATION_SPEED_KMH: f64 = 60.0;

/// Local hops longer than this are not allowed to use a local speed below
/// `DEFAULT_LOCAL_SPEED_KMH`.
pub const LOCAL_SPEED_FLOOR_DISTANCE_KM: f64 = 10.0;

/// Straight line to road distance
pub const ROAD_CORRECTION_FACTOR: f64 = 1.5;

/// Ceiling for any single travel estimate; longer figures are bad data
pub const MAX_TRAVEL_MINUTES: i64 = 7 * 24 * 60;

pub const MAX_SCHEDULING_PASSES: u32 = 5;
pub const MAX_OPENING_WAIT_MINUTES: i64 = 30;
pub const GAP_FILL_MARGIN_MINUTES: i64 = 5;
pub const SCENIC_SOURCE_LIMIT: usize = 3;

/// Priority 0 means "no priority" and sorts after every ranked attraction.
pub const UNRANKED_PRIORITY: i32 = 9999;

pub fn default_leg_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).expect("valid static leg start")
}

pub fn default_leg_end() -> NaiveTime {
    NaiveTime::from_hms_opt(20, 0, 0).expect("valid static leg end")
}

/// Deadline used instead of a default-ish leg end when the day carries
/// manual or boundary attractions.
pub fn extended_leg_end() -> NaiveTime {
    NaiveTime::from_hms_opt(22, 0, 0).expect("valid static extended leg end")
}

/// Leg end times that count as "not chosen by the user".
pub fn default_like_leg_ends() -> [NaiveTime; 2] {
    [
        NaiveTime::from_hms_opt(18, 0, 0).expect("valid static 18:00"),
        default_leg_end(),
    ]
}
