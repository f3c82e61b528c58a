//! Parking charges for visited attractions

use std::collections::{BTreeMap, HashMap};

use crate::types::{ParkingCharge, ParkingChargeRow, VehicleRequirement};

/// Builds parking rows; one instance per rebuild so its caches never
/// outlive the plan they were computed for.
pub struct ParkingChargeBuilder<'a> {
    vehicles: &'a [VehicleRequirement],
    charges: &'a [ParkingCharge],
    vehicle_totals: Option<BTreeMap<i64, i32>>,
    pair_cache: HashMap<(i64, i64), Option<f64>>,
}

impl<'a> ParkingChargeBuilder<'a> {
    pub fn new(vehicles: &'a [VehicleRequirement], charges: &'a [ParkingCharge]) -> Self {
        Self {
            vehicles,
            charges,
            vehicle_totals: None,
            pair_cache: HashMap::new(),
        }
    }

    /// Vehicle counts summed per type across the plan
    fn vehicle_totals(&mut self) -> &BTreeMap<i64, i32> {
        let vehicles = self.vehicles;
        self.vehicle_totals.get_or_insert_with(|| {
            let mut totals = BTreeMap::new();
            for v in vehicles.iter().filter(|v| v.vehicle_count > 0) {
                *totals.entry(v.vehicle_type_id).or_insert(0) += v.vehicle_count;
            }
            totals
        })
    }

    fn unit_charge(&mut self, hotspot_id: i64, vehicle_type_id: i64) -> Option<f64> {
        let charges = self.charges;
        *self.pair_cache.entry((hotspot_id, vehicle_type_id)).or_insert_with(|| {
            charges
                .iter()
                .find(|c| c.hotspot_id == hotspot_id && c.vehicle_type_id == vehicle_type_id)
                .map(|c| c.charge)
        })
    }

    pub fn rows_for(&mut self, route_id: i64, hotspot_id: i64) -> Vec<ParkingChargeRow> {
        let totals: Vec<(i64, i32)> = self.vehicle_totals().iter().map(|(k, v)| (*k, *v)).collect();

        totals
            .into_iter()
            .filter_map(|(vehicle_type_id, vehicle_count)| {
                let unit = self.unit_charge(hotspot_id, vehicle_type_id)?;
                Some(ParkingChargeRow {
                    route_id,
                    hotspot_id,
                    vehicle_type_id,
                    vehicle_count,
                    amount: unit * f64::from(vehicle_count),
                })
            })
            .collect()
    }
}
