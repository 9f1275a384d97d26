use crate::domain::model::{checked_total, Scenario};
use crate::utils::error::{Result, SolverError};
use crate::utils::validation::Validate;

const DEFAULT_ASSIGNMENT_COST: f64 = 50.0;
const DEFAULT_TRANSPORT_COST: f64 = 12.0;
const DEFAULT_ZONE_VOLUME: f64 = 250.0;
const DEFAULT_DISTANCE: f64 = 50.0;
const DEFAULT_SUPPLY: u64 = 100;
const DEFAULT_DEMAND: u64 = 100;
const DEFAULT_PROCESSING_RATE: f64 = 0.8;

/// Editable scenario state shared by the three models.
///
/// Every operation keeps the label lists, matrices and vectors the same
/// length, so the wrapped [`Scenario`] always passes validation.
#[derive(Debug, Clone, Default)]
pub struct ScenarioStore {
    scenario: Scenario,
}

/// Spreadsheet-style column letters: 0 -> A, 25 -> Z, 26 -> AA.
pub fn zone_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn check_index(kind: &str, index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(SolverError::IndexOutOfRange {
            kind: kind.to_string(),
            index,
            len,
        });
    }
    Ok(())
}

fn check_removable(kind: &str, index: usize, len: usize) -> Result<()> {
    if len <= 1 {
        return Err(SolverError::LastEntity {
            kind: kind.to_string(),
        });
    }
    check_index(kind, index, len)
}

fn check_finite(row: usize, col: usize, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(SolverError::InvalidCost { row, col, value });
    }
    Ok(())
}

impl ScenarioStore {
    /// Wraps `scenario` after checking that its lengths and values agree.
    pub fn new(scenario: Scenario) -> Result<Self> {
        scenario.validate()?;
        Ok(Self { scenario })
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn into_scenario(self) -> Scenario {
        self.scenario
    }

    pub fn add_vehicle(&mut self) {
        let data = &mut self.scenario;
        data.vehicles.push(format!("Vehicle {}", data.vehicles.len() + 1));
        data.assignment_costs
            .push(vec![DEFAULT_ASSIGNMENT_COST; data.zones.len()]);
        tracing::debug!("Added vehicle, now {}", data.vehicles.len());
    }

    pub fn remove_vehicle(&mut self, index: usize) -> Result<()> {
        let data = &mut self.scenario;
        check_removable("vehicle", index, data.vehicles.len())?;
        data.vehicles.remove(index);
        data.assignment_costs.remove(index);
        Ok(())
    }

    pub fn add_zone(&mut self) {
        let data = &mut self.scenario;
        data.zones.push(format!("Zone {}", zone_letter(data.zones.len())));
        for row in &mut data.assignment_costs {
            row.push(DEFAULT_ASSIGNMENT_COST);
        }
        data.zone_volumes.push(DEFAULT_ZONE_VOLUME);
        data.transport_distances
            .push(vec![DEFAULT_DISTANCE; data.processing_centers.len()]);
        tracing::debug!("Added zone, now {}", data.zones.len());
    }

    pub fn remove_zone(&mut self, index: usize) -> Result<()> {
        let data = &mut self.scenario;
        check_removable("zone", index, data.zones.len())?;
        data.zones.remove(index);
        for row in &mut data.assignment_costs {
            row.remove(index);
        }
        data.zone_volumes.remove(index);
        data.transport_distances.remove(index);
        Ok(())
    }

    pub fn add_collection_point(&mut self) {
        let data = &mut self.scenario;
        data.collection_points
            .push(format!("Collection Point {}", data.collection_points.len() + 1));
        data.transportation_costs
            .push(vec![DEFAULT_TRANSPORT_COST; data.processing_centers.len()]);
        data.supply.push(DEFAULT_SUPPLY);
    }

    pub fn remove_collection_point(&mut self, index: usize) -> Result<()> {
        let data = &mut self.scenario;
        check_removable("collection point", index, data.collection_points.len())?;
        data.collection_points.remove(index);
        data.transportation_costs.remove(index);
        data.supply.remove(index);
        Ok(())
    }

    pub fn add_processing_center(&mut self) {
        let data = &mut self.scenario;
        data.processing_centers
            .push(format!("Processing Center {}", data.processing_centers.len() + 1));
        for row in &mut data.transportation_costs {
            row.push(DEFAULT_TRANSPORT_COST);
        }
        data.demand.push(DEFAULT_DEMAND);
        data.processing_rates.push(DEFAULT_PROCESSING_RATE);
        for row in &mut data.transport_distances {
            row.push(DEFAULT_DISTANCE);
        }
    }

    pub fn remove_processing_center(&mut self, index: usize) -> Result<()> {
        let data = &mut self.scenario;
        check_removable("processing center", index, data.processing_centers.len())?;
        data.processing_centers.remove(index);
        for row in &mut data.transportation_costs {
            row.remove(index);
        }
        data.demand.remove(index);
        data.processing_rates.remove(index);
        for row in &mut data.transport_distances {
            row.remove(index);
        }
        Ok(())
    }

    pub fn set_assignment_cost(&mut self, vehicle: usize, zone: usize, value: f64) -> Result<()> {
        let data = &mut self.scenario;
        check_index("vehicle", vehicle, data.vehicles.len())?;
        check_index("zone", zone, data.zones.len())?;
        check_finite(vehicle, zone, value)?;
        data.assignment_costs[vehicle][zone] = value;
        Ok(())
    }

    pub fn set_transportation_cost(&mut self, source: usize, center: usize, value: f64) -> Result<()> {
        let data = &mut self.scenario;
        check_index("collection point", source, data.collection_points.len())?;
        check_index("processing center", center, data.processing_centers.len())?;
        check_finite(source, center, value)?;
        data.transportation_costs[source][center] = value;
        Ok(())
    }

    pub fn set_transport_distance(&mut self, zone: usize, center: usize, value: f64) -> Result<()> {
        let data = &mut self.scenario;
        check_index("zone", zone, data.zones.len())?;
        check_index("processing center", center, data.processing_centers.len())?;
        check_finite(zone, center, value)?;
        data.transport_distances[zone][center] = value;
        Ok(())
    }

    pub fn set_supply(&mut self, source: usize, value: u64) -> Result<()> {
        check_index("collection point", source, self.scenario.supply.len())?;
        let mut supply = self.scenario.supply.clone();
        supply[source] = value;
        checked_total("supply", &supply)?;
        self.scenario.supply = supply;
        Ok(())
    }

    pub fn set_demand(&mut self, center: usize, value: u64) -> Result<()> {
        check_index("processing center", center, self.scenario.demand.len())?;
        let mut demand = self.scenario.demand.clone();
        demand[center] = value;
        checked_total("demand", &demand)?;
        self.scenario.demand = demand;
        Ok(())
    }

    pub fn set_zone_volume(&mut self, zone: usize, value: f64) -> Result<()> {
        check_index("zone", zone, self.scenario.zone_volumes.len())?;
        if !value.is_finite() || value < 0.0 {
            return Err(SolverError::ValidationError {
                message: format!("zone volume must be non-negative, got {}", value),
            });
        }
        self.scenario.zone_volumes[zone] = value;
        Ok(())
    }

    pub fn set_processing_rate(&mut self, center: usize, value: f64) -> Result<()> {
        check_index("processing center", center, self.scenario.processing_rates.len())?;
        if !(0.0..=1.0).contains(&value) {
            return Err(SolverError::ValidationError {
                message: format!("processing rate must be within 0-1, got {}", value),
            });
        }
        self.scenario.processing_rates[center] = value;
        Ok(())
    }

    /// (total supply, total demand)
    pub fn totals(&self) -> Result<(u64, u64)> {
        Ok((self.scenario.total_supply()?, self.scenario.total_demand()?))
    }

    pub fn is_balanced(&self) -> bool {
        matches!(self.totals(), Ok((supply, demand)) if supply == demand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_letter_wraps_like_spreadsheet_columns() {
        assert_eq!(zone_letter(0), "A");
        assert_eq!(zone_letter(4), "E");
        assert_eq!(zone_letter(25), "Z");
        assert_eq!(zone_letter(26), "AA");
        assert_eq!(zone_letter(27), "AB");
        assert_eq!(zone_letter(701), "ZZ");
        assert_eq!(zone_letter(702), "AAA");
    }

    #[test]
    fn test_add_zone_extends_every_zone_indexed_field() {
        let mut store = ScenarioStore::default();
        store.add_zone();

        let data = store.scenario();
        assert_eq!(data.zones.last().unwrap(), "Zone E");
        assert!(data.assignment_costs.iter().all(|row| row.len() == 5));
        assert_eq!(data.assignment_costs[0][4], 50.0);
        assert_eq!(data.zone_volumes[4], 250.0);
        assert_eq!(data.transport_distances[4], vec![50.0; 3]);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_processing_center_edits_keep_distance_columns() {
        let mut store = ScenarioStore::default();
        store.add_processing_center();
        assert!(store.scenario().transport_distances.iter().all(|r| r.len() == 4));
        assert_eq!(store.scenario().processing_rates[3], 0.8);
        assert!(store.scenario().validate().is_ok());

        store.remove_processing_center(0).unwrap();
        let data = store.scenario();
        assert_eq!(data.processing_centers[0], "Processing Center 2");
        assert_eq!(data.transport_distances[0], vec![70.0, 90.0, 50.0]);
        assert_eq!(data.transportation_costs[0], vec![15.0, 20.0, 12.0]);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_cannot_remove_last_vehicle() {
        let mut store = ScenarioStore::default();
        for _ in 0..3 {
            store.remove_vehicle(0).unwrap();
        }
        let err = store.remove_vehicle(0).unwrap_err();
        assert_eq!(err.to_string(), "Must have at least one vehicle");
        assert_eq!(store.scenario().vehicles, vec!["Vehicle 4".to_string()]);
    }

    #[test]
    fn test_remove_out_of_range_is_rejected() {
        let mut store = ScenarioStore::default();
        assert!(matches!(
            store.remove_collection_point(7),
            Err(SolverError::IndexOutOfRange { index: 7, len: 3, .. })
        ));
    }

    #[test]
    fn test_balance_tracks_supply_edits() {
        let mut store = ScenarioStore::default();
        assert!(store.is_balanced());
        store.set_supply(0, 90).unwrap();
        assert_eq!(store.totals().unwrap(), (360, 370));
        assert!(!store.is_balanced());
    }

    #[test]
    fn test_new_rejects_inconsistent_scenario() {
        let mut scenario = Scenario::default();
        scenario.assignment_costs.pop();
        assert!(matches!(
            ScenarioStore::new(scenario),
            Err(SolverError::DimensionMismatch { .. })
        ));

        let store = ScenarioStore::new(Scenario::default()).unwrap();
        assert_eq!(store.scenario(), &Scenario::default());
    }

    #[test]
    fn test_supply_edit_that_overflows_total_is_rejected() {
        let mut store = ScenarioStore::default();
        assert!(matches!(
            store.set_supply(0, u64::MAX),
            Err(SolverError::ValidationError { .. })
        ));
        assert!(store.set_demand(1, u64::MAX).is_err());
        assert_eq!(store.totals().unwrap(), (370, 370));
        assert!(store.scenario().validate().is_ok());
    }

    #[test]
    fn test_setters_reject_bad_values() {
        let mut store = ScenarioStore::default();
        assert!(store.set_assignment_cost(0, 0, f64::NAN).is_err());
        assert!(store.set_processing_rate(0, 1.2).is_err());
        assert!(store.set_zone_volume(0, -5.0).is_err());
        store.set_transportation_cost(2, 0, 7.5).unwrap();
        assert_eq!(store.scenario().transportation_costs[2][0], 7.5);
    }
}
