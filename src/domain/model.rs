use crate::utils::error::{Result, SolverError};
use crate::utils::validation::{validate_length, validate_matrix, Validate};
use serde::{Deserialize, Serialize};

fn default_scenario_name() -> String {
    "E-waste network".to_string()
}

/// The shared data every model reads from.
///
/// Rows of `assignment_costs` are vehicles and columns are zones; rows of
/// `transportation_costs` are collection points and columns are processing
/// centers; rows of `transport_distances` are zones and columns are
/// processing centers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_scenario_name")]
    pub name: String,
    pub zones: Vec<String>,
    pub vehicles: Vec<String>,
    pub collection_points: Vec<String>,
    pub processing_centers: Vec<String>,
    pub assignment_costs: Vec<Vec<f64>>,
    pub transportation_costs: Vec<Vec<f64>>,
    pub supply: Vec<u64>,
    pub demand: Vec<u64>,
    pub zone_volumes: Vec<f64>,
    pub processing_rates: Vec<f64>,
    pub transport_distances: Vec<Vec<f64>>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: default_scenario_name(),
            zones: vec![
                "Zone A".to_string(),
                "Zone B".to_string(),
                "Zone C".to_string(),
                "Zone D".to_string(),
            ],
            vehicles: (1..=4).map(|i| format!("Vehicle {}", i)).collect(),
            collection_points: (1..=3).map(|i| format!("Collection Point {}", i)).collect(),
            processing_centers: (1..=3).map(|i| format!("Processing Center {}", i)).collect(),
            assignment_costs: vec![
                vec![45.0, 60.0, 50.0, 55.0],
                vec![50.0, 40.0, 55.0, 45.0],
                vec![55.0, 45.0, 40.0, 50.0],
                vec![50.0, 55.0, 45.0, 40.0],
            ],
            transportation_costs: vec![
                vec![10.0, 15.0, 20.0],
                vec![12.0, 10.0, 18.0],
                vec![15.0, 12.0, 10.0],
            ],
            supply: vec![100, 150, 120],
            demand: vec![80, 120, 170],
            zone_volumes: vec![250.0, 300.0, 275.0, 225.0],
            processing_rates: vec![0.8, 0.85, 0.75],
            transport_distances: vec![
                vec![50.0, 70.0, 90.0],
                vec![60.0, 45.0, 85.0],
                vec![75.0, 65.0, 40.0],
                vec![55.0, 80.0, 60.0],
            ],
        }
    }
}

/// Sum of `values`, or a `ValidationError` when it does not fit in a `u64`.
pub fn checked_total(what: &str, values: &[u64]) -> Result<u64> {
    values
        .iter()
        .try_fold(0u64, |acc, &value| acc.checked_add(value))
        .ok_or_else(|| SolverError::ValidationError {
            message: format!("total {} exceeds {}", what, u64::MAX),
        })
}

impl Scenario {
    pub fn total_supply(&self) -> Result<u64> {
        checked_total("supply", &self.supply)
    }

    pub fn total_demand(&self) -> Result<u64> {
        checked_total("demand", &self.demand)
    }

    pub fn total_zone_volume(&self) -> f64 {
        self.zone_volumes.iter().sum()
    }

    /// Mean processing rate, or `None` when there are no processing centers.
    pub fn average_processing_rate(&self) -> Option<f64> {
        if self.processing_rates.is_empty() {
            return None;
        }
        Some(self.processing_rates.iter().sum::<f64>() / self.processing_rates.len() as f64)
    }
}

impl Validate for Scenario {
    fn validate(&self) -> Result<()> {
        let (v, z) = (self.vehicles.len(), self.zones.len());
        let (s, d) = (self.collection_points.len(), self.processing_centers.len());

        validate_matrix("assignment_costs", &self.assignment_costs, v, z)?;
        validate_matrix("transportation_costs", &self.transportation_costs, s, d)?;
        validate_matrix("transport_distances", &self.transport_distances, z, d)?;
        validate_length("supply", s, self.supply.len())?;
        validate_length("demand", d, self.demand.len())?;
        validate_length("zone_volumes", z, self.zone_volumes.len())?;
        validate_length("processing_rates", d, self.processing_rates.len())?;

        for (i, volume) in self.zone_volumes.iter().enumerate() {
            if !volume.is_finite() || *volume < 0.0 {
                return Err(SolverError::ValidationError {
                    message: format!("zone_volumes[{}] must be non-negative, got {}", i, volume),
                });
            }
        }
        for (i, rate) in self.processing_rates.iter().enumerate() {
            if !(0.0..=1.0).contains(rate) {
                return Err(SolverError::ValidationError {
                    message: format!("processing_rates[{}] must be within 0-1, got {}", i, rate),
                });
            }
        }

        self.total_supply()?;
        self.total_demand()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub vehicle: String,
    pub zone: String,
    pub vehicle_index: usize,
    pub zone_index: usize,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentPlan {
    pub assignments: Vec<Assignment>,
    pub unassigned_vehicles: Vec<String>,
    pub unassigned_zones: Vec<String>,
    pub total_cost: f64,
    /// Cost of the per-row minimum heuristic, which ignores the one-to-one rule.
    pub baseline_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub from: String,
    pub to: String,
    pub source_index: usize,
    pub destination_index: usize,
    pub quantity: u64,
    pub unit_cost: f64,
    pub cost: f64,
}

/// Dual values `u` (collection points) and `v` (processing centers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Potentials {
    pub u: Vec<f64>,
    pub v: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportationPlan {
    pub shipments: Vec<Shipment>,
    pub total_cost: f64,
    pub initial_cost: f64,
    pub initial_method: String,
    pub iterations: usize,
    pub potentials: Potentials,
    /// Per collection point, supply left over when demand falls short.
    pub unshipped_supply: Vec<u64>,
    /// Per processing center, demand left over when supply falls short.
    pub unmet_demand: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub collection_volume: f64,
    pub processing_rate: f64,
    pub transportation_distance: f64,
    pub collection_cost: f64,
    pub transportation_cost: f64,
    pub processing_cost: f64,
    pub disposal_cost: f64,
    pub total_cost: f64,
    pub recovery_value: f64,
    pub net_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    pub scenario_name: String,
    pub generated_at: String,
    pub cost: Option<CostBreakdown>,
    pub assignment: Option<AssignmentPlan>,
    pub transportation: Option<TransportationPlan>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_is_consistent() {
        let scenario = Scenario::default();
        assert!(scenario.validate().is_ok());
        assert_eq!(scenario.total_supply().unwrap(), 370);
        assert_eq!(scenario.total_demand().unwrap(), 370);
        assert_eq!(scenario.total_zone_volume(), 1050.0);
    }

    #[test]
    fn test_validate_catches_short_supply() {
        let mut scenario = Scenario::default();
        scenario.supply.pop();
        assert!(matches!(
            scenario.validate(),
            Err(SolverError::DimensionMismatch {
                expected: 3,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_rate_above_one() {
        let mut scenario = Scenario::default();
        scenario.processing_rates[1] = 1.5;
        assert!(matches!(
            scenario.validate(),
            Err(SolverError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_supply_total_overflow_is_rejected() {
        let mut scenario = Scenario::default();
        scenario.supply = vec![u64::MAX, 1, 0];
        assert!(matches!(
            scenario.total_supply(),
            Err(SolverError::ValidationError { .. })
        ));
        assert!(matches!(
            scenario.validate(),
            Err(SolverError::ValidationError { .. })
        ));
        assert_eq!(checked_total("demand", &[u64::MAX, 0]).unwrap(), u64::MAX);
    }

    #[test]
    fn test_scenario_name_defaults_when_missing() {
        let mut value = serde_json::to_value(Scenario::default()).unwrap();
        value.as_object_mut().unwrap().remove("name");
        let scenario: Scenario = serde_json::from_value(value).unwrap();
        assert_eq!(scenario.name, "E-waste network");
    }
}
