//! Linear cost model for the collection → transport → processing → disposal chain.
//!
//! Volumes and processing rates come from the scenario when it has any; the
//! manual inputs are the fallback. Recovered material is credited against the
//! total to give the net cost.

use crate::domain::model::{CostBreakdown, Scenario};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_negative, validate_range, Validate};
use serde::{Deserialize, Serialize};

/// Per-unit prices, in rupees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRates {
    pub collection_per_unit: f64,
    pub transport_per_unit_km: f64,
    pub processing_per_unit: f64,
    pub disposal_per_unit: f64,
    pub recovery_value_per_unit: f64,
    /// Share of processed volume that is recovered as sellable material.
    pub recovery_fraction: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            collection_per_unit: 415.0,
            transport_per_unit_km: 8.3,
            processing_per_unit: 830.0,
            disposal_per_unit: 1245.0,
            recovery_value_per_unit: 1660.0,
            recovery_fraction: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSource {
    /// Use `CostInputs::transportation_distance` as given.
    #[default]
    Manual,
    /// Volume-weighted mean of each zone's distance to its nearest processing center.
    NearestCenter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostInputs {
    pub collection_volume: f64,
    pub transportation_distance: f64,
    pub processing_rate: f64,
    pub disposal_volume: f64,
    pub distance_source: DistanceSource,
    pub rates: CostRates,
}

impl Default for CostInputs {
    fn default() -> Self {
        Self {
            collection_volume: 1000.0,
            transportation_distance: 50.0,
            processing_rate: 0.8,
            disposal_volume: 200.0,
            distance_source: DistanceSource::Manual,
            rates: CostRates::default(),
        }
    }
}

impl CostInputs {
    pub fn validate(&self) -> Result<()> {
        validate_non_negative("cost_model.collection_volume", self.collection_volume)?;
        validate_non_negative(
            "cost_model.transportation_distance",
            self.transportation_distance,
        )?;
        validate_range("cost_model.processing_rate", self.processing_rate, 0.0, 1.0)?;
        validate_non_negative("cost_model.disposal_volume", self.disposal_volume)?;

        let rates = &self.rates;
        validate_non_negative("cost_model.rates.collection_per_unit", rates.collection_per_unit)?;
        validate_non_negative(
            "cost_model.rates.transport_per_unit_km",
            rates.transport_per_unit_km,
        )?;
        validate_non_negative("cost_model.rates.processing_per_unit", rates.processing_per_unit)?;
        validate_non_negative("cost_model.rates.disposal_per_unit", rates.disposal_per_unit)?;
        validate_non_negative(
            "cost_model.rates.recovery_value_per_unit",
            rates.recovery_value_per_unit,
        )?;
        validate_range(
            "cost_model.rates.recovery_fraction",
            rates.recovery_fraction,
            0.0,
            1.0,
        )?;
        Ok(())
    }
}

/// Volume-weighted nearest-center distance, or `None` when no volume or no centers exist.
pub fn nearest_center_distance(scenario: &Scenario) -> Option<f64> {
    let total_volume = scenario.total_zone_volume();
    if total_volume <= 0.0 {
        return None;
    }

    let mut weighted = 0.0;
    for (row, volume) in scenario.transport_distances.iter().zip(&scenario.zone_volumes) {
        let nearest = row.iter().copied().fold(f64::INFINITY, f64::min);
        if !nearest.is_finite() {
            return None;
        }
        weighted += nearest * volume;
    }
    Some(weighted / total_volume)
}

pub fn evaluate(scenario: &Scenario, inputs: &CostInputs) -> Result<CostBreakdown> {
    scenario.validate()?;
    inputs.validate()?;

    let zone_volume = scenario.total_zone_volume();
    let collection_volume = if zone_volume > 0.0 {
        zone_volume
    } else {
        inputs.collection_volume
    };

    let processing_rate = match scenario.average_processing_rate() {
        Some(rate) if rate > 0.0 => rate,
        _ => inputs.processing_rate,
    };

    let transportation_distance = match inputs.distance_source {
        DistanceSource::Manual => inputs.transportation_distance,
        DistanceSource::NearestCenter => nearest_center_distance(scenario).unwrap_or_else(|| {
            tracing::warn!("No zone volume to weight distances, using the manual distance");
            inputs.transportation_distance
        }),
    };

    let rates = &inputs.rates;
    let processed = collection_volume * processing_rate;

    let collection_cost = collection_volume * rates.collection_per_unit;
    let transportation_cost = transportation_distance * collection_volume * rates.transport_per_unit_km;
    let processing_cost = processed * rates.processing_per_unit;
    let disposal_cost = inputs.disposal_volume * rates.disposal_per_unit;
    let recovery_value = processed * rates.recovery_fraction * rates.recovery_value_per_unit;

    let total_cost = collection_cost + transportation_cost + processing_cost + disposal_cost;
    let net_cost = total_cost - recovery_value;

    tracing::debug!(
        "Cost model: volume={} rate={:.3} distance={:.2} net={:.2}",
        collection_volume,
        processing_rate,
        transportation_distance,
        net_cost
    );

    Ok(CostBreakdown {
        collection_volume,
        processing_rate,
        transportation_distance,
        collection_cost,
        transportation_cost,
        processing_cost,
        disposal_cost,
        total_cost,
        recovery_value,
        net_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_default_scenario_breakdown() {
        let breakdown = evaluate(&Scenario::default(), &CostInputs::default()).unwrap();

        assert_close(breakdown.collection_volume, 1050.0);
        assert_close(breakdown.processing_rate, 0.8);
        assert_close(breakdown.collection_cost, 435_750.0);
        assert_close(breakdown.transportation_cost, 435_750.0);
        assert_close(breakdown.processing_cost, 697_200.0);
        assert_close(breakdown.disposal_cost, 249_000.0);
        assert_close(breakdown.recovery_value, 836_640.0);
        assert_close(breakdown.total_cost, 1_817_700.0);
        assert_close(breakdown.net_cost, 981_060.0);
    }

    #[test]
    fn test_falls_back_to_manual_inputs_without_volume() {
        let mut scenario = Scenario::default();
        scenario.zone_volumes = vec![0.0; 4];
        scenario.processing_rates = vec![0.0; 3];

        let breakdown = evaluate(&scenario, &CostInputs::default()).unwrap();
        assert_close(breakdown.collection_volume, 1000.0);
        assert_close(breakdown.processing_rate, 0.8);
        assert_close(breakdown.collection_cost, 415_000.0);
    }

    #[test]
    fn test_nearest_center_distance_is_volume_weighted() {
        // nearest per zone: 50, 45, 40, 55
        let expected = (50.0 * 250.0 + 45.0 * 300.0 + 40.0 * 275.0 + 55.0 * 225.0) / 1050.0;
        let distance = nearest_center_distance(&Scenario::default()).unwrap();
        assert_close(distance, expected);

        let inputs = CostInputs {
            distance_source: DistanceSource::NearestCenter,
            ..CostInputs::default()
        };
        let breakdown = evaluate(&Scenario::default(), &inputs).unwrap();
        assert_close(breakdown.transportation_distance, expected);
        assert_close(breakdown.transportation_cost, expected * 1050.0 * 8.3);
    }

    #[test]
    fn test_rejects_negative_disposal_volume() {
        let inputs = CostInputs {
            disposal_volume: -10.0,
            ..CostInputs::default()
        };
        assert!(evaluate(&Scenario::default(), &inputs).is_err());
    }

    #[test]
    fn test_rejects_scenario_with_nan_volume() {
        let mut scenario = Scenario::default();
        scenario.zone_volumes[2] = f64::NAN;
        assert!(matches!(
            evaluate(&scenario, &CostInputs::default()),
            Err(crate::utils::error::SolverError::ValidationError { .. })
        ));
    }
}
