use crate::schemas::{
    LifestyleInput, NormalizedDiet, NormalizedElectricity, NormalizedInput, NormalizedTransport,
};

pub const DEFAULT_MEALS_PER_WEEK: u64 = 21;
pub const DEFAULT_ENERGY_SOURCE: &str = "grid";

/// Meat / vegetarian / vegan shares used when no diet percentages are given.
/// Sums to 100.00 only after rounding; kept literal so fallback output stays stable.
pub const BALANCED_DIET_SPLIT: [f64; 3] = [33.33, 33.33, 33.34];

/// Turns raw lifestyle data into a fully populated, bounded record.
///
/// Never fails: absent, negative or out-of-range values are coerced rather
/// than rejected.
/// * Absent numerics become 0, except meals/week which defaults to 21.
/// * Transport and electricity values are floored at 0 with no upper bound.
/// * The energy source is lower-cased and otherwise left as given.
/// * Diet percentages are clamped to [0, 100] and rescaled to sum to 100.
pub fn normalize(input: &LifestyleInput) -> NormalizedInput {
    let transport = NormalizedTransport {
        car_miles_per_week: non_negative(input.transport.car_miles_per_week),
        public_transit_trips_per_week: non_negative_count(
            input.transport.public_transit_trips_per_week,
        ),
        flights_per_year: non_negative_count(input.transport.flights_per_year),
    };

    let electricity = NormalizedElectricity {
        monthly_kwh: non_negative(input.electricity.monthly_kwh),
        energy_source: input
            .electricity
            .energy_source
            .as_deref()
            .map(str::trim)
            .filter(|source| !source.is_empty())
            .unwrap_or(DEFAULT_ENERGY_SOURCE)
            .to_lowercase(),
    };

    let meals_per_week = input
        .diet
        .meals_per_week
        .map_or(DEFAULT_MEALS_PER_WEEK, |meals| meals.max(0) as u64);

    let [meat_percentage, vegetarian_percentage, vegan_percentage] = normalize_shares([
        clamp_percentage(input.diet.meat_percentage),
        clamp_percentage(input.diet.vegetarian_percentage),
        clamp_percentage(input.diet.vegan_percentage),
    ]);

    NormalizedInput {
        transport,
        electricity,
        diet: NormalizedDiet {
            meals_per_week,
            meat_percentage,
            vegetarian_percentage,
            vegan_percentage,
        },
    }
}

fn non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

fn non_negative_count(value: Option<i64>) -> u64 {
    value.map_or(0, |v| v.max(0) as u64)
}

fn clamp_percentage(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0),
        _ => 0.0,
    }
}

fn normalize_shares(shares: [f64; 3]) -> [f64; 3] {
    let sum: f64 = shares.iter().sum();
    if sum > 0.0 {
        let scale = 100.0 / sum;
        shares.map(|share| share * scale)
    } else {
        BALANCED_DIET_SPLIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{DietHabits, ElectricityUsage, TransportData};

    fn diet_input(
        meat: Option<f64>,
        vegetarian: Option<f64>,
        vegan: Option<f64>,
    ) -> LifestyleInput {
        LifestyleInput {
            diet: DietHabits {
                meals_per_week: None,
                meat_percentage: meat,
                vegetarian_percentage: vegetarian,
                vegan_percentage: vegan,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_gets_defaults() {
        let normalized = normalize(&LifestyleInput::default());
        assert_eq!(normalized.transport.car_miles_per_week, 0.0);
        assert_eq!(normalized.transport.public_transit_trips_per_week, 0);
        assert_eq!(normalized.transport.flights_per_year, 0);
        assert_eq!(normalized.electricity.monthly_kwh, 0.0);
        assert_eq!(normalized.electricity.energy_source, "grid");
        assert_eq!(normalized.diet.meals_per_week, 21);
        assert_eq!(normalized.diet.meat_percentage, 33.33);
        assert_eq!(normalized.diet.vegetarian_percentage, 33.33);
        assert_eq!(normalized.diet.vegan_percentage, 33.34);
    }

    #[test]
    fn test_negative_values_are_floored() {
        let input = LifestyleInput {
            transport: TransportData {
                car_miles_per_week: Some(-50.0),
                public_transit_trips_per_week: Some(-3),
                flights_per_year: Some(-1),
            },
            electricity: ElectricityUsage {
                monthly_kwh: Some(-200.0),
                energy_source: None,
            },
            diet: DietHabits {
                meals_per_week: Some(-7),
                ..Default::default()
            },
        };
        let normalized = normalize(&input);
        assert_eq!(normalized.transport.car_miles_per_week, 0.0);
        assert_eq!(normalized.transport.public_transit_trips_per_week, 0);
        assert_eq!(normalized.transport.flights_per_year, 0);
        assert_eq!(normalized.electricity.monthly_kwh, 0.0);
        assert_eq!(normalized.diet.meals_per_week, 0);
    }

    #[test]
    fn test_large_values_are_not_capped() {
        let input = LifestyleInput {
            transport: TransportData {
                car_miles_per_week: Some(1.0e6),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(normalize(&input).transport.car_miles_per_week, 1.0e6);
    }

    #[test]
    fn test_explicit_zero_meals_is_kept() {
        let input = LifestyleInput {
            diet: DietHabits {
                meals_per_week: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(normalize(&input).diet.meals_per_week, 0);
    }

    #[test]
    fn test_energy_source_is_only_lowercased() {
        let input = LifestyleInput {
            electricity: ElectricityUsage {
                monthly_kwh: Some(10.0),
                energy_source: Some("Unknown-Source".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(normalize(&input).electricity.energy_source, "unknown-source");
    }

    #[test]
    fn test_blank_energy_source_defaults_to_grid() {
        let input = LifestyleInput {
            electricity: ElectricityUsage {
                monthly_kwh: None,
                energy_source: Some("  ".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(normalize(&input).electricity.energy_source, "grid");
    }

    #[test]
    fn test_percentages_rescale_to_hundred() {
        let normalized = normalize(&diet_input(Some(50.0), Some(30.0), Some(20.0)));
        assert_eq!(normalized.diet.meat_percentage, 50.0);
        assert_eq!(normalized.diet.vegetarian_percentage, 30.0);
        assert_eq!(normalized.diet.vegan_percentage, 20.0);

        let normalized = normalize(&diet_input(Some(10.0), Some(10.0), None));
        assert!((normalized.diet.meat_percentage - 50.0).abs() < 1e-9);
        assert!((normalized.diet.vegetarian_percentage - 50.0).abs() < 1e-9);
        assert_eq!(normalized.diet.vegan_percentage, 0.0);
    }

    #[test]
    fn test_percentages_are_clamped_before_rescaling() {
        // 150 -> 100, -20 -> 0, 100 stays: shares 100/0/100 -> 50/0/50
        let normalized = normalize(&diet_input(Some(150.0), Some(-20.0), Some(100.0)));
        assert!((normalized.diet.meat_percentage - 50.0).abs() < 1e-9);
        assert_eq!(normalized.diet.vegetarian_percentage, 0.0);
        assert!((normalized.diet.vegan_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentage_closure_for_awkward_shares() {
        let normalized = normalize(&diet_input(Some(1.0), Some(1.0), Some(1.0)));
        assert!((normalized.diet.percentage_sum() - 100.0).abs() < 1e-9);

        let normalized = normalize(&diet_input(Some(0.1), Some(99.7), Some(3.3)));
        assert!((normalized.diet.percentage_sum() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_negative_percentages_fall_back_to_balanced_split() {
        let normalized = normalize(&diet_input(Some(-5.0), Some(-5.0), Some(-5.0)));
        assert_eq!(
            [
                normalized.diet.meat_percentage,
                normalized.diet.vegetarian_percentage,
                normalized.diet.vegan_percentage
            ],
            BALANCED_DIET_SPLIT
        );
    }

    #[test]
    fn test_non_finite_values_are_treated_as_absent() {
        let input = LifestyleInput {
            transport: TransportData {
                car_miles_per_week: Some(f64::NAN),
                ..Default::default()
            },
            electricity: ElectricityUsage {
                monthly_kwh: Some(f64::INFINITY),
                energy_source: None,
            },
            diet: DietHabits {
                meat_percentage: Some(f64::NAN),
                ..Default::default()
            },
        };
        let normalized = normalize(&input);
        assert_eq!(normalized.transport.car_miles_per_week, 0.0);
        assert_eq!(normalized.electricity.monthly_kwh, 0.0);
        assert_eq!(normalized.diet.meat_percentage, 33.33);
    }
}
