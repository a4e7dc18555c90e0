use crate::schemas::{
    CategoryEmissions, NormalizedDiet, NormalizedElectricity, NormalizedInput, NormalizedTransport,
};

// Emission factors, kg CO2 per unit of activity.
pub const CAR_EMISSION_FACTOR: f64 = 0.411; // per mile
pub const PUBLIC_TRANSIT_FACTOR: f64 = 0.05; // per trip
pub const FLIGHT_FACTOR: f64 = 250.0; // per short-haul flight

pub const GRID_ELECTRICITY_FACTOR: f64 = 0.5; // per kWh
pub const SOLAR_FACTOR: f64 = 0.05;
pub const WIND_FACTOR: f64 = 0.02;

pub const MEAT_MEAL_FACTOR: f64 = 5.0; // per meal
pub const VEGETARIAN_MEAL_FACTOR: f64 = 2.0;
pub const VEGAN_MEAL_FACTOR: f64 = 1.0;

const WEEKS_PER_YEAR: f64 = 52.0;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Computes annual emissions per category from normalized input.
///
/// Inputs are assumed already sanitized by [`super::normalizer::normalize`];
/// nothing is re-validated here.
pub fn estimate(input: &NormalizedInput) -> CategoryEmissions {
    CategoryEmissions {
        transport: transport_emissions(&input.transport),
        electricity: electricity_emissions(&input.electricity),
        diet: diet_emissions(&input.diet),
    }
}

/// Factor for an energy source; anything other than solar or wind is billed as grid.
pub fn electricity_factor(energy_source: &str) -> f64 {
    if energy_source.eq_ignore_ascii_case("solar") {
        SOLAR_FACTOR
    } else if energy_source.eq_ignore_ascii_case("wind") {
        WIND_FACTOR
    } else {
        GRID_ELECTRICITY_FACTOR
    }
}

fn transport_emissions(transport: &NormalizedTransport) -> f64 {
    let car = transport.car_miles_per_week * WEEKS_PER_YEAR * CAR_EMISSION_FACTOR;
    let transit =
        transport.public_transit_trips_per_week as f64 * WEEKS_PER_YEAR * PUBLIC_TRANSIT_FACTOR;
    let flights = transport.flights_per_year as f64 * FLIGHT_FACTOR;
    car + transit + flights
}

fn electricity_emissions(electricity: &NormalizedElectricity) -> f64 {
    electricity.monthly_kwh * MONTHS_PER_YEAR * electricity_factor(&electricity.energy_source)
}

fn diet_emissions(diet: &NormalizedDiet) -> f64 {
    let meals = diet.meals_per_week as f64;
    let meat_meals = meals * diet.meat_percentage / 100.0;
    let vegetarian_meals = meals * diet.vegetarian_percentage / 100.0;
    let vegan_meals = meals * diet.vegan_percentage / 100.0;

    let weekly = meat_meals * MEAT_MEAL_FACTOR
        + vegetarian_meals * VEGETARIAN_MEAL_FACTOR
        + vegan_meals * VEGAN_MEAL_FACTOR;
    weekly * WEEKS_PER_YEAR
}
