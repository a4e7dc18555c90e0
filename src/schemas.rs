use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// --- Raw request ---

/// Transport-related lifestyle data. Every field may be absent or null.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TransportData {
    #[serde(default)]
    pub car_miles_per_week: Option<f64>,
    #[serde(default)]
    pub public_transit_trips_per_week: Option<i64>,
    #[serde(default)]
    pub flights_per_year: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ElectricityUsage {
    #[serde(default)]
    pub monthly_kwh: Option<f64>,
    /// Free-form source name: "grid", "solar", "wind", ...
    #[serde(default)]
    pub energy_source: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DietHabits {
    #[serde(default)]
    pub meals_per_week: Option<i64>,
    #[serde(default)]
    pub meat_percentage: Option<f64>,
    #[serde(default)]
    pub vegetarian_percentage: Option<f64>,
    #[serde(default)]
    pub vegan_percentage: Option<f64>,
}

/// Raw body of `/analyze` and `/calculate`.
///
/// The three groups are mandatory: a body that omits one of them is rejected
/// at deserialization time, while individual fields inside a group default.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct LifestyleInput {
    pub transport: TransportData,
    pub electricity: ElectricityUsage,
    pub diet: DietHabits,
}

// --- Normalized input ---

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NormalizedTransport {
    pub car_miles_per_week: f64,
    pub public_transit_trips_per_week: u64,
    pub flights_per_year: u64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NormalizedElectricity {
    pub monthly_kwh: f64,
    /// Lower-cased, but not checked against the known sources.
    pub energy_source: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NormalizedDiet {
    pub meals_per_week: u64,
    pub meat_percentage: f64,
    pub vegetarian_percentage: f64,
    pub vegan_percentage: f64,
}

impl NormalizedDiet {
    pub fn percentage_sum(&self) -> f64 {
        self.meat_percentage + self.vegetarian_percentage + self.vegan_percentage
    }
}

/// Output of the normalizer: every field present, non-negative, diet shares summing to 100.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NormalizedInput {
    pub transport: NormalizedTransport,
    pub electricity: NormalizedElectricity,
    pub diet: NormalizedDiet,
}

// --- Emissions ---

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Transport,
    Electricity,
    Diet,
}

impl Category {
    /// Declaration order; ranking ties resolve in this order.
    pub const ALL: [Category; 3] = [Category::Transport, Category::Electricity, Category::Diet];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Transport => "transport",
            Category::Electricity => "electricity",
            Category::Diet => "diet",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annual kg CO2 per category.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct CategoryEmissions {
    pub transport: f64,
    pub electricity: f64,
    pub diet: f64,
}

impl CategoryEmissions {
    pub fn total(&self) -> f64 {
        self.transport + self.electricity + self.diet
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Transport => self.transport,
            Category::Electricity => self.electricity,
            Category::Diet => self.diet,
        }
    }

    /// `(category, value)` pairs in declaration order.
    pub fn by_category(&self) -> [(Category, f64); 3] {
        Category::ALL.map(|category| (category, self.get(category)))
    }
}

// --- Output ---

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    /// kg CO2/year
    pub potential_savings: f64,
    pub category: Category,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisResult {
    pub total_carbon_footprint: f64,
    pub category_emissions: CategoryEmissions,
    pub top_recommendations: Vec<Recommendation>,
    pub explanation: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Row written to the history table by `/calculate`.
#[derive(Debug, Serialize, Clone)]
pub struct HistoryRecord<'a> {
    pub user_id: &'a str,
    pub input_data: &'a LifestyleInput,
    pub ai_output: &'a AnalysisResult,
}

/// Row returned by `/history`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub user_id: String,
    pub input_data: serde_json::Value,
    pub ai_output: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// PostgREST returns uuid keys as strings and serial keys as numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
