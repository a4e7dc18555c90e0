pub mod estimator;
pub mod normalizer;
pub mod recommender;

pub use estimator::estimate;
pub use normalizer::normalize;
pub use recommender::{largest_category, rank_categories, recommend};

use crate::schemas::{CategoryEmissions, LifestyleInput, NormalizedInput, Recommendation};

/// Deterministic part of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub normalized: NormalizedInput,
    pub emissions: CategoryEmissions,
    pub recommendations: Vec<Recommendation>,
}

/// Normalize, estimate and recommend in one pass. Pure and infallible.
pub fn assess(input: &LifestyleInput) -> Assessment {
    let normalized = normalize(input);
    let emissions = estimate(&normalized);
    let recommendations = recommend(&normalized, &emissions);
    Assessment {
        normalized,
        emissions,
        recommendations,
    }
}
