use std::cmp::Ordering;

use crate::schemas::{Category, CategoryEmissions, NormalizedInput, Recommendation};

pub const MAX_RECOMMENDATIONS: usize = 3;

/// Share of a category's emissions a single recommendation is credited with.
pub const SAVINGS_FRACTION: f64 = 0.15;

/// `(title, description)` templates, two per category, in emission order.
fn templates(category: Category) -> [(&'static str, &'static str); 2] {
    match category {
        Category::Transport => [
            ("Reduce car usage", "Use public transport, carpool, or walk when possible."),
            ("Limit flights", "Reduce air travel or choose lower-emission alternatives."),
        ],
        Category::Electricity => [
            (
                "Reduce electricity usage",
                "Turn off unused appliances and use energy-efficient devices.",
            ),
            ("Switch to renewable energy", "Consider solar or green electricity providers."),
        ],
        Category::Diet => [
            ("Reduce meat consumption", "Replace some meat meals with plant-based alternatives."),
            ("Choose local foods", "Eat locally sourced and seasonal foods to reduce emissions."),
        ],
    }
}

/// Categories sorted by descending emission.
///
/// The sort is stable, so exact ties keep the declaration order
/// transport, electricity, diet.
pub fn rank_categories(emissions: &CategoryEmissions) -> [(Category, f64); 3] {
    let mut ranked = emissions.by_category();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked
}

pub fn largest_category(emissions: &CategoryEmissions) -> (Category, f64) {
    rank_categories(emissions)[0]
}

/// Builds the top recommendations: both templates of the biggest category,
/// then the first template of the runner-up.
///
/// The normalized input is currently unused.
pub fn recommend(_input: &NormalizedInput, emissions: &CategoryEmissions) -> Vec<Recommendation> {
    rank_categories(emissions)
        .into_iter()
        .flat_map(|(category, value)| {
            let potential_savings = round_to_cents(value * SAVINGS_FRACTION);
            templates(category)
                .into_iter()
                .map(move |(title, description)| Recommendation {
                    title: title.to_string(),
                    description: description.to_string(),
                    potential_savings,
                    category,
                })
        })
        .take(MAX_RECOMMENDATIONS)
        .collect()
}

/// Rounds to two decimals from the exact binary value, so 80.144999.. stays 80.14.
fn round_to_cents(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::normalizer::normalize;
    use crate::schemas::LifestyleInput;

    fn emissions(transport: f64, electricity: f64, diet: f64) -> CategoryEmissions {
        CategoryEmissions {
            transport,
            electricity,
            diet,
        }
    }

    fn any_input() -> NormalizedInput {
        normalize(&LifestyleInput::default())
    }

    #[test]
    fn test_ranking_is_descending() {
        let ranked = rank_categories(&emissions(10.0, 30.0, 20.0));
        let order: Vec<Category> = ranked.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, vec![Category::Electricity, Category::Diet, Category::Transport]);
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let ranked = rank_categories(&emissions(0.0, 0.0, 0.0));
        let order: Vec<Category> = ranked.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, Category::ALL.to_vec());

        let ranked = rank_categories(&emissions(5.0, 9.0, 9.0));
        assert_eq!(ranked[0].0, Category::Electricity);
        assert_eq!(ranked[1].0, Category::Diet);
        assert_eq!(ranked[2].0, Category::Transport);
    }

    #[test]
    fn test_ranking_is_reproducible() {
        let e = emissions(7.5, 7.5, 3.0);
        let first = rank_categories(&e);
        for _ in 0..10 {
            assert_eq!(rank_categories(&e), first);
        }
    }

    #[test]
    fn test_top_category_templates_then_runner_up() {
        let recs = recommend(&any_input(), &emissions(100.0, 50.0, 1000.0));
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].title, "Reduce meat consumption");
        assert_eq!(recs[0].category, Category::Diet);
        assert_eq!(recs[1].title, "Choose local foods");
        assert_eq!(recs[1].category, Category::Diet);
        assert_eq!(recs[2].title, "Reduce car usage");
        assert_eq!(recs[2].category, Category::Transport);
    }

    #[test]
    fn test_savings_are_fifteen_percent_rounded() {
        let recs = recommend(&any_input(), &emissions(2137.2, 0.0, 2911.818));
        // 2911.818 * 0.15 = 436.7727
        assert_eq!(recs[0].potential_savings, 436.77);
        assert_eq!(recs[1].potential_savings, 436.77);
        // 2137.2 * 0.15 = 320.58
        assert_eq!(recs[2].potential_savings, 320.58);
    }

    #[test]
    fn test_savings_round_just_below_half_cent_down() {
        // 534.3 * 0.15 = 80.14499999999999.. in binary
        let recs = recommend(&any_input(), &emissions(534.3, 0.0, 0.0));
        assert_eq!(recs[0].potential_savings, 80.14);
        // 2671.5 * 0.15 = 400.72499999999997..
        let recs = recommend(&any_input(), &emissions(2671.5, 0.0, 0.0));
        assert_eq!(recs[0].potential_savings, 400.72);
    }

    #[test]
    fn test_savings_for_short_car_commute() {
        let input = LifestyleInput {
            transport: crate::schemas::TransportData {
                car_miles_per_week: Some(25.0),
                ..Default::default()
            },
            diet: crate::schemas::DietHabits {
                meals_per_week: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        let normalized = normalize(&input);
        let recs = recommend(&normalized, &crate::footprint::estimate(&normalized));
        assert_eq!(recs[0].category, Category::Transport);
        assert_eq!(recs[0].potential_savings, 80.14);
    }

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(436.7727), 436.77);
        assert_eq!(round_to_cents(80.146), 80.15);
        assert_eq!(round_to_cents(0.0), 0.0);
    }

    #[test]
    fn test_always_three_recommendations() {
        for e in [
            emissions(0.0, 0.0, 0.0),
            emissions(1.0, 0.0, 0.0),
            emissions(0.0, 0.0, 1.0),
            emissions(3.0, 2.0, 1.0),
        ] {
            assert_eq!(recommend(&any_input(), &e).len(), MAX_RECOMMENDATIONS);
        }
    }

    #[test]
    fn test_all_zero_emissions_recommend_transport_first() {
        let recs = recommend(&any_input(), &emissions(0.0, 0.0, 0.0));
        assert_eq!(recs[0].category, Category::Transport);
        assert_eq!(recs[1].category, Category::Transport);
        assert_eq!(recs[2].category, Category::Electricity);
        assert!(recs.iter().all(|r| r.potential_savings == 0.0));
    }

    #[test]
    fn test_largest_category() {
        assert_eq!(largest_category(&emissions(0.0, 0.0, 5460.0)), (Category::Diet, 5460.0));
    }
}
