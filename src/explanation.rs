use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api_connection::connection::ApiConnectionError;
use crate::api_connection::endpoints::{
    ChatCompletionRequest, ChatMessage, Provider, DEFAULT_MODEL,
};
use crate::footprint::largest_category;
use crate::schemas::{Category, CategoryEmissions, Recommendation};

const SYSTEM_PROMPT: &str = "You are a clear, accurate climate sustainability assistant.";
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 200;

/// Everything a narrative needs, already computed by the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeContext<'a> {
    pub emissions: &'a CategoryEmissions,
    pub recommendations: &'a [Recommendation],
    pub previous_total: Option<f64>,
    pub largest: (Category, f64),
}

impl<'a> NarrativeContext<'a> {
    pub fn new(
        emissions: &'a CategoryEmissions,
        recommendations: &'a [Recommendation],
        previous_total: Option<f64>,
    ) -> Self {
        Self {
            emissions,
            recommendations,
            previous_total,
            largest: largest_category(emissions),
        }
    }
}

/// Free-form text generation for the explanation. Treated as untrusted: any
/// error or empty answer is replaced by [`fallback_explanation`].
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn narrate(&self, context: &NarrativeContext<'_>) -> Result<String, ApiConnectionError>;
}

/// Chat-completion backed narrator.
pub struct LlmNarrator {
    provider: Provider,
    model: String,
}

impl LlmNarrator {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn with_default_model(provider: Provider) -> Self {
        Self::new(provider, DEFAULT_MODEL)
    }
}

#[async_trait]
impl NarrativeGenerator for LlmNarrator {
    async fn narrate(&self, context: &NarrativeContext<'_>) -> Result<String, ApiConnectionError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(context)),
            ],
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
        };

        let response = self.provider.call_chat_completion(request).await?;
        match response.first_content() {
            Some(content) if !content.is_empty() => {
                debug!(chars = content.len(), "narrative received");
                Ok(content.to_string())
            }
            _ => Err(ApiConnectionError::EmptyResponse),
        }
    }
}

/// Asks the generator once and falls back to the deterministic text on
/// error, timeout or blank output.
pub async fn explain(
    generator: Option<&dyn NarrativeGenerator>,
    context: &NarrativeContext<'_>,
    limit: Duration,
) -> String {
    if let Some(generator) = generator {
        match tokio::time::timeout(limit, generator.narrate(context)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => return text.trim().to_string(),
            Ok(Ok(_)) => warn!("narrative generator returned empty text, using fallback"),
            Ok(Err(err)) => warn!(error = %err, "narrative generation failed, using fallback"),
            Err(_) => warn!(?limit, "narrative generation timed out, using fallback"),
        }
    }
    fallback_explanation(context.emissions, context.previous_total)
}

/// Template explanation used whenever no generated narrative is available.
pub fn fallback_explanation(emissions: &CategoryEmissions, previous_total: Option<f64>) -> String {
    let total = emissions.total();
    let (largest, _) = largest_category(emissions);

    let history_line = previous_total
        .map(|previous| {
            format!(
                " Compared to your previous footprint of {:.1} kg CO2, \
                 this shows a change of {:+.1} kg.",
                previous,
                total - previous
            )
        })
        .unwrap_or_default();

    format!(
        "Your total carbon footprint is {:.1} kg CO2 per year. \
         The largest contributor is {}.{} \
         Focusing on improvements in this area can significantly reduce your impact.",
        total, largest, history_line
    )
}

pub fn build_prompt(context: &NarrativeContext<'_>) -> String {
    let emissions = context.emissions;
    let (largest, largest_value) = context.largest;

    let rec_text = context
        .recommendations
        .iter()
        .map(|r| format!("- {}: {}", r.title, r.description))
        .collect::<Vec<_>>()
        .join("\n");

    let history_text = context
        .previous_total
        .map(|previous| {
            format!(
                "\nTheir previous footprint was {:.1} kg CO2 (change: {:+.1} kg).\n",
                previous,
                emissions.total() - previous
            )
        })
        .unwrap_or_default();

    format!(
        "A user has an annual carbon footprint of {total:.1} kg CO2.
{history_text}
Category breakdown (already calculated, do NOT reinterpret):
- Transport: {transport:.1} kg
- Electricity: {electricity:.1} kg
- Diet: {diet:.1} kg

The largest contributing category is:
- {largest_title} at {largest_value:.1} kg CO2

Top recommendations:
{rec_text}

Write using EXACTLY this structure:

Introduction:
- One short encouraging sentence mentioning the total footprint.

Emission Breakdown:
- One sentence stating that {largest} is the largest contributor.
- One sentence briefly explaining why this category is high.

Recommendations:
- Each recommendation must be a separate bullet starting with \"- \"
- One sentence per bullet.

Conclusion:
- One short motivational sentence.

STRICT RULES:
- NEVER invent categories
- NEVER mention \"total\" as a category
- Use ONLY: transport, electricity, diet
- Do NOT change the ranking
- Do NOT use percentages
",
        total = emissions.total(),
        transport = emissions.transport,
        electricity = emissions.electricity,
        diet = emissions.diet,
        largest_title = capitalize(largest.as_str()),
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
