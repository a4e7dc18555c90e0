use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::api_connection::endpoints::{Provider, DEFAULT_REQUEST_TIMEOUT};
use crate::auth::Credentials;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::explanation::{explain, LlmNarrator, NarrativeContext, NarrativeGenerator};
use crate::footprint::assess;
use crate::history_store::{HistoryStore, SupabaseStore};
use crate::schemas::{AnalysisResult, HistoryItem, HistoryRecord, LifestyleInput};

/// Runs the analysis pipeline and talks to the optional collaborators.
///
/// Holds no mutable state, so one instance can serve concurrent requests.
pub struct Supervisor {
    narrator: Option<Arc<dyn NarrativeGenerator>>,
    store: Option<Arc<dyn HistoryStore>>,
    narrative_timeout: Duration,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    /// Supervisor with no collaborators: fallback explanations, no history.
    pub fn new() -> Self {
        Self {
            narrator: None,
            store: None,
            narrative_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_narrator(mut self, narrator: Arc<dyn NarrativeGenerator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_narrative_timeout(mut self, limit: Duration) -> Self {
        self.narrative_timeout = limit;
        self
    }

    /// Wires the Groq narrator and Supabase store described by `config`.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let mut supervisor = Self::new().with_narrative_timeout(config.llm.timeout);

        let provider = Provider::groq(config.llm.api_key.clone())
            .with_base_url(&config.llm.base_url)
            .with_timeout(config.llm.timeout);
        if provider.has_api_key() {
            if !provider.lists_model(&config.llm.model) {
                warn!(model = %config.llm.model, "GROQ_MODEL is not a known chat model");
            }
            supervisor =
                supervisor.with_narrator(Arc::new(LlmNarrator::new(provider, &config.llm.model)));
            info!(model = %config.llm.model, "narrative generation enabled");
        } else {
            warn!("GROQ_API_KEY not set, explanations will use the built-in template");
        }

        match &config.store {
            Some(store) => {
                let client = SupabaseStore::new(&store.url, &store.anon_key, store.timeout)?;
                supervisor = supervisor.with_store(Arc::new(client));
                info!(url = %store.url, "history store enabled");
            }
            None => warn!("Supabase settings missing, /calculate and /history are disabled"),
        }

        Ok(supervisor)
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Full analysis. With credentials, the user's previous total is looked up
    /// and the result is labelled with their id. Never fails.
    pub async fn analyze(
        &self,
        input: &LifestyleInput,
        credentials: Option<&Credentials>,
    ) -> AnalysisResult {
        let assessment = assess(input);
        let emissions = assessment.emissions;
        info!(
            transport = emissions.transport,
            electricity = emissions.electricity,
            diet = emissions.diet,
            total = emissions.total(),
            "emissions estimated"
        );

        let previous_total = match credentials {
            Some(credentials) => self.previous_total(credentials).await,
            None => None,
        };

        let context =
            NarrativeContext::new(&emissions, &assessment.recommendations, previous_total);
        let explanation = explain(self.narrator.as_deref(), &context, self.narrative_timeout).await;

        AnalysisResult {
            total_carbon_footprint: emissions.total(),
            category_emissions: emissions,
            top_recommendations: assessment.recommendations,
            explanation,
            user_id: credentials.map(|c| c.user_id.clone()),
        }
    }

    /// Analyze, then store the request and result under the caller's id.
    pub async fn analyze_and_persist(
        &self,
        input: &LifestyleInput,
        credentials: &Credentials,
    ) -> AppResult<AnalysisResult> {
        let store = self.store.as_ref().ok_or(AppError::StoreUnavailable)?;
        let result = self.analyze(input, Some(credentials)).await;

        let record = HistoryRecord {
            user_id: &credentials.user_id,
            input_data: input,
            ai_output: &result,
        };
        store.insert(&record, &credentials.access_token).await?;
        info!(user_id = %credentials.user_id, "analysis persisted");

        Ok(result)
    }

    pub async fn history(&self, access_token: &str) -> AppResult<Vec<HistoryItem>> {
        let store = self.store.as_ref().ok_or(AppError::StoreUnavailable)?;
        Ok(store.list(access_token).await?)
    }

    async fn previous_total(&self, credentials: &Credentials) -> Option<f64> {
        let store = self.store.as_ref()?;
        match store
            .latest_total(&credentials.user_id, &credentials.access_token)
            .await
        {
            Ok(total) => total,
            Err(err) => {
                warn!(error = %err, user_id = %credentials.user_id, "history fetch failed");
                None
            }
        }
    }
}
