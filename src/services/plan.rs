//! Packing plan generation via the planner backend

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::{PlanGenerator, get_json, normalize_base_url};
use crate::models::plan::NO_RESPONSE;
use crate::models::{PlanRequest, PlanResult};

/// Text of `choices[0].message.content` in a chat-completion style body.
///
/// Any other shape, or an empty string, yields `None`.
#[must_use]
pub fn completion_content(body: &Value) -> Option<&str> {
    body.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .filter(|content| !content.is_empty())
}

pub struct BackendPlanGenerator {
    client: Client,
    base_url: String,
}

impl BackendPlanGenerator {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    #[must_use]
    pub fn ask_url(&self, request: &PlanRequest) -> String {
        format!("{}/qna/ask?{}", self.base_url, request.query_string())
    }
}

#[async_trait]
impl PlanGenerator for BackendPlanGenerator {
    #[instrument(skip(self, request), fields(days = request.day_count, purpose = %request.purpose))]
    async fn generate(&self, request: &PlanRequest) -> PlanResult {
        match get_json::<Value>(&self.client, &self.ask_url(request), "Plan generation").await {
            Ok(body) => {
                let text = completion_content(&body).map_or_else(
                    || {
                        warn!("Plan response carried no message content");
                        NO_RESPONSE.to_string()
                    },
                    str::to_string,
                );
                info!("Plan generated ({} characters)", text.len());
                PlanResult::Generated(text)
            }
            Err(e) => {
                warn!("Plan generation failed: {}", e);
                PlanResult::fallback()
            }
        }
    }
}
