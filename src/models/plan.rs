//! Plan generation request and result

use serde::{Deserialize, Serialize};

/// Text stored when the service answered but carried no message content
pub const NO_RESPONSE: &str = "No response.";

/// Text stored when the request failed in transport or decoding
pub const FALLBACK_RESPONSE: &str = "Something went wrong.";

/// Validated input to the plan generator.
///
/// Only the session store builds these, and only once a location, a
/// finalized date range and a purpose are all present.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub day_count: u32,
    pub purpose: String,
    pub destination_description: String,
    pub weather_description: String,
}

impl PlanRequest {
    /// Query string for the generation endpoint, every value URL-encoded
    #[must_use]
    pub fn query_string(&self) -> String {
        format!(
            "days={}&purpose={}&destination={}&weather={}",
            self.day_count,
            urlencoding::encode(&self.purpose),
            urlencoding::encode(&self.destination_description),
            urlencoding::encode(&self.weather_description)
        )
    }
}

/// The single active plan of a session
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "outcome", content = "text", rename_all = "camelCase")]
pub enum PlanResult {
    /// Text returned by the generation service
    Generated(String),
    /// Fixed fallback text after a failed request
    Fallback(String),
}

impl PlanResult {
    /// Fallback result with the standard text
    #[must_use]
    pub fn fallback() -> Self {
        PlanResult::Fallback(FALLBACK_RESPONSE.to_string())
    }

    /// Raw plan text, regardless of outcome
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            PlanResult::Generated(text) | PlanResult::Fallback(text) => text,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, PlanResult::Fallback(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_encodes_values() {
        let request = PlanRequest {
            day_count: 5,
            purpose: "beach trip".to_string(),
            destination_description: "the Tokyo Tower located at Minato, Tokyo, Japan".to_string(),
            weather_description: "Sunny & warm".to_string(),
        };
        assert_eq!(
            request.query_string(),
            "days=5&purpose=beach%20trip&destination=the%20Tokyo%20Tower%20located%20at%20Minato%2C%20Tokyo%2C%20Japan&weather=Sunny%20%26%20warm"
        );
    }

    #[test]
    fn test_plan_result_text() {
        let generated = PlanResult::Generated("* socks".to_string());
        assert_eq!(generated.text(), "* socks");
        assert!(!generated.is_fallback());

        let fallback = PlanResult::fallback();
        assert_eq!(fallback.text(), FALLBACK_RESPONSE);
        assert!(fallback.is_fallback());
    }
}
