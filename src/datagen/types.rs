use serde::{Deserialize, Serialize};

/// Models the generation binary accepts.
pub const ALLOWED_MODELS: [&str; 3] = ["gpt-4o", "gpt-4o-mini", "gpt-3.5-turbo"];

/// One supervised example: the user's information and query, a news extract
/// as context, and the generated answer once it exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingExample {
    pub about_me: String,
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}
