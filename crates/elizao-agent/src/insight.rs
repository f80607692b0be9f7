//! Business-insight agent.
//!
//! Turns a batch of chat messages into a [`BusinessBrief`] with the help of
//! the language model, then stores it.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use elizao_models::{AgentRole, BusinessBrief};
use elizao_persistence::Persistence;

use crate::agent::{ActOutcome, Agent, Learning, ThinkContext};
use crate::error::{AgentError, Result};
use crate::model::{ChatMessage, LanguageModel};

/// Maximum number of messages sent to the model per task.
pub const MAX_MESSAGES: usize = 20;

/// Confidence above which a brief is marked high priority.
pub const HIGH_PRIORITY_CONFIDENCE: f64 = 0.7;

const ANALYSIS_TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str = "You are a senior business analyst providing strategic insights.";

const HIGH_PRIORITY_INDICATORS: [&str; 3] = ["urgent", "deadline", "opportunity"];
const CONVERSION_TRIGGERS: [&str; 3] = ["interested", "proposal", "meeting"];
const RISK_INDICATORS: [&str; 3] = ["concern", "issue", "problem"];

/// Keyword hits found in the analysed messages, grouped by category.
pub type Signals = BTreeMap<String, Vec<String>>;

/// Structured analysis of a message batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightThoughts {
    pub chat_title: String,
    pub chat_type: String,
    pub executive_summary: String,
    pub insights: Vec<String>,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
    pub recommendations: Vec<String>,
    pub priorities: Vec<String>,
    pub confidence: f64,
    pub message_count: usize,
    pub signals: Signals,
}

/// Result of storing a brief.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightOutcome {
    pub success: bool,
    pub brief: BusinessBrief,
    pub actions_taken: Vec<String>,
    pub signals: Signals,
}

impl ActOutcome for InsightOutcome {
    fn success(&self) -> bool {
        self.success
    }
}

/// Agent that writes business briefs.
pub struct InsightAgent {
    model: Arc<dyn LanguageModel>,
    store: Arc<dyn Persistence>,
}

impl InsightAgent {
    pub fn new(model: Arc<dyn LanguageModel>, store: Arc<dyn Persistence>) -> Self {
        Self { model, store }
    }

    fn analysis_prompt(messages: &[Value]) -> Result<String> {
        let rendered = serde_json::to_string_pretty(messages)?;
        Ok(format!(
            "As a senior business analyst, analyze these messages for business opportunities, \
             risks, and actionable insights.\n\n\
             Messages: {}\n\n\
             Provide:\n\
             1. Key business insights (3-5 points)\n\
             2. Risk assessment\n\
             3. Opportunity identification\n\
             4. Strategic recommendations\n\
             5. Priority actions\n\n\
             Format as JSON with keys: executive_summary, insights, risks, opportunities, \
             recommendations, priorities, confidence",
            rendered
        ))
    }
}

/// Extracts the outermost JSON object from model output that may be wrapped
/// in prose or a code fence.
pub(crate) fn extract_json_object(text: &str) -> Result<Value> {
    let start = text.find('{');
    let end = text.rfind('}');
    let slice = match (start, end) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            return Err(AgentError::ResponseParse(
                "no JSON object in model output".into(),
            ))
        }
    };
    let value: Value =
        serde_json::from_str(slice).map_err(|e| AgentError::ResponseParse(e.to_string()))?;
    if !value.is_object() {
        return Err(AgentError::ResponseParse("model output is not an object".into()));
    }
    Ok(value)
}

/// Reads a list of strings, accepting a bare string or non-string items.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn message_text(message: &Value) -> Option<&str> {
    match message {
        Value::String(s) => Some(s),
        Value::Object(map) => map
            .get("text")
            .or_else(|| map.get("content"))
            .and_then(Value::as_str),
        _ => None,
    }
}

fn keyword_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)\b(urgent|deadline|opportunity|interested|proposal|meeting|concern|issue|problem)\b",
        )
        .unwrap()
    })
}

/// Finds which indicator words occur in the messages.
pub(crate) fn detect_signals(messages: &[Value]) -> Signals {
    let categories = [
        ("high_priority", &HIGH_PRIORITY_INDICATORS),
        ("conversion", &CONVERSION_TRIGGERS),
        ("risk", &RISK_INDICATORS),
    ];
    let mut signals = Signals::new();
    for text in messages.iter().filter_map(message_text) {
        for found in keyword_pattern().find_iter(text) {
            let word = found.as_str().to_lowercase();
            for (category, words) in categories {
                if words.contains(&word.as_str()) {
                    let hits = signals.entry(category.to_string()).or_default();
                    if !hits.contains(&word) {
                        hits.push(word.clone());
                    }
                }
            }
        }
    }
    signals
}

fn payload_str(context: &ThinkContext, key: &str) -> String {
    context
        .task
        .payload_field(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

#[async_trait]
impl Agent for InsightAgent {
    type Thoughts = InsightThoughts;
    type Outcome = InsightOutcome;

    fn role(&self) -> AgentRole {
        AgentRole::Insight
    }

    async fn think(&self, context: &ThinkContext) -> Result<InsightThoughts> {
        let messages: Vec<Value> = match context.task.payload_field("messages") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().take(MAX_MESSAGES).cloned().collect(),
            Some(_) => {
                return Err(AgentError::InvalidInput(
                    "payload field 'messages' must be a list".into(),
                ))
            }
        };

        let mut thoughts = InsightThoughts {
            chat_title: payload_str(context, "chat_title"),
            chat_type: payload_str(context, "chat_type"),
            message_count: messages.len(),
            ..Default::default()
        };
        if messages.is_empty() {
            debug!("No messages to analyze");
            return Ok(thoughts);
        }

        let prompt = Self::analysis_prompt(&messages)?;
        let raw = self
            .model
            .generate(
                &[ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
                ANALYSIS_TEMPERATURE,
            )
            .await?;
        let analysis = extract_json_object(&raw)?;

        thoughts.executive_summary = analysis
            .get("executive_summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        thoughts.insights = string_list(analysis.get("insights"));
        thoughts.risks = string_list(analysis.get("risks"));
        thoughts.opportunities = string_list(analysis.get("opportunities"));
        thoughts.recommendations = string_list(analysis.get("recommendations"));
        thoughts.priorities = string_list(analysis.get("priorities"));
        thoughts.confidence = analysis
            .get("confidence")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        thoughts.signals = detect_signals(&messages);

        debug!(
            model = %self.model.model_name(),
            insights = thoughts.insights.len(),
            confidence = thoughts.confidence,
            "Analysis complete"
        );
        Ok(thoughts)
    }

    async fn act(&self, thoughts: &InsightThoughts) -> Result<InsightOutcome> {
        let priority = if thoughts.confidence > HIGH_PRIORITY_CONFIDENCE {
            "High"
        } else {
            "Medium"
        };
        let brief = BusinessBrief {
            chat_title: thoughts.chat_title.clone(),
            chat_type: thoughts.chat_type.clone(),
            date: Utc::now(),
            executive_brief: thoughts.executive_summary.clone(),
            key_insights: thoughts.insights.clone(),
            conversion_opportunities: thoughts.opportunities.clone(),
            actionable_recommendations: thoughts.recommendations.clone(),
            next_steps: thoughts.priorities.clone(),
            priority: priority.to_string(),
            status: "Active".to_string(),
        };

        self.store.append_brief(brief.clone()).await?;
        info!(chat_title = %brief.chat_title, priority, "Business brief stored");

        Ok(InsightOutcome {
            success: true,
            brief,
            actions_taken: vec![
                "business_brief_created".to_string(),
                "brief_stored".to_string(),
            ],
            signals: thoughts.signals.clone(),
        })
    }

    async fn observe(&self, outcome: &InsightOutcome) -> Result<Learning> {
        let created = if outcome.success { 1.0 } else { 0.0 };
        let mut learning = Learning::default()
            .with_metric("briefs_created", created)
            .with_metric("success_rate", created)
            .with_pattern("high_priority_indicators", HIGH_PRIORITY_INDICATORS.to_vec())
            .with_pattern("conversion_triggers", CONVERSION_TRIGGERS.to_vec())
            .with_pattern("risk_indicators", RISK_INDICATORS.to_vec())
            .with_pattern("last_brief_priority", outcome.brief.priority.clone());

        if !outcome.signals.is_empty() {
            learning = learning.with_pattern("observed_signals", serde_json::to_value(&outcome.signals)?);
        }

        Ok(learning.with_summary(if outcome.success {
            "Business analysis completed successfully"
        } else {
            "Analysis failed"
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use elizao_memory::AgentMemory;
    use elizao_models::Task;
    use elizao_persistence::InMemoryRecordStore;
    use serde_json::json;
    use std::sync::Mutex;

    struct CannedModel {
        reply: std::result::Result<String, String>,
        prompts: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl CannedModel {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err("connection refused".into()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for CannedModel {
        fn model_name(&self) -> &str {
            "canned"
        }

        async fn generate(
            &self,
            messages: &[ChatMessage],
            _temperature: f32,
        ) -> std::result::Result<String, ModelError> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            self.reply.clone().map_err(ModelError::Transport)
        }

        async fn check(&self) -> std::result::Result<(), ModelError> {
            Ok(())
        }
    }

    fn context(payload: Value) -> ThinkContext {
        let memory = AgentMemory::new();
        ThinkContext {
            task: Task::new("business_analysis", "analyze").with_payload(payload),
            memory: memory.snapshot(),
            recent_context: Vec::new(),
        }
    }

    const REPLY: &str = r#"Here is the analysis:
```json
{"executive_summary": "Client is ready to buy",
 "insights": ["Budget approved", {"note": "structured"}],
 "risks": "Timeline is tight",
 "opportunities": ["Upsell support"],
 "recommendations": ["Send proposal"],
 "priorities": ["Call Friday"],
 "confidence": 0.85}
```"#;

    #[test]
    fn test_extract_json_object() {
        let value = extract_json_object(REPLY).unwrap();
        assert_eq!(value["confidence"], json!(0.85));

        assert!(extract_json_object("no json here").is_err());
        assert!(extract_json_object("} backwards {").is_err());
    }

    #[test]
    fn test_detect_signals() {
        let signals = detect_signals(&[
            json!({"text": "This is URGENT, we need the proposal", "sender": "Client"}),
            json!("Another issue came up; urgent again"),
            json!(42),
        ]);
        assert_eq!(signals["high_priority"], vec!["urgent"]);
        assert_eq!(signals["conversion"], vec!["proposal"]);
        assert_eq!(signals["risk"], vec!["issue"]);
    }

    #[test]
    fn test_detect_signals_matches_whole_words() {
        let signals = detect_signals(&[json!("Reissued the deadlines")]);
        assert!(signals.is_empty());
    }

    #[tokio::test]
    async fn test_think_parses_analysis() {
        let model = CannedModel::replying(REPLY);
        let agent = InsightAgent::new(model.clone(), Arc::new(InMemoryRecordStore::new()));

        let thoughts = agent
            .think(&context(json!({
                "chat_title": "Acme deal",
                "chat_type": "group",
                "messages": [{"text": "We need to discuss the proposal", "sender": "Client"}]
            })))
            .await
            .unwrap();

        assert_eq!(thoughts.chat_title, "Acme deal");
        assert_eq!(thoughts.executive_summary, "Client is ready to buy");
        assert_eq!(thoughts.insights, vec!["Budget approved", r#"{"note":"structured"}"#]);
        assert_eq!(thoughts.risks, vec!["Timeline is tight"]);
        assert_eq!(thoughts.confidence, 0.85);
        assert_eq!(thoughts.message_count, 1);

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts[0][0].content, SYSTEM_PROMPT);
        assert!(prompts[0][1].content.contains("We need to discuss the proposal"));
    }

    #[tokio::test]
    async fn test_think_caps_message_batch() {
        let model = CannedModel::replying("{}");
        let agent = InsightAgent::new(model.clone(), Arc::new(InMemoryRecordStore::new()));
        let messages: Vec<Value> = (0..30).map(|n| json!({"text": format!("msg-{n}-end")})).collect();

        let thoughts = agent.think(&context(json!({ "messages": messages }))).await.unwrap();

        assert_eq!(thoughts.message_count, MAX_MESSAGES);
        let prompt = &model.prompts.lock().unwrap()[0][1].content;
        assert!(prompt.contains("msg-19-end"));
        assert!(!prompt.contains("msg-20-end"));
    }

    #[tokio::test]
    async fn test_think_without_messages_skips_model() {
        let model = CannedModel::failing();
        let agent = InsightAgent::new(model.clone(), Arc::new(InMemoryRecordStore::new()));

        let thoughts = agent.think(&context(json!({}))).await.unwrap();
        assert_eq!(thoughts.confidence, 0.0);
        assert_eq!(thoughts.chat_title, "Unknown");
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_think_model_failure() {
        let agent = InsightAgent::new(CannedModel::failing(), Arc::new(InMemoryRecordStore::new()));
        let err = agent
            .think(&context(json!({ "messages": ["hello"] })))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Model(ModelError::Transport(_))));
    }

    #[tokio::test]
    async fn test_think_rejects_non_list_messages() {
        let agent = InsightAgent::new(CannedModel::replying("{}"), Arc::new(InMemoryRecordStore::new()));
        let err = agent
            .think(&context(json!({ "messages": "hello" })))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_act_priority_and_storage() {
        let store = Arc::new(InMemoryRecordStore::new());
        let agent = InsightAgent::new(CannedModel::replying("{}"), store.clone());

        let high = InsightThoughts {
            chat_title: "Acme".into(),
            confidence: 0.8,
            ..Default::default()
        };
        let medium = InsightThoughts {
            confidence: 0.7,
            ..high.clone()
        };

        assert_eq!(agent.act(&high).await.unwrap().brief.priority, "High");
        assert_eq!(agent.act(&medium).await.unwrap().brief.priority, "Medium");

        let briefs = store.briefs().await;
        assert_eq!(briefs.len(), 2);
        assert_eq!(briefs[0].status, "Active");
    }

    #[tokio::test]
    async fn test_act_store_failure_is_error() {
        let store = Arc::new(InMemoryRecordStore::new());
        store.set_offline(true);
        let agent = InsightAgent::new(CannedModel::replying("{}"), store);

        let err = agent.act(&InsightThoughts::default()).await.unwrap_err();
        assert!(matches!(err, AgentError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_observe_patterns() {
        let store = Arc::new(InMemoryRecordStore::new());
        let agent = InsightAgent::new(CannedModel::replying("{}"), store);
        let mut thoughts = InsightThoughts::default();
        thoughts.signals.insert("risk".into(), vec!["concern".into()]);
        let outcome = agent.act(&thoughts).await.unwrap();

        let learning = agent.observe(&outcome).await.unwrap();
        assert_eq!(learning.metrics["briefs_created"], 1.0);
        assert_eq!(
            learning.patterns["high_priority_indicators"],
            json!(["urgent", "deadline", "opportunity"])
        );
        assert_eq!(learning.patterns["observed_signals"], json!({"risk": ["concern"]}));
        assert_eq!(learning.summary, "Business analysis completed successfully");
    }
}
