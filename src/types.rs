//! API types for the Parallel SDK.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Task status reported while a run is still in progress.
pub const STATUS_RUNNING: &str = "running";

/// Terminal status of a run that finished successfully.
pub const STATUS_COMPLETED: &str = "completed";

/// Terminal status of a run that finished with an error.
pub const STATUS_FAILED: &str = "failed";

/// Decode `null` as the type's default, the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// === Search ===

/// Request for a web search.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SearchRequest {
    /// Natural-language description of what the search should find.
    pub objective: String,
    /// Keyword queries to run.
    pub search_queries: Vec<String>,
    /// Maximum number of results.
    pub max_results: u32,
    /// Maximum characters per result excerpt block.
    pub max_chars_per_result: u32,
}

/// Response from a web search.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SearchResponse {
    /// Server-assigned search identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub search_id: String,
    /// Ranked results.
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<SearchResult>,
}

/// One search result.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SearchResult {
    /// Result URL.
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    /// Page title.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Relevant excerpts from the page.
    #[serde(deserialize_with = "null_as_default")]
    pub excerpts: Vec<String>,
}

// === Extract ===

/// Request to extract content from a set of URLs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ExtractRequest {
    /// Pages to extract.
    pub urls: Vec<String>,
    /// What the extraction should focus on.
    pub objective: String,
    /// Return focused excerpts.
    pub excerpts: bool,
    /// Return the full page content.
    pub full_content: bool,
}

/// Response from an extraction.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ExtractResponse {
    /// Server-assigned extraction identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub extract_id: String,
    /// One entry per successfully extracted page.
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<ExtractResult>,
    /// Per-URL failures.
    #[serde(deserialize_with = "null_as_default")]
    pub errors: Vec<ExtractError>,
}

/// A single extracted web page.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ExtractResult {
    /// Page URL.
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    /// Page title.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Focused excerpts.
    #[serde(deserialize_with = "null_as_default")]
    pub excerpts: Vec<String>,
    /// Full page content, when requested.
    #[serde(deserialize_with = "null_as_default")]
    pub full_content: String,
}

/// A per-URL extraction failure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ExtractError {
    /// Error message.
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
}

// === Tasks ===

/// Request to launch a task run.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TaskRunRequest {
    /// Task input, usually a natural-language question.
    pub input: String,
    /// Processor to run the task on (e.g. `base`, `core`).
    pub processor: String,
}

/// Response from launching a task run.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TaskRunResponse {
    /// Run details and any output already available.
    #[serde(deserialize_with = "null_as_default")]
    pub output: TaskRunOutput,
}

impl TaskRunResponse {
    /// Identifier of the launched run.
    pub fn run_id(&self) -> &str {
        &self.output.run_id
    }
}

/// Structured output returned when a task run is created.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TaskRunOutput {
    /// Processor-specific content.
    pub content: Value,
    /// Reasoning and citations per output field.
    #[serde(deserialize_with = "null_as_default")]
    pub basis: Vec<FieldBasis>,
    /// Server-assigned run identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub run_id: String,
    /// Run status.
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// When the run was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the run completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Processor used.
    #[serde(deserialize_with = "null_as_default")]
    pub processor: String,
    /// Warnings raised by the processor.
    pub warnings: Value,
    /// Error details, if any.
    pub error: Value,
    /// Task group the run belongs to.
    #[serde(rename = "taskgroup_id")]
    pub task_group_id: Value,
}

/// Reasoning and citations backing one output field.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FieldBasis {
    /// Output field name.
    #[serde(deserialize_with = "null_as_default")]
    pub field: String,
    /// Why the processor produced this value.
    #[serde(deserialize_with = "null_as_default")]
    pub reasoning: String,
    /// Sources supporting the value.
    #[serde(deserialize_with = "null_as_default")]
    pub citations: Vec<Citation>,
    /// Confidence label (e.g. `high`).
    #[serde(deserialize_with = "null_as_default")]
    pub confidence: String,
}

/// A source cited in a field basis.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Citation {
    /// Source URL.
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    /// Excerpts taken from the source.
    #[serde(deserialize_with = "null_as_default")]
    pub excerpts: Vec<String>,
    /// Source title.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
}

/// Lifecycle state of a task run, derived from its status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Any non-terminal status, including ones this SDK does not know.
    Pending,
    /// The run finished successfully.
    Completed,
    /// The run finished with an error.
    Failed,
}

impl RunState {
    /// Classify a raw status string.
    pub fn from_status(status: &str) -> Self {
        match status {
            STATUS_COMPLETED => RunState::Completed,
            STATUS_FAILED => RunState::Failed,
            _ => RunState::Pending,
        }
    }

    /// Whether no further progress will occur.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunState::Pending)
    }
}

/// Current status, or final output, of a task run.
///
/// Returned by [`Client::get_task`](crate::Client::get_task) and
/// [`Client::poll_until_complete`](crate::Client::poll_until_complete).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TaskRunResult {
    /// Server-assigned run identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub run_id: String,
    /// Raw run status. See [`TaskRunResult::state`].
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// Whether the run is still active.
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    /// Processor used.
    #[serde(deserialize_with = "null_as_default")]
    pub processor: String,
    /// Raw processor output.
    pub output: Value,
    /// Error details, if any.
    pub error: Value,
    /// Warnings raised by the processor.
    pub warnings: Value,
    /// Run metadata.
    pub metadata: Value,
    /// Task group the run belongs to.
    #[serde(rename = "taskgroup_id")]
    pub task_group_id: Option<String>,
    /// When the run was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the run was last modified.
    pub modified_at: Option<DateTime<Utc>>,
}

impl TaskRunResult {
    /// Lifecycle state of the run.
    pub fn state(&self) -> RunState {
        RunState::from_status(&self.status)
    }
}

// === Chat ===

/// Request for a chat completion.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChatRequest {
    /// Model to use.
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<ChatMessage>,
    /// Streaming flag. Streamed responses are not consumed by this SDK.
    pub stream: bool,
    /// Schema-constrained output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// A chat message.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ChatMessage {
    /// Author role (`system`, `user`, `assistant`, ...).
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
    /// Message text.
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
}

impl ChatMessage {
    /// Create a message with the given role.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a `system` message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    /// Create a `user` message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Output format for a chat completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseFormat {
    /// Format type, `json_schema`.
    #[serde(rename = "type")]
    pub format_type: String,
    /// The schema to follow.
    pub json_schema: JsonSchemaSpec,
}

impl ResponseFormat {
    /// A `json_schema` response format.
    pub fn json_schema(name: impl Into<String>, schema: Map<String, Value>) -> Self {
        Self {
            format_type: "json_schema".into(),
            json_schema: JsonSchemaSpec {
                name: name.into(),
                schema,
            },
        }
    }
}

/// A named JSON schema.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct JsonSchemaSpec {
    /// Schema name.
    pub name: String,
    /// The full JSON schema.
    pub schema: Map<String, Value>,
}

/// Response from a chat completion.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ChatResponse {
    /// Server-assigned completion identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Object type.
    #[serde(deserialize_with = "null_as_default")]
    pub object: String,
    /// Model that produced the completion.
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    /// Creation time, Unix seconds.
    #[serde(deserialize_with = "null_as_default")]
    pub created: i64,
    /// Generated choices.
    #[serde(deserialize_with = "null_as_default")]
    pub choices: Vec<ChatChoice>,
    /// Token usage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Map<String, Value>>,
}

/// A single generated message.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ChatChoice {
    /// Choice index.
    #[serde(deserialize_with = "null_as_default")]
    pub index: u32,
    /// Generated message.
    #[serde(deserialize_with = "null_as_default")]
    pub message: ChatMessage,
    /// Why generation stopped.
    #[serde(deserialize_with = "null_as_default")]
    pub finish_reason: String,
}
