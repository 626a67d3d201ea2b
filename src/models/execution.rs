use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle state of a remote execution as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExecutionStatus {
    Pending,
    Running,
    WaitingForInput,
    Completed,
    Failed,
    Cancelled,
    Terminated,
    /// A state this client does not know about yet.
    Other(String),
}

impl ExecutionStatus {
    /// Parse a wire status, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" | "queued" => ExecutionStatus::Pending,
            "running" => ExecutionStatus::Running,
            "waiting_for_input" => ExecutionStatus::WaitingForInput,
            "completed" => ExecutionStatus::Completed,
            "failed" => ExecutionStatus::Failed,
            "cancelled" => ExecutionStatus::Cancelled,
            "terminated" => ExecutionStatus::Terminated,
            _ => ExecutionStatus::Other(normalized),
        }
    }

    /// Whether the execution has finished and will produce no more events.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed
                | ExecutionStatus::Failed
                | ExecutionStatus::Cancelled
                | ExecutionStatus::Terminated
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Running => "running",
            ExecutionStatus::WaitingForInput => "waiting_for_input",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Cancelled => "cancelled",
            ExecutionStatus::Terminated => "terminated",
            ExecutionStatus::Other(s) => s,
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ExecutionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ExecutionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ExecutionStatus::parse(&raw))
    }
}

/// The subset of the "get execution by id" response the stream controller reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Execution {
    /// Set by `GET /executions/:id`.
    #[serde(default)]
    pub id: String,
    /// Set by execute responses; some backends echo it on lookups too.
    #[serde(default)]
    pub execution_id: String,
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Execution {
    /// The execution id, checking both fields the backend may populate.
    pub fn id(&self) -> &str {
        if self.execution_id.is_empty() {
            &self.id
        } else {
            &self.execution_id
        }
    }
}

/// Decode a lookup body that is either one object or a single-element array.
///
/// Returns `Ok(None)` for an empty array.
pub fn decode_execution(body: &[u8]) -> Result<Option<Execution>, serde_json::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Execution),
        Many(Vec<Execution>),
    }

    match serde_json::from_slice::<OneOrMany>(body)? {
        OneOrMany::One(execution) => Ok(Some(execution)),
        OneOrMany::Many(executions) => Ok(executions.into_iter().next()),
    }
}
