use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RUNNING_TASKS: usize = 5;
pub const DEFAULT_SAMPLE_EVENTS: usize = 10_000;
pub const DEFAULT_ACCESS_GROUP_NAME: &str = "datagen-security-group";

/// Network resources resolved once per process and reused across invocations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkContext {
    pub network_id: String,
    pub subnet_ids: Vec<String>,
    pub access_group_id: String,
}

/// Caller-supplied parameters, parsed from the event's query string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchRequest {
    pub username: String,
    pub password: String,
    #[serde(rename = "bootstrapServers")]
    pub bootstrap_servers: String,
}

/// Process-wide settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSettings {
    pub network_name: String,
    pub access_group_name: String,
    pub cluster_name: String,
    pub task_definition: String,
    pub container_name: String,
    pub max_running_tasks: usize,
    pub sample_events: usize,
}

/// Everything a single invocation needs, constructed once per process and
/// passed explicitly into the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchContext {
    pub settings: LaunchSettings,
    pub network: NetworkContext,
}

/// One run-task submission. Built per accepted request, submitted exactly
/// once, never retried.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskLaunchRequest {
    pub cluster_name: String,
    pub task_definition: String,
    pub container_name: String,
    pub subnet_ids: Vec<String>,
    pub access_group_id: String,
    pub command: Vec<String>,
    pub desired_count: i32,
}

/// Whatever identifiers the provider's launch call returned. No polling for
/// task health happens after this.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub task_arns: Vec<String>,
    pub failures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn normalize_launch_request(request: LaunchRequest) -> Result<LaunchRequest, ValidationError> {
    let username = request.username.trim().to_string();
    if username.is_empty() {
        return Err(ValidationError::new("username cannot be empty"));
    }

    let password = request.password.trim().to_string();
    if password.is_empty() {
        return Err(ValidationError::new("password cannot be empty"));
    }

    let bootstrap_servers = request.bootstrap_servers.trim().to_string();
    if bootstrap_servers.is_empty() {
        return Err(ValidationError::new("bootstrapServers cannot be empty"));
    }

    Ok(LaunchRequest {
        username,
        password,
        bootstrap_servers,
    })
}
