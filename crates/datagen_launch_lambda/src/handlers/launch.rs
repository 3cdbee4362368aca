use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use datagen_launch_core::config::{order_feed_config, KafkaCredentials};
use datagen_launch_core::contract::{
    normalize_launch_request, LaunchContext, LaunchRequest, TaskLaunchRequest,
};
use datagen_launch_core::throttle::is_throttled;

use crate::adapters::orchestrator::TaskOrchestrator;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchAcceptedResponse {
    pub status: String,
    pub cluster_name: String,
    pub task_arns: Vec<String>,
    pub failures: Vec<String>,
}

/// Handles one HTTP-triggered launch event: validate the query parameters,
/// build the generation config, check the throttle, dispatch one task.
pub fn handle_launch_event(
    event: Value,
    context: &LaunchContext,
    orchestrator: &dyn TaskOrchestrator,
) -> ApiGatewayResponse {
    let request = match parse_query_parameters(event) {
        Ok(value) => value,
        Err(message) => return validation_error_response(&message),
    };

    let request = match normalize_launch_request(request) {
        Ok(value) => value,
        Err(error) => return validation_error_response(error.message()),
    };

    let credentials = KafkaCredentials {
        username: request.username,
        password: request.password,
    };
    let config = order_feed_config(&request.bootstrap_servers, &credentials);
    let encoded_config = match config.encoded() {
        Ok(value) => value,
        Err(error) => {
            return error_response(
                500,
                json!({
                    "error": "serialization_error",
                    "message": error.to_string(),
                }),
            );
        }
    };

    let settings = &context.settings;
    let running_tasks = match orchestrator.running_task_count(&settings.cluster_name) {
        Ok(value) => value,
        Err(error) => {
            return error_response(
                502,
                json!({
                    "error": "task_listing_failed",
                    "message": error,
                    "cluster_name": settings.cluster_name,
                }),
            );
        }
    };

    if is_throttled(running_tasks, settings.max_running_tasks) {
        tracing::warn!(
            running_tasks,
            max_running_tasks = settings.max_running_tasks,
            "rejecting launch, cluster is at its task ceiling"
        );
        return error_response(
            429,
            json!({
                "error": "throttled",
                "running_tasks": running_tasks,
                "max_running_tasks": settings.max_running_tasks,
            }),
        );
    }

    let launch_request = TaskLaunchRequest {
        cluster_name: settings.cluster_name.clone(),
        task_definition: settings.task_definition.clone(),
        container_name: settings.container_name.clone(),
        subnet_ids: context.network.subnet_ids.clone(),
        access_group_id: context.network.access_group_id.clone(),
        command: vec![
            "--config-base64".to_string(),
            encoded_config,
            "--sample".to_string(),
            settings.sample_events.to_string(),
        ],
        desired_count: 1,
    };

    match orchestrator.run_generation_task(&launch_request) {
        Ok(outcome) => {
            tracing::info!(
                cluster_name = %settings.cluster_name,
                task_arns = outcome.task_arns.len(),
                "dispatched generation task"
            );
            success_response(
                200,
                LaunchAcceptedResponse {
                    status: "task_dispatched".to_string(),
                    cluster_name: settings.cluster_name.clone(),
                    task_arns: outcome.task_arns,
                    failures: outcome.failures,
                },
            )
        }
        Err(error) => error_response(
            502,
            json!({
                "error": "dispatch_failed",
                "message": error,
                "cluster_name": settings.cluster_name,
            }),
        ),
    }
}

fn parse_query_parameters(event: Value) -> Result<LaunchRequest, String> {
    let Some(object) = event.as_object() else {
        return Err("Event payload must be a JSON object".to_string());
    };

    let Some(parameters) = object.get("queryStringParameters") else {
        return Err("Event is missing queryStringParameters".to_string());
    };

    serde_json::from_value(parameters.clone())
        .map_err(|error| format!("Malformed query parameters: {error}"))
}

fn validation_error_response(message: &str) -> ApiGatewayResponse {
    error_response(
        400,
        json!({
            "error": "validation_error",
            "message": message,
        }),
    )
}

fn success_response(status_code: u16, payload: impl Serialize) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: serde_json::to_string(&payload).expect("response payload should serialize"),
    }
}

fn error_response(status_code: u16, payload: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: payload.to_string(),
    }
}
