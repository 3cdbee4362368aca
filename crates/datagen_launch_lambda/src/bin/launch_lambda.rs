use std::env;

use aws_sdk_ec2::types::Filter;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, DesiredStatus, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use datagen_launch_core::contract::{
    LaunchContext, LaunchOutcome, LaunchSettings, TaskLaunchRequest, DEFAULT_ACCESS_GROUP_NAME,
    DEFAULT_MAX_RUNNING_TASKS, DEFAULT_SAMPLE_EVENTS,
};
use datagen_launch_core::error::ResolveError;
use datagen_launch_lambda::adapters::network::{resolve_network_context, NetworkDirectory};
use datagen_launch_lambda::adapters::orchestrator::TaskOrchestrator;
use datagen_launch_lambda::handlers::launch::{handle_launch_event, ApiGatewayResponse};

struct Ec2NetworkDirectory {
    ec2_client: aws_sdk_ec2::Client,
}

impl NetworkDirectory for Ec2NetworkDirectory {
    fn network_id_by_name(&self, name: &str) -> Result<String, ResolveError> {
        let client = self.ec2_client.clone();
        let network_name = name.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .describe_vpcs()
                    .filters(
                        Filter::builder()
                            .name("tag:Name")
                            .values(&network_name)
                            .build(),
                    )
                    .send()
                    .await
                    .map_err(|error| {
                        ResolveError::Provider(format!("failed to describe networks: {error}"))
                    })?;

                response
                    .vpcs()
                    .first()
                    .and_then(|vpc| vpc.vpc_id().map(str::to_string))
                    .ok_or(ResolveError::NetworkNotFound { name: network_name })
            })
        })
    }

    fn subnets_for_network(&self, network_id: &str) -> Result<Vec<String>, ResolveError> {
        let client = self.ec2_client.clone();
        let network_id = network_id.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .describe_subnets()
                    .filters(Filter::builder().name("vpc-id").values(network_id).build())
                    .send()
                    .await
                    .map_err(|error| {
                        ResolveError::Provider(format!("failed to describe subnets: {error}"))
                    })?;

                Ok(response
                    .subnets()
                    .iter()
                    .filter_map(|subnet| subnet.subnet_id().map(str::to_string))
                    .collect())
            })
        })
    }

    fn access_group_for_network(
        &self,
        network_id: &str,
        group_name: &str,
    ) -> Result<String, ResolveError> {
        let client = self.ec2_client.clone();
        let network_id = network_id.to_string();
        let group_name = group_name.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .describe_security_groups()
                    .filters(Filter::builder().name("vpc-id").values(&network_id).build())
                    .filters(
                        Filter::builder()
                            .name("group-name")
                            .values(&group_name)
                            .build(),
                    )
                    .send()
                    .await
                    .map_err(|error| {
                        ResolveError::Provider(format!(
                            "failed to describe security groups: {error}"
                        ))
                    })?;

                response
                    .security_groups()
                    .first()
                    .and_then(|group| group.group_id().map(str::to_string))
                    .ok_or(ResolveError::AccessGroupNotFound {
                        network_id,
                        group_name,
                    })
            })
        })
    }
}

struct EcsTaskOrchestrator {
    ecs_client: aws_sdk_ecs::Client,
}

impl TaskOrchestrator for EcsTaskOrchestrator {
    fn running_task_count(&self, cluster_name: &str) -> Result<usize, String> {
        let client = self.ecs_client.clone();
        let cluster = cluster_name.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .list_tasks()
                    .cluster(cluster)
                    .desired_status(DesiredStatus::Running)
                    .send()
                    .await
                    .map(|response| response.task_arns().len())
                    .map_err(|error| format!("failed to list running tasks: {error}"))
            })
        })
    }

    fn run_generation_task(&self, request: &TaskLaunchRequest) -> Result<LaunchOutcome, String> {
        let client = self.ecs_client.clone();
        let request = request.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let overrides = TaskOverride::builder()
                    .container_overrides(
                        ContainerOverride::builder()
                            .name(&request.container_name)
                            .set_command(Some(request.command.clone()))
                            .build(),
                    )
                    .build();

                let vpc_configuration = AwsVpcConfiguration::builder()
                    .set_subnets(Some(request.subnet_ids.clone()))
                    .security_groups(&request.access_group_id)
                    .assign_public_ip(AssignPublicIp::Enabled)
                    .build()
                    .map_err(|error| format!("invalid network configuration: {error}"))?;

                let response = client
                    .run_task()
                    .cluster(&request.cluster_name)
                    .task_definition(&request.task_definition)
                    .launch_type(LaunchType::Fargate)
                    .overrides(overrides)
                    .count(request.desired_count)
                    .network_configuration(
                        NetworkConfiguration::builder()
                            .awsvpc_configuration(vpc_configuration)
                            .build(),
                    )
                    .send()
                    .await
                    .map_err(|error| format!("failed to run task: {error}"))?;

                let task_arns = response
                    .tasks()
                    .iter()
                    .filter_map(|task| task.task_arn().map(str::to_string))
                    .collect();
                let failures = response
                    .failures()
                    .iter()
                    .map(|failure| {
                        format!(
                            "{}: {}",
                            failure.arn().unwrap_or("unknown"),
                            failure.reason().unwrap_or("unspecified")
                        )
                    })
                    .collect();

                Ok(LaunchOutcome {
                    task_arns,
                    failures,
                })
            })
        })
    }
}

fn required_env(name: &str) -> Result<String, Error> {
    env::var(name).map_err(|_| Error::from(format!("{name} must be configured")))
}

fn env_usize(name: &str, default: usize) -> Result<usize, Error> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::from(format!("{name} must be a non-negative integer"))),
        Err(_) => Ok(default),
    }
}

fn settings_from_env() -> Result<LaunchSettings, Error> {
    Ok(LaunchSettings {
        network_name: required_env("DATAGEN_NETWORK_NAME")?,
        access_group_name: env::var("DATAGEN_ACCESS_GROUP_NAME")
            .unwrap_or_else(|_| DEFAULT_ACCESS_GROUP_NAME.to_string()),
        cluster_name: required_env("DATAGEN_CLUSTER_NAME")?,
        task_definition: required_env("DATAGEN_TASK_DEFINITION")?,
        container_name: required_env("DATAGEN_CONTAINER_NAME")?,
        max_running_tasks: env_usize("DATAGEN_MAX_RUNNING_TASKS", DEFAULT_MAX_RUNNING_TASKS)?,
        sample_events: env_usize("DATAGEN_SAMPLE_EVENTS", DEFAULT_SAMPLE_EVENTS)?,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = settings_from_env()?;
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let directory = Ec2NetworkDirectory {
        ec2_client: aws_sdk_ec2::Client::new(&config),
    };
    let network = resolve_network_context(&directory, &settings)
        .map_err(|error| Error::from(error.to_string()))?;
    tracing::info!(
        network_id = %network.network_id,
        subnets = network.subnet_ids.len(),
        access_group_id = %network.access_group_id,
        "resolved network context"
    );

    let context = LaunchContext { settings, network };
    let orchestrator = EcsTaskOrchestrator {
        ecs_client: aws_sdk_ecs::Client::new(&config),
    };

    let context_ref = &context;
    let orchestrator_ref = &orchestrator;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<ApiGatewayResponse, Error>(handle_launch_event(
            event.payload,
            context_ref,
            orchestrator_ref,
        ))
    }))
    .await
}
