use datagen_launch_core::contract::{LaunchOutcome, TaskLaunchRequest};

/// The container-orchestration surface the handler needs: a point-in-time
/// running-task count and a single-shot task launch.
pub trait TaskOrchestrator {
    fn running_task_count(&self, cluster_name: &str) -> Result<usize, String>;

    fn run_generation_task(&self, request: &TaskLaunchRequest) -> Result<LaunchOutcome, String>;
}
