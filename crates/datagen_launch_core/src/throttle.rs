/// Throttle the number of concurrent tasks to control costs. The count is a
/// point-in-time read, so concurrent invocations can jointly exceed the
/// ceiling; this is a soft limit, not a hard guarantee.
pub fn is_throttled(running_tasks: usize, max_running_tasks: usize) -> bool {
    running_tasks >= max_running_tasks
}
