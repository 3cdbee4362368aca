use datagen_launch_core::contract::{LaunchSettings, NetworkContext};
use datagen_launch_core::error::ResolveError;

/// Lookup of virtual-network resources by name and membership.
pub trait NetworkDirectory {
    /// Resolves a network whose Name tag matches exactly. First match wins
    /// when the provider returns several.
    fn network_id_by_name(&self, name: &str) -> Result<String, ResolveError>;

    /// All subnets belonging to the network, in provider order.
    fn subnets_for_network(&self, network_id: &str) -> Result<Vec<String>, ResolveError>;

    /// The security group scoped to the network with the given name. No
    /// fallback creation.
    fn access_group_for_network(
        &self,
        network_id: &str,
        group_name: &str,
    ) -> Result<String, ResolveError>;
}

/// Resolves the full network context once, before the event loop starts.
/// A failure here aborts startup: no task is ever listed or dispatched
/// against an unresolved network.
pub fn resolve_network_context(
    directory: &dyn NetworkDirectory,
    settings: &LaunchSettings,
) -> Result<NetworkContext, ResolveError> {
    let network_id = directory.network_id_by_name(&settings.network_name)?;
    let subnet_ids = directory.subnets_for_network(&network_id)?;
    let access_group_id =
        directory.access_group_for_network(&network_id, &settings.access_group_name)?;

    Ok(NetworkContext {
        network_id,
        subnet_ids,
        access_group_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagen_launch_core::contract::{DEFAULT_MAX_RUNNING_TASKS, DEFAULT_SAMPLE_EVENTS};

    struct FakeDirectory {
        networks: Vec<(String, String)>,
        subnets: Vec<String>,
        access_group: Option<String>,
    }

    impl NetworkDirectory for FakeDirectory {
        fn network_id_by_name(&self, name: &str) -> Result<String, ResolveError> {
            self.networks
                .iter()
                .find(|(tag, _)| tag == name)
                .map(|(_, id)| id.clone())
                .ok_or(ResolveError::NetworkNotFound {
                    name: name.to_string(),
                })
        }

        fn subnets_for_network(&self, _network_id: &str) -> Result<Vec<String>, ResolveError> {
            Ok(self.subnets.clone())
        }

        fn access_group_for_network(
            &self,
            network_id: &str,
            group_name: &str,
        ) -> Result<String, ResolveError> {
            self.access_group
                .clone()
                .ok_or_else(|| ResolveError::AccessGroupNotFound {
                    network_id: network_id.to_string(),
                    group_name: group_name.to_string(),
                })
        }
    }

    fn test_settings() -> LaunchSettings {
        LaunchSettings {
            network_name: "datagen-vpc".to_string(),
            access_group_name: "datagen-security-group".to_string(),
            cluster_name: "datagen-cluster".to_string(),
            task_definition: "datagen-runner".to_string(),
            container_name: "datagen".to_string(),
            max_running_tasks: DEFAULT_MAX_RUNNING_TASKS,
            sample_events: DEFAULT_SAMPLE_EVENTS,
        }
    }

    #[test]
    fn resolves_all_three_lookups() {
        let directory = FakeDirectory {
            networks: vec![("datagen-vpc".to_string(), "vpc-123".to_string())],
            subnets: vec!["subnet-a".to_string(), "subnet-b".to_string()],
            access_group: Some("sg-456".to_string()),
        };

        let context = resolve_network_context(&directory, &test_settings())
            .expect("resolution should succeed");

        assert_eq!(context.network_id, "vpc-123");
        assert_eq!(context.subnet_ids, vec!["subnet-a", "subnet-b"]);
        assert_eq!(context.access_group_id, "sg-456");
    }

    #[test]
    fn first_match_wins_when_several_networks_share_a_name() {
        let directory = FakeDirectory {
            networks: vec![
                ("datagen-vpc".to_string(), "vpc-111".to_string()),
                ("datagen-vpc".to_string(), "vpc-222".to_string()),
            ],
            subnets: vec!["subnet-a".to_string()],
            access_group: Some("sg-456".to_string()),
        };

        let context = resolve_network_context(&directory, &test_settings())
            .expect("resolution should succeed");

        assert_eq!(context.network_id, "vpc-111");
    }

    #[test]
    fn unmatched_network_name_fails_with_not_found() {
        let directory = FakeDirectory {
            networks: Vec::new(),
            subnets: vec!["subnet-a".to_string()],
            access_group: Some("sg-456".to_string()),
        };

        let error = resolve_network_context(&directory, &test_settings())
            .expect_err("resolution should fail");

        assert_eq!(
            error,
            ResolveError::NetworkNotFound {
                name: "datagen-vpc".to_string()
            }
        );
    }

    #[test]
    fn missing_access_group_fails_with_not_found() {
        let directory = FakeDirectory {
            networks: vec![("datagen-vpc".to_string(), "vpc-123".to_string())],
            subnets: vec!["subnet-a".to_string()],
            access_group: None,
        };

        let error = resolve_network_context(&directory, &test_settings())
            .expect_err("resolution should fail");

        assert_eq!(
            error,
            ResolveError::AccessGroupNotFound {
                network_id: "vpc-123".to_string(),
                group_name: "datagen-security-group".to_string(),
            }
        );
    }
}
