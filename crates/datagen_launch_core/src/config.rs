//! Declarative generation-config model consumed by the launched container.
//!
//! The config describes named topics (each with optional key/value generator
//! specs) and named output connections. It travels to the container as a
//! single base64-encoded JSON command-line token.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const KAFKA_CONNECTION_NAME: &str = "dev-kafka";

const JSON_SERIALIZER: &str = "io.shadowtraffic.kafka.serdes.JsonSerializer";

/// Streaming-broker credentials. The JAAS login string is produced here so
/// quote and backslash characters in caller input cannot break out of the
/// login-module value delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaCredentials {
    pub username: String,
    pub password: String,
}

impl KafkaCredentials {
    pub fn jaas_config(&self) -> String {
        format!(
            "org.apache.kafka.common.security.plain.PlainLoginModule required \
             username='{}' password='{}';",
            escape_jaas_value(&self.username),
            escape_jaas_value(&self.password)
        )
    }
}

fn escape_jaas_value(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch == '\\' || ch == '\'' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicGenerator {
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    pub kind: String,
    #[serde(rename = "producerConfigs")]
    pub producer_configs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    pub generators: Vec<TopicGenerator>,
    pub connections: BTreeMap<String, Connection>,
}

impl GenerationConfig {
    /// Serializes to JSON and base64-encodes the result so the whole config
    /// fits in one command-line argument.
    pub fn encoded(&self) -> Result<String, serde_json::Error> {
        let json_config = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json_config))
    }
}

pub fn kafka_connection(bootstrap_servers: &str, credentials: &KafkaCredentials) -> Connection {
    let producer_configs = BTreeMap::from([
        (
            "bootstrap.servers".to_string(),
            bootstrap_servers.to_string(),
        ),
        ("security.protocol".to_string(), "SASL_SSL".to_string()),
        ("sasl.jaas.config".to_string(), credentials.jaas_config()),
        ("sasl.mechanism".to_string(), "PLAIN".to_string()),
        ("key.serializer".to_string(), JSON_SERIALIZER.to_string()),
        ("value.serializer".to_string(), JSON_SERIALIZER.to_string()),
    ]);

    Connection {
        kind: "kafka".to_string(),
        producer_configs,
    }
}

/// The stock customers/orders feed: generated customer names keyed into a
/// `customers` topic, and an `orders` topic whose values reference them.
pub fn order_feed_config(
    bootstrap_servers: &str,
    credentials: &KafkaCredentials,
) -> GenerationConfig {
    let generators = vec![
        TopicGenerator {
            topic: "customers".to_string(),
            key: Some(json!({
                "name": {
                    "_gen": "string",
                    "expr": "#{Name.full_name}",
                }
            })),
            value: None,
        },
        TopicGenerator {
            topic: "orders".to_string(),
            key: None,
            value: Some(json!({
                "orderId": {
                    "_gen": "uuid",
                },
                "customerId": {
                    "_gen": "lookup",
                    "topic": "customers",
                    "path": ["key", "name"],
                }
            })),
        },
    ];

    let connections = BTreeMap::from([(
        KAFKA_CONNECTION_NAME.to_string(),
        kafka_connection(bootstrap_servers, credentials),
    )]);

    GenerationConfig {
        generators,
        connections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_credentials() -> KafkaCredentials {
        KafkaCredentials {
            username: "alice".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn jaas_config_embeds_credentials_between_delimiters() {
        let jaas = sample_credentials().jaas_config();

        assert!(jaas.starts_with(
            "org.apache.kafka.common.security.plain.PlainLoginModule required "
        ));
        assert!(jaas.contains("username='alice'"));
        assert!(jaas.contains("password='secret'"));
        assert!(jaas.ends_with(';'));
    }

    #[test]
    fn jaas_config_escapes_quotes_and_backslashes() {
        let credentials = KafkaCredentials {
            username: "o'brien".to_string(),
            password: r"pa\ss';drop".to_string(),
        };

        let jaas = credentials.jaas_config();
        assert!(jaas.contains(r"username='o\'brien'"));
        assert!(jaas.contains(r"password='pa\\ss\';drop'"));
    }

    #[test]
    fn order_feed_config_serializes_to_expected_wire_shape() {
        let config = order_feed_config("broker-1:9092", &sample_credentials());
        let serialized = serde_json::to_value(&config).expect("config should serialize");

        let expected = json!({
            "generators": [
                {
                    "topic": "customers",
                    "key": {
                        "name": {
                            "_gen": "string",
                            "expr": "#{Name.full_name}",
                        }
                    }
                },
                {
                    "topic": "orders",
                    "value": {
                        "orderId": {
                            "_gen": "uuid",
                        },
                        "customerId": {
                            "_gen": "lookup",
                            "topic": "customers",
                            "path": ["key", "name"],
                        }
                    }
                }
            ],
            "connections": {
                "dev-kafka": {
                    "kind": "kafka",
                    "producerConfigs": {
                        "bootstrap.servers": "broker-1:9092",
                        "security.protocol": "SASL_SSL",
                        "sasl.jaas.config": sample_credentials().jaas_config(),
                        "sasl.mechanism": "PLAIN",
                        "key.serializer": JSON_SERIALIZER,
                        "value.serializer": JSON_SERIALIZER,
                    }
                }
            }
        });

        assert_eq!(serialized, expected);
    }

    #[test]
    fn encoded_config_round_trips_through_base64_and_json() {
        let config = order_feed_config("broker-1:9092", &sample_credentials());
        let encoded = config.encoded().expect("config should encode");

        let decoded_bytes = STANDARD.decode(&encoded).expect("token should be base64");
        let decoded: Value =
            serde_json::from_slice(&decoded_bytes).expect("decoded bytes should be json");

        assert_eq!(
            decoded,
            serde_json::to_value(&config).expect("config should serialize")
        );
    }
}
