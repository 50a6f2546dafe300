// Wire types for the management API.
//
// Request structs mirror what the broker expects on PUT; response
// structs tolerate the field drift between broker versions (tags in
// particular have been both a comma-joined string and a JSON list).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Users ───────────────────────────────────────────────────────────

/// Payload for `PUT /api/users/{name}`.
///
/// The broker requires a full settings document on every put: either a
/// plaintext `password` (it hashes server-side) or a pre-computed
/// `password_hash` + `hashing_algorithm` pair round-tripped from a GET.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashing_algorithm: Option<String>,
    #[serde(with = "tag_list")]
    pub tags: Vec<String>,
}

/// Response shape of `GET /api/users/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub name: String,
    #[serde(default, deserialize_with = "tag_list::deserialize")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub password_hash: String,
    #[serde(default)]
    pub hashing_algorithm: String,
}

// ── Virtual hosts ───────────────────────────────────────────────────

/// Payload for `PUT /api/vhosts/{name}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VhostSettings {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_queue_type: Option<String>,
    pub tracing: bool,
    #[serde(with = "tag_list")]
    pub tags: Vec<String>,
}

/// Response shape of `GET /api/vhosts/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct VhostInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_queue_type: Option<String>,
    #[serde(default)]
    pub tracing: bool,
    #[serde(default, deserialize_with = "tag_list::deserialize")]
    pub tags: Vec<String>,
}

// ── Permissions ─────────────────────────────────────────────────────

/// Payload for `PUT /api/permissions/{vhost}/{user}`.
#[derive(Debug, Clone, Serialize)]
pub struct Permissions {
    pub configure: String,
    pub write: String,
    pub read: String,
}

/// Response shape of `GET /api/permissions/{vhost}/{user}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PermissionInfo {
    pub user: String,
    pub vhost: String,
    pub configure: String,
    pub write: String,
    pub read: String,
}

// ── Topic permissions ───────────────────────────────────────────────

/// Payload for `PUT /api/topic-permissions/{vhost}/{user}`.
#[derive(Debug, Clone, Serialize)]
pub struct TopicPermissions {
    pub exchange: String,
    pub write: String,
    pub read: String,
}

/// One entry of `GET /api/topic-permissions/{vhost}/{user}`.
///
/// The endpoint returns every topic grant for the (user, vhost) pair;
/// callers filter by exchange themselves.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicPermissionInfo {
    pub user: String,
    pub vhost: String,
    pub exchange: String,
    pub write: String,
    pub read: String,
}

// ── Exchanges ───────────────────────────────────────────────────────

/// Payload for `PUT /api/exchanges/{vhost}/{name}`.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeSettings {
    #[serde(rename = "type")]
    pub exchange_type: String,
    pub durable: bool,
    pub auto_delete: bool,
    pub arguments: BTreeMap<String, String>,
}

/// Response shape of `GET /api/exchanges/{vhost}/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfo {
    pub name: String,
    pub vhost: String,
    #[serde(rename = "type")]
    pub exchange_type: String,
    #[serde(default)]
    pub durable: bool,
    #[serde(default)]
    pub auto_delete: bool,
    #[serde(default)]
    pub arguments: BTreeMap<String, serde_json::Value>,
}

// ── Tag codec ───────────────────────────────────────────────────────

/// Tags are sent as the comma-joined string the PUT endpoints document,
/// but come back as either that string or a JSON list depending on the
/// broker version.
mod tag_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tags: &[String], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&tags.join(","))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<String>),
            Csv(String),
        }

        Ok(match Raw::deserialize(de)? {
            Raw::List(tags) => tags,
            Raw::Csv(csv) => csv
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect(),
        })
    }
}
