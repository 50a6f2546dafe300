// The five broker object kinds under management.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broker object kind. Every reconciler, error, and import token is
/// tagged with one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    User,
    VirtualHost,
    Permission,
    TopicPermission,
    Exchange,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::VirtualHost => "vhost",
            Self::Permission => "permissions",
            Self::TopicPermission => "topic permissions",
            Self::Exchange => "exchange",
        }
    }

    /// Human-readable shape of the kind's import token.
    pub fn import_format(self) -> &'static str {
        match self {
            Self::User | Self::VirtualHost => "name",
            Self::Permission => "user@vhost",
            Self::TopicPermission => "user@vhost@exchange",
            Self::Exchange => "name@vhost",
        }
    }

    /// Number of natural-key fields encoded in the import token.
    pub fn key_parts(self) -> usize {
        match self {
            Self::User | Self::VirtualHost => 1,
            Self::Permission | Self::Exchange => 2,
            Self::TopicPermission => 3,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
