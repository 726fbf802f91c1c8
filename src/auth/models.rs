use serde::{Deserialize, Serialize};
use std::fmt;

/// A named permission a caller must hold to invoke a privileged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create and edit own content items (drafts).
    CreatePosts,
    /// Publish content items.
    PublishPosts,
    /// Administer the tool directory and run site-wide scans.
    ManageOptions,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::CreatePosts => write!(f, "create_posts"),
            Capability::PublishPosts => write!(f, "publish_posts"),
            Capability::ManageOptions => write!(f, "manage_options"),
        }
    }
}

/// User roles, ordered from least to most privileged.
///
/// The order of variants matters: a role holds every capability of the
/// roles below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Subscriber = 0,
    Contributor = 1,
    Author = 2,
    Editor = 3,
    Administrator = 4,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Subscriber => write!(f, "subscriber"),
            Role::Contributor => write!(f, "contributor"),
            Role::Author => write!(f, "author"),
            Role::Editor => write!(f, "editor"),
            Role::Administrator => write!(f, "administrator"),
        }
    }
}

impl Role {
    /// The least privileged role that holds `capability`.
    fn minimum_for(capability: Capability) -> Role {
        match capability {
            Capability::CreatePosts => Role::Contributor,
            Capability::PublishPosts => Role::Author,
            Capability::ManageOptions => Role::Administrator,
        }
    }

    /// Returns `true` if this role holds `capability`.
    pub fn can(&self, capability: Capability) -> bool {
        *self >= Role::minimum_for(capability)
    }
}

/// Represents an authenticated user attached to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Unique user identifier.
    pub user_id: String,
    /// User email address.
    pub email: String,
    /// The user's role.
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn can(&self, capability: Capability) -> bool {
        self.role.can(capability)
    }
}
