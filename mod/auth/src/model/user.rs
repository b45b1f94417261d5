use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-module permission triple: what a user may do inside one module
/// (e.g. "production", "aitools").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleActions {
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: bool,
    #[serde(default)]
    pub delete: bool,
}

/// Module name → permission triple.
pub type PermissionMap = HashMap<String, ModuleActions>;

/// Role — a closed variant over the three account kinds.
///
/// SystemAdmin deliberately carries no checkpoint or permission fields:
/// those are overridden, not consulted, when a system admin is evaluated,
/// so the type does not store them at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Role {
    /// Station operator. At most one assigned checkpoint (enforced at
    /// create/update time) — it doubles as the session default station.
    User {
        #[serde(default)]
        assigned_checkpoints: Vec<String>,
        #[serde(default)]
        permissions: PermissionMap,
    },

    /// Line/floor admin. May be assigned any number of checkpoints.
    Admin {
        #[serde(default)]
        assigned_checkpoints: Vec<String>,
        #[serde(default)]
        permissions: PermissionMap,
    },

    /// Full access everywhere. No stored fields to override.
    SystemAdmin,
}

/// The session default station resolved for a user at login.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionCheckpoint {
    /// Exactly one assigned checkpoint — use it directly, no prompt.
    Station { checkpoint_id: String },

    /// Several assigned checkpoints — the caller must prompt for an
    /// explicit choice among exactly these.
    NeedsSelection { checkpoint_ids: Vec<String> },

    /// No automatic default (system admin, or nothing assigned).
    NoDefault,
}

impl Role {
    /// Short tag for JWT claims and logging.
    pub fn tag(&self) -> &'static str {
        match self {
            Role::User { .. } => "user",
            Role::Admin { .. } => "admin",
            Role::SystemAdmin => "systemAdmin",
        }
    }

    /// Resolve the default scan-session checkpoint for this role.
    ///
    /// - User or Admin with exactly one assignment → that checkpoint.
    /// - Admin with more than one → needs an explicit selection among them.
    /// - SystemAdmin, or zero assignments → no default.
    pub fn session_checkpoint(&self) -> SessionCheckpoint {
        match self {
            Role::SystemAdmin => SessionCheckpoint::NoDefault,
            Role::User { assigned_checkpoints, .. }
            | Role::Admin { assigned_checkpoints, .. } => match assigned_checkpoints.as_slice() {
                [] => SessionCheckpoint::NoDefault,
                [only] => SessionCheckpoint::Station {
                    checkpoint_id: only.clone(),
                },
                many => SessionCheckpoint::NeedsSelection {
                    checkpoint_ids: many.to_vec(),
                },
            },
        }
    }

    /// Check a per-module permission. SystemAdmin always passes; stored
    /// maps are never consulted for it.
    pub fn can_access_module(&self, module: &str, action: &str) -> bool {
        let permissions = match self {
            Role::SystemAdmin => return true,
            Role::User { permissions, .. } | Role::Admin { permissions, .. } => permissions,
        };
        let Some(actions) = permissions.get(module) else {
            return false;
        };
        match action {
            "read" => actions.read,
            "write" => actions.write,
            "delete" => actions.delete,
            _ => false,
        }
    }

    /// Check that this role may record passes at the given checkpoint.
    /// SystemAdmin may operate anywhere; others only where assigned.
    pub fn may_operate_checkpoint(&self, checkpoint_id: &str) -> bool {
        match self {
            Role::SystemAdmin => true,
            Role::User { assigned_checkpoints, .. }
            | Role::Admin { assigned_checkpoints, .. } => {
                assigned_checkpoints.iter().any(|cp| cp == checkpoint_id)
            }
        }
    }
}

/// A user account. The stored document includes the password hash; use
/// [`UserInfo`] for anything that leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Unique login name.
    pub username: String,

    /// Display name.
    pub name: String,

    /// Whether the account is active.
    #[serde(default = "default_true")]
    pub active: bool,

    /// Argon2id password hash (PHC string).
    pub password_hash: String,

    /// Role with its checkpoint assignments and permissions.
    #[serde(flatten)]
    pub role: Role,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Public view of a user — everything except the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub name: String,
    pub active: bool,
    #[serde(flatten)]
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserInfo {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            name: u.name,
            active: u.active,
            role: u.role,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Input for creating a new user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub username: String,
    pub name: String,
    pub password: String,
    #[serde(flatten)]
    pub role: Role,
}

/// Input for updating a user. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

fn default_true() -> bool {
    true
}
