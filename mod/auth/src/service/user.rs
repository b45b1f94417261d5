use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use stitchline_core::{ListQuery, Page, new_id, now_rfc3339};
use stitchline_sql::Value;

use crate::model::{CreateUser, Role, UpdateUser, User};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Create a new user with a hashed password.
    pub fn create_user(&self, input: CreateUser) -> Result<User, AuthError> {
        if input.username.trim().is_empty() {
            return Err(AuthError::Validation("username cannot be empty".into()));
        }
        if input.password.len() < 8 {
            return Err(AuthError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }
        validate_role(&input.role)?;

        let id = new_id();
        let now = now_rfc3339();
        let user = User {
            id: id.clone(),
            username: input.username.trim().to_string(),
            name: input.name,
            active: true,
            password_hash: hash_password(&input.password)?,
            role: input.role,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record("users", &id, &user, &[
            ("username", Value::Text(user.username.clone())),
            ("role", Value::Text(user.role.tag().to_string())),
            ("active", Value::Integer(1)),
            ("created_at", Value::Text(now.clone())),
            ("updated_at", Value::Text(now)),
        ])?;

        Ok(user)
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, AuthError> {
        self.get_record("users", id)
    }

    /// Get a user by their unique login name.
    pub fn get_user_by_username(&self, username: &str) -> Result<User, AuthError> {
        let rows = self.sql
            .query(
                "SELECT data FROM users WHERE username = ?1",
                &[Value::Text(username.to_string())],
            )
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| AuthError::NotFound(format!("user '{}'", username)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| AuthError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// List users with pagination, optionally filtered by role tag.
    pub fn list_users(
        &self,
        params: &ListQuery,
        role: Option<&str>,
    ) -> Result<Page<User>, AuthError> {
        let mut filters: Vec<(&str, Value)> = Vec::new();
        if let Some(tag) = role {
            filters.push(("role", Value::Text(tag.to_string())));
        }
        let (items, total) =
            self.list_records("users", &filters, params.limit, params.offset)?;
        Ok(Page { items, total })
    }

    /// Update a user. Absent input fields are left unchanged.
    pub fn update_user(&self, id: &str, input: UpdateUser) -> Result<User, AuthError> {
        let mut user: User = self.get_record("users", id)?;

        if let Some(name) = input.name {
            user.name = name;
        }
        if let Some(active) = input.active {
            user.active = active;
        }
        if let Some(password) = input.password {
            if password.len() < 8 {
                return Err(AuthError::Validation(
                    "password must be at least 8 characters".into(),
                ));
            }
            user.password_hash = hash_password(&password)?;
        }
        if let Some(role) = input.role {
            validate_role(&role)?;
            user.role = role;
        }
        user.updated_at = now_rfc3339();

        self.update_record("users", id, &user, &[
            ("role", Value::Text(user.role.tag().to_string())),
            ("active", Value::Integer(user.active as i64)),
            ("updated_at", Value::Text(user.updated_at.clone())),
        ])?;

        Ok(user)
    }

    /// Delete a user and revoke all of their sessions.
    pub fn delete_user(&self, id: &str) -> Result<(), AuthError> {
        self.delete_record("users", id)?;
        self.revoke_all_user_sessions(id)?;
        Ok(())
    }

    /// Ensure the well-known `root` system administrator exists, using a
    /// pre-computed argon2id hash (the plain password never reaches the
    /// server). Called once at startup.
    pub fn ensure_root(&self, password_hash: &str) -> Result<User, AuthError> {
        if let Ok(existing) = self.get_user_by_username("root") {
            return Ok(existing);
        }

        let id = new_id();
        let now = now_rfc3339();
        let user = User {
            id: id.clone(),
            username: "root".into(),
            name: "Root".into(),
            active: true,
            password_hash: password_hash.to_string(),
            role: Role::SystemAdmin,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record("users", &id, &user, &[
            ("username", Value::Text(user.username.clone())),
            ("role", Value::Text(user.role.tag().to_string())),
            ("active", Value::Integer(1)),
            ("created_at", Value::Text(now.clone())),
            ("updated_at", Value::Text(now)),
        ])?;

        Ok(user)
    }

    /// Verify a username/password pair. Returns the user on success.
    pub fn verify_credentials(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .get_user_by_username(username)
            .map_err(|_| AuthError::Unauthorized("invalid credentials".into()))?;

        if !user.active {
            return Err(AuthError::Unauthorized("user is deactivated".into()));
        }

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| AuthError::Internal(format!("bad stored hash: {}", e)))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::Unauthorized("invalid credentials".into()))?;

        Ok(user)
    }
}

/// Hash a password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Internal(format!("password hash failed: {}", e)))
}

/// A User-role account may carry at most one assigned checkpoint — it is
/// the session default station, and an operator has one station.
fn validate_role(role: &Role) -> Result<(), AuthError> {
    if let Role::User { assigned_checkpoints, .. } = role {
        if assigned_checkpoints.len() > 1 {
            return Err(AuthError::Validation(
                "a User role may have at most one assigned checkpoint".into(),
            ));
        }
    }
    Ok(())
}
