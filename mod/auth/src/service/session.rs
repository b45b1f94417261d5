use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use stitchline_core::new_id;
use stitchline_sql::Value;

use crate::model::{Claims, Session, TokenPair, User};
use crate::service::{AuthError, AuthService, internal, store_err};

impl AuthService {
    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        let key = EncodingKey::from_secret(self.config.jwt_secret.as_bytes());
        encode(&Header::default(), claims, &key).map_err(internal)
    }

    /// Issue an access/refresh token pair for `user` and record the
    /// session. Both tokens carry the same session id; the refresh
    /// token just expires later.
    pub fn issue_tokens(&self, user: &User) -> Result<TokenPair, AuthError> {
        let sid = new_id();
        let now = chrono::Utc::now();
        let access_exp = now + chrono::Duration::seconds(self.config.access_token_ttl);
        let refresh_exp = now + chrono::Duration::seconds(self.config.refresh_token_ttl);

        let claims = Claims {
            sub: user.id.clone(),
            name: user.name.clone(),
            role: user.role.tag().to_string(),
            sid: sid.clone(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
        };
        let access_token = self.sign(&claims)?;
        let refresh_token = self.sign(&Claims { exp: refresh_exp.timestamp(), ..claims })?;

        let session = Session {
            id: sid,
            user_id: user.id.clone(),
            issued_at: now.to_rfc3339(),
            expires_at: refresh_exp.to_rfc3339(),
            revoked: false,
        };
        self.insert_record("sessions", &session.id, &session, &[
            ("user_id", Value::Text(session.user_id.clone())),
            ("revoked", Value::Integer(0)),
            ("issued_at", Value::Text(session.issued_at.clone())),
            ("expires_at", Value::Text(session.expires_at.clone())),
            ("created_at", Value::Text(session.issued_at.clone())),
        ])?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_ttl,
        })
    }

    /// Decode and verify a token. Rejects expired tokens, bad
    /// signatures, and tokens whose session was revoked.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AuthError::Unauthorized(format!("invalid token: {e}")))?;

        let claims = decoded.claims;
        if let Ok(session) = self.get_record::<Session>("sessions", &claims.sid) {
            if session.revoked {
                return Err(AuthError::Unauthorized("session has been revoked".into()));
            }
        }
        Ok(claims)
    }

    /// Trade a refresh token for a fresh pair. The old session is
    /// revoked so a stolen refresh token can be replayed at most once.
    pub fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.verify_token(refresh_token)?;

        let user: User = self
            .get_record("users", &claims.sub)
            .map_err(|_| AuthError::Unauthorized("user not found".into()))?;
        if !user.active {
            return Err(AuthError::Unauthorized("user is deactivated".into()));
        }

        self.revoke_session(&claims.sid)?;
        self.issue_tokens(&user)
    }

    /// Mark one session revoked; its tokens stop verifying.
    pub fn revoke_session(&self, session_id: &str) -> Result<(), AuthError> {
        let mut session: Session = self.get_record("sessions", session_id)?;
        session.revoked = true;
        self.update_record("sessions", session_id, &session, &[("revoked", Value::Integer(1))])
    }

    /// Revoke every live session of one user. Returns how many were
    /// revoked.
    pub fn revoke_all_user_sessions(&self, user_id: &str) -> Result<u64, AuthError> {
        self.sql
            .exec(
                "UPDATE sessions SET revoked = 1, \
                 data = REPLACE(data, '\"revoked\":false', '\"revoked\":true') \
                 WHERE user_id = ?1 AND revoked = 0",
                &[Value::from(user_id)],
            )
            .map_err(store_err)
    }

    /// Live sessions of one user, newest first.
    pub fn list_user_sessions(&self, user_id: &str) -> Result<Vec<Session>, AuthError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM sessions \
                 WHERE user_id = ?1 AND revoked = 0 ORDER BY issued_at DESC",
                &[Value::from(user_id)],
            )
            .map_err(store_err)?;

        rows.iter()
            .filter_map(|row| row.get_str("data"))
            .map(|data| serde_json::from_str(data).map_err(internal))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{CreateUser, PermissionMap, Role};
    use crate::service::user::tests::test_service;

    fn create_operator(svc: &crate::service::AuthService, username: &str) -> crate::model::User {
        svc.create_user(CreateUser {
            username: username.into(),
            name: username.into(),
            password: "s3wing-floor".into(),
            role: Role::User {
                assigned_checkpoints: vec![],
                permissions: PermissionMap::new(),
            },
        })
        .unwrap()
    }

    #[test]
    fn issue_and_verify_token() {
        let svc = test_service();
        let user = create_operator(&svc, "rahim");

        let tokens = svc.issue_tokens(&user).unwrap();
        assert!(!tokens.access_token.is_empty());
        assert_eq!(tokens.token_type, "Bearer");

        let claims = svc.verify_token(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn refresh_revokes_old_session() {
        let svc = test_service();
        let user = create_operator(&svc, "karim");

        let tokens1 = svc.issue_tokens(&user).unwrap();
        let tokens2 = svc.refresh_tokens(&tokens1.refresh_token).unwrap();
        assert_ne!(tokens2.access_token, tokens1.access_token);

        assert!(svc.verify_token(&tokens1.access_token).is_err());
        assert!(svc.verify_token(&tokens2.access_token).is_ok());
    }

    #[test]
    fn revoke_session_invalidates_token() {
        let svc = test_service();
        let user = create_operator(&svc, "fatema");

        let tokens = svc.issue_tokens(&user).unwrap();
        let claims = svc.verify_token(&tokens.access_token).unwrap();

        svc.revoke_session(&claims.sid).unwrap();
        assert!(svc.verify_token(&tokens.access_token).is_err());
    }

    #[test]
    fn revoke_all_user_sessions() {
        let svc = test_service();
        let user = create_operator(&svc, "nazma");

        let t1 = svc.issue_tokens(&user).unwrap();
        let t2 = svc.issue_tokens(&user).unwrap();
        assert_eq!(svc.list_user_sessions(&user.id).unwrap().len(), 2);

        let count = svc.revoke_all_user_sessions(&user.id).unwrap();
        assert_eq!(count, 2);
        assert!(svc.verify_token(&t1.access_token).is_err());
        assert!(svc.verify_token(&t2.access_token).is_err());
    }

    #[test]
    fn invalid_token_rejected() {
        let svc = test_service();
        assert!(svc.verify_token("this.is.not.a.valid.jwt").is_err());
    }
}
