use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    backend::{DbPool, StoreError},
    schema::admins,
    validation::is_valid_email,
};

#[derive(Debug, Queryable, Serialize, Deserialize, Clone, PartialEq)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

impl AdminUser {
    pub fn validate_password(password: &str) -> bool {
        password.len() > 6
    }
}

/// Published whenever an admin signs in or out. `session` is the session
/// that is now current for `admin_id`: present after a sign in, absent after
/// a sign out.
#[derive(Debug, Clone)]
pub struct SessionChange {
    pub admin_id: String,
    pub session: Option<AdminUser>,
}

#[derive(Debug, Error)]
pub enum SignInError {
    #[error("no admin with that email")]
    UnknownEmail,
    #[error("incorrect password")]
    WrongPassword,
    #[error("stored password hash is unusable: {0}")]
    BadHash(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("an admin with that email already exists")]
    EmailTaken,
    #[error("{0}")]
    Invalid(String),
    #[error("could not hash password: {0}")]
    Hash(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub trait AuthService: Send + Sync {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminUser, SignInError>;

    fn sign_out(&self, admin: &AdminUser);

    fn find(&self, id: &str) -> Result<Option<AdminUser>, StoreError>;

    /// A stream of every subsequent sign in and sign out.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;
}

pub struct SqliteAuthService {
    pool: DbPool,
    tx: broadcast::Sender<SessionChange>,
}

impl SqliteAuthService {
    pub fn new(pool: DbPool) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { pool, tx }
    }

    pub fn create_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminUser, AccountError> {
        is_valid_email(email).map_err(AccountError::Invalid)?;
        if !AdminUser::validate_password(password) {
            return Err(AccountError::Invalid(
                "password must be longer than 6 characters".to_string(),
            ));
        }

        let mut conn = self.pool.get().map_err(StoreError::from)?;

        let taken = diesel::select(diesel::dsl::exists(
            admins::table.filter(admins::email.eq(email)),
        ))
        .get_result::<bool>(&mut conn)
        .map_err(StoreError::from)?;
        if taken {
            return Err(AccountError::EmailTaken);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AccountError::Hash(e.to_string()))?
            .to_string();

        let admin = AdminUser {
            id: Uuid::now_v7().to_string(),
            email: email.to_string(),
            created_at: Utc::now().naive_utc(),
        };

        diesel::insert_into(admins::table)
            .values((
                admins::id.eq(&admin.id),
                admins::email.eq(&admin.email),
                admins::password_hash.eq(password_hash),
                admins::created_at.eq(admin.created_at),
            ))
            .execute(&mut conn)
            .map_err(StoreError::from)?;

        tracing::info!("created admin {}", admin.email);
        Ok(admin)
    }

    fn publish(&self, change: SessionChange) {
        // nobody listening is fine
        let _ = self.tx.send(change);
    }
}

impl AuthService for SqliteAuthService {
    #[tracing::instrument(skip(self, password))]
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminUser, SignInError> {
        let mut conn = self.pool.get().map_err(StoreError::from)?;

        let row = admins::table
            .filter(admins::email.eq(email))
            .select((
                (admins::id, admins::email, admins::created_at),
                admins::password_hash,
            ))
            .first::<(AdminUser, String)>(&mut conn)
            .optional()
            .map_err(StoreError::from)?;

        let (admin, password_hash) = row.ok_or(SignInError::UnknownEmail)?;

        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| SignInError::BadHash(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| SignInError::WrongPassword)?;

        self.publish(SessionChange {
            admin_id: admin.id.clone(),
            session: Some(admin.clone()),
        });

        Ok(admin)
    }

    fn sign_out(&self, admin: &AdminUser) {
        self.publish(SessionChange {
            admin_id: admin.id.clone(),
            session: None,
        });
    }

    fn find(&self, id: &str) -> Result<Option<AdminUser>, StoreError> {
        let mut conn = self.pool.get()?;

        Ok(admins::table
            .filter(admins::id.eq(id))
            .select((admins::id, admins::email, admins::created_at))
            .first::<AdminUser>(&mut conn)
            .optional()?)
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::connect;

    #[test]
    fn sign_in_checks_password() {
        let auth = SqliteAuthService::new(connect(":memory:").unwrap());
        let admin = auth
            .create_admin("admin@solarys.com", "senha-secreta")
            .unwrap();

        let signed_in =
            auth.sign_in("admin@solarys.com", "senha-secreta").unwrap();
        assert_eq!(signed_in.id, admin.id);
        assert!(matches!(
            auth.sign_in("admin@solarys.com", "errada1234"),
            Err(SignInError::WrongPassword)
        ));
        assert!(matches!(
            auth.sign_in("ninguem@solarys.com", "senha-secreta"),
            Err(SignInError::UnknownEmail)
        ));
    }

    #[test]
    fn duplicate_and_weak_accounts_are_refused() {
        let auth = SqliteAuthService::new(connect(":memory:").unwrap());
        auth.create_admin("admin@solarys.com", "senha-secreta")
            .unwrap();

        assert!(matches!(
            auth.create_admin("admin@solarys.com", "outra-senha"),
            Err(AccountError::EmailTaken)
        ));
        assert!(matches!(
            auth.create_admin("outro@solarys.com", "curta"),
            Err(AccountError::Invalid(_))
        ));
    }

    #[test]
    fn session_changes_are_published() {
        let auth = SqliteAuthService::new(connect(":memory:").unwrap());
        let admin = auth
            .create_admin("admin@solarys.com", "senha-secreta")
            .unwrap();
        let mut rx = auth.subscribe();

        auth.sign_in("admin@solarys.com", "senha-secreta").unwrap();
        auth.sign_out(&admin);

        let signed_in = rx.try_recv().unwrap();
        assert_eq!(signed_in.session.map(|s| s.id), Some(admin.id.clone()));
        let signed_out = rx.try_recv().unwrap();
        assert_eq!(signed_out.admin_id, admin.id);
        assert!(signed_out.session.is_none());
    }
}
