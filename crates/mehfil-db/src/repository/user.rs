//! # User Repository
//!
//! Storefront accounts: signup, login, admin-created users, and the
//! initial administrator.
//!
//! Credentials never leave this module. Records are stored with an
//! argon2 `passwordHash`; every public method returns [`User`], which has
//! no password field at all. Browser-era records carrying a plaintext
//! `password` are hashed as they are read and saved hashed on the next
//! write.

use mehfil_core::validation::{
    validate_email, validate_name, validate_password, validate_password_confirmation,
};
use mehfil_core::{CoreError, User, UserRole, ValidationError, DEFAULT_ADMIN_EMAIL};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbResult;
use crate::password::{hash_password, verify_password};
use crate::repository::RepoContext;
use crate::store::{load_records, save_records, Collection, RecordStore};

/// Display name of the seeded administrator.
const DEFAULT_ADMIN_NAME: &str = "Admin User";

/// A user as stored: the public profile plus the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    #[serde(flatten)]
    user: User,
    password_hash: String,
}

/// A browser-era user: the public profile plus the plaintext password.
#[derive(Deserialize)]
struct LegacyUserRecord {
    #[serde(flatten)]
    user: User,
    password: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredUser {
    Current(UserRecord),
    Legacy(LegacyUserRecord),
}

impl StoredUser {
    fn into_record(self) -> DbResult<UserRecord> {
        match self {
            StoredUser::Current(record) => Ok(record),
            StoredUser::Legacy(legacy) => Ok(UserRecord {
                password_hash: hash_password(&legacy.password)?,
                user: legacy.user,
            }),
        }
    }
}

/// Repository for the users collection.
pub struct UserRepository<S> {
    ctx: RepoContext<S>,
}

impl<S: RecordStore> UserRepository<S> {
    pub(crate) fn new(ctx: RepoContext<S>) -> Self {
        UserRepository { ctx }
    }

    async fn load(&self) -> DbResult<Vec<UserRecord>> {
        let stored: Vec<StoredUser> =
            load_records(self.ctx.store.as_ref(), Collection::Users).await?;
        stored.into_iter().map(StoredUser::into_record).collect()
    }

    /// All accounts, in creation order.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        Ok(self.load().await?.into_iter().map(|record| record.user).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|record| record.user.id == id)
            .map(|record| record.user))
    }

    /// Looks an account up by email, ignoring case.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let email = email.trim();
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|record| record.user.email.eq_ignore_ascii_case(email))
            .map(|record| record.user))
    }

    /// Customer self-signup. Always creates a `user`-role account.
    ///
    /// ## Checks (in order)
    /// 1. Name present
    /// 2. Email well-formed
    /// 3. Password long enough
    /// 4. Confirmation matches
    /// 5. Email not already registered
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        confirmation: &str,
        name: &str,
    ) -> DbResult<User> {
        self.insert(email, password, name, UserRole::User, Some(confirmation))
            .await
    }

    /// Administrator-created account with any role.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: UserRole,
    ) -> DbResult<User> {
        self.insert(email, password, name, role, None).await
    }

    /// Checks credentials. Unknown email and wrong password look the same
    /// to the caller.
    pub async fn login(&self, email: &str, password: &str) -> DbResult<User> {
        let email = email.trim();
        let record = self
            .load()
            .await?
            .into_iter()
            .find(|record| record.user.email.eq_ignore_ascii_case(email));

        match record {
            Some(record) if verify_password(password, &record.password_hash) => {
                info!(user_id = %record.user.id, "User logged in");
                Ok(record.user)
            }
            _ => {
                warn!(email = %email, "Failed login attempt");
                Err(CoreError::InvalidCredentials.into())
            }
        }
    }

    /// Creates the initial administrator if no admin account exists yet.
    ///
    /// Returns the new account, or `None` when an admin was already there.
    pub async fn ensure_default_admin(&self, password: &str) -> DbResult<Option<User>> {
        validate_password(password)?;

        let _guard = self.ctx.locks.for_collection(Collection::Users).lock().await;

        let mut records = self.load().await?;
        if records.iter().any(|record| record.user.is_admin()) {
            return Ok(None);
        }

        let admin = self.push_record(
            &mut records,
            DEFAULT_ADMIN_EMAIL.to_string(),
            DEFAULT_ADMIN_NAME.to_string(),
            password,
            UserRole::Admin,
        )?;
        save_records(self.ctx.store.as_ref(), Collection::Users, &records).await?;

        info!(user_id = %admin.id, email = %admin.email, "Default admin account created");
        Ok(Some(admin))
    }

    async fn insert(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: UserRole,
        confirmation: Option<&str>,
    ) -> DbResult<User> {
        let name = validate_name(name)?;
        let email = validate_email(email)?;
        validate_password(password)?;
        if let Some(confirmation) = confirmation {
            validate_password_confirmation(password, confirmation)?;
        }

        let _guard = self.ctx.locks.for_collection(Collection::Users).lock().await;

        let mut records = self.load().await?;
        let user = self.push_record(&mut records, email, name, password, role)?;
        save_records(self.ctx.store.as_ref(), Collection::Users, &records).await?;

        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Appends a new account to `records`. Callers hold the users lock.
    fn push_record(
        &self,
        records: &mut Vec<UserRecord>,
        email: String,
        name: String,
        password: &str,
        role: UserRole,
    ) -> DbResult<User> {
        if records
            .iter()
            .any(|record| record.user.email.eq_ignore_ascii_case(&email))
        {
            return Err(ValidationError::Duplicate {
                field: "email".to_string(),
                value: email,
            }
            .into());
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            name,
            role,
            created_at: self.ctx.clock.now(),
        };
        records.push(UserRecord {
            user: user.clone(),
            password_hash: hash_password(password)?,
        });
        Ok(user)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
