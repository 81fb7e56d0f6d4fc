//! Admin user repository for database operations.
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate compiles
//! without a live database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use admin_console_core::{AdminUserId, Email};

use super::RepositoryError;
use crate::models::admin_user::{AdminUser, AdminUserWithPassword};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `admin_users` queries that never read the password.
#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    first_name: String,
    last_name: String,
    email: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: AdminUserId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            is_admin: row.is_admin,
            created_at: row.created_at,
        })
    }
}

/// Internal row type for the login lookup, which needs the stored hash.
#[derive(sqlx::FromRow)]
struct AdminUserPasswordRow {
    #[sqlx(flatten)]
    user: AdminUserRow,
    password: String,
}

impl TryFrom<AdminUserPasswordRow> for AdminUserWithPassword {
    type Error = RepositoryError;

    fn try_from(row: AdminUserPasswordRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user: row.user.try_into()?,
            password_hash: row.password,
        })
    }
}

// =============================================================================
// Input Types
// =============================================================================

/// Fields for a new `admin_users` row. `password_hash` must already be hashed.
#[derive(Clone)]
pub struct NewAdminUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password_hash: String,
    pub is_admin: bool,
}

impl std::fmt::Debug for NewAdminUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAdminUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

// =============================================================================
// Repository
// =============================================================================

const USER_COLUMNS: &str = "id, first_name, last_name, email, is_admin, created_at";

/// Repository for admin user database operations.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new admin user.
    ///
    /// A single `INSERT`; uniqueness is enforced by the `admin_users_email_key`
    /// constraint, so two concurrent registrations cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewAdminUser) -> Result<AdminUser, RepositoryError> {
        let sql = format!(
            "INSERT INTO admin_users (first_name, last_name, email, password, is_admin) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        );

        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(new_user.is_admin)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_insert(e, "user already exists"))?;

        row.try_into()
    }

    /// Get an admin user and their password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<AdminUserWithPassword>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS}, password FROM admin_users WHERE email = $1");

        let row = sqlx::query_as::<_, AdminUserPasswordRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an admin user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM admin_users WHERE id = $1");

        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all admin users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM admin_users ORDER BY id ASC");

        let rows = sqlx::query_as::<_, AdminUserRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Count admin users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Delete an admin user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: AdminUserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM admin_users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
