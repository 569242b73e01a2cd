//! SQLite-backed [`UserRepository`] implementation.

use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use tracing::debug;

use crate::domain::accounts::{AccountProfile, NewAccount};
use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::UserId;

use super::models::NewUserRow;
use super::pool::{DbConnection, DbPool};
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConnection, UserRepositoryError> {
        self.pool
            .get()
            .map_err(|err| UserRepositoryError::connection(err.to_string()))
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    if let diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = &error {
        return UserRepositoryError::DuplicateEmail;
    }
    debug!(error = %error, "user store operation failed");
    UserRepositoryError::query(error.to_string())
}

impl UserRepository for DieselUserRepository {
    fn create(&self, account: &NewAccount) -> Result<UserId, UserRepositoryError> {
        let mut conn = self.conn()?;
        let id = diesel::insert_into(users::table)
            .values(&NewUserRow {
                name: &account.name,
                email: &account.email,
                password_digest: &account.password_digest,
                gender: account.gender.as_str(),
            })
            .returning(users::id)
            .get_result::<i64>(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(UserId::new(id))
    }

    fn find_by_credentials(
        &self,
        email: &str,
        password_digest: &str,
    ) -> Result<Option<AccountProfile>, UserRepositoryError> {
        let mut conn = self.conn()?;
        let row: Option<(i64, String)> = users::table
            .filter(users::email.eq(email))
            .filter(users::password_digest.eq(password_digest))
            .select((users::id, users::name))
            .first(&mut conn)
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|(id, name)| AccountProfile {
            id: UserId::new(id),
            name,
        }))
    }

    fn exists(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self.conn()?;
        diesel::select(exists(users::table.filter(users::id.eq(id.get()))))
            .get_result(&mut conn)
            .map_err(map_diesel_error)
    }
}
