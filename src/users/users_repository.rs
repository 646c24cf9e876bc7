use std::sync::Arc;

use diesel::prelude::*;
use log::debug;

use super::users_model::{NewUser, User, UserDB, UserUpdate};
use super::users_traits::UserRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::errors::{Error, Result};
use crate::schema::{subscriptions, users};

/// Repository for managing user records and their subscriptions
pub struct UserRepository {
    pool: Arc<DbPool>,
}

impl UserRepository {
    /// Creates a new UserRepository instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl UserRepositoryTrait for UserRepository {
    fn create(&self, new_user: NewUser) -> Result<User> {
        new_user.validate()?;

        let mut conn = get_connection(&self.pool)?;
        let user: UserDB = diesel::insert_into(users::table)
            .values(users::name.eq(new_user.name.trim()))
            .get_result(&mut conn)?;

        debug!("Created user '{}' with id {}", user.name, user.id);
        Ok(user.into())
    }

    fn list(&self) -> Result<Vec<User>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = users::table
            .order(users::id.asc())
            .load::<UserDB>(&mut conn)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    fn get_by_id(&self, user_id: i32) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let row = users::table
            .find(user_id)
            .first::<UserDB>(&mut conn)
            .optional()?;
        Ok(row.map(User::from))
    }

    fn update(&self, user_id: i32, update: UserUpdate) -> Result<User> {
        update.validate()?;

        let mut conn = get_connection(&self.pool)?;
        let user: UserDB = diesel::update(users::table.find(user_id))
            .set(users::name.eq(update.name.trim()))
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    Error::NotFound(format!("User with id {} not found", user_id))
                }
                other => Error::from(other),
            })?;
        Ok(user.into())
    }

    fn delete(&self, user_id: i32) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        // Dependent subscription rows go with the user via the schema cascade.
        let affected = diesel::delete(users::table.find(user_id)).execute(&mut conn)?;

        if affected == 0 {
            return Err(Error::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }

        debug!("Deleted user {}", user_id);
        Ok(())
    }

    fn count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(users::table.count().get_result(&mut conn)?)
    }

    fn subscription_count(&self, user_id: i32) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)?)
    }

    fn total_subscription_count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(subscriptions::table.count().get_result(&mut conn)?)
    }

    fn add_subscription(&self, user_id: i32, currency_id: i32) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let inserted = diesel::insert_into(subscriptions::table)
            .values((
                subscriptions::user_id.eq(user_id),
                subscriptions::currency_id.eq(currency_id),
            ))
            .on_conflict_do_nothing()
            .execute(&mut conn)?;

        if inserted == 0 {
            debug!(
                "User {} is already subscribed to currency {}",
                user_id, currency_id
            );
        }
        Ok(inserted > 0)
    }

    fn remove_subscription(&self, user_id: i32, currency_id: i32) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let affected = diesel::delete(
            subscriptions::table
                .filter(subscriptions::user_id.eq(user_id))
                .filter(subscriptions::currency_id.eq(currency_id)),
        )
        .execute(&mut conn)?;

        if affected > 0 {
            debug!(
                "Removed subscription: user {} -> currency {}",
                user_id, currency_id
            );
        }
        Ok(affected > 0)
    }
}
