use std::sync::Arc;

use super::users_model::{NewUser, User, UserUpdate};
use super::users_repository::UserRepository;
use super::users_traits::{UserRepositoryTrait, UserServiceTrait};
use crate::db::DbPool;
use crate::errors::Result;

/// Service exposing user and subscription operations to the presentation layer
pub struct UserService {
    repository: UserRepository,
}

impl UserService {
    /// Creates a new UserService instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self {
            repository: UserRepository::new(pool),
        }
    }
}

impl UserServiceTrait for UserService {
    fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.repository.create(new_user)
    }

    fn get_users(&self) -> Result<Vec<User>> {
        self.repository.list()
    }

    fn get_user(&self, user_id: i32) -> Result<Option<User>> {
        self.repository.get_by_id(user_id)
    }

    fn update_user(&self, user_id: i32, update: UserUpdate) -> Result<User> {
        self.repository.update(user_id, update)
    }

    fn delete_user(&self, user_id: i32) -> Result<()> {
        self.repository.delete(user_id)
    }

    fn user_count(&self) -> Result<i64> {
        self.repository.count()
    }

    fn subscription_count(&self, user_id: i32) -> Result<i64> {
        self.repository.subscription_count(user_id)
    }

    fn total_subscription_count(&self) -> Result<i64> {
        self.repository.total_subscription_count()
    }

    fn add_subscription(&self, user_id: i32, currency_id: i32) -> Result<bool> {
        self.repository.add_subscription(user_id, currency_id)
    }

    fn remove_subscription(&self, user_id: i32, currency_id: i32) -> Result<bool> {
        self.repository.remove_subscription(user_id, currency_id)
    }
}
