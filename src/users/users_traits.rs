use super::users_model::{NewUser, User, UserUpdate};
use crate::errors::Result;

/// Trait defining the contract for user repository operations.
pub trait UserRepositoryTrait: Send + Sync {
    fn create(&self, new_user: NewUser) -> Result<User>;
    fn list(&self) -> Result<Vec<User>>;
    fn get_by_id(&self, user_id: i32) -> Result<Option<User>>;
    fn update(&self, user_id: i32, update: UserUpdate) -> Result<User>;
    fn delete(&self, user_id: i32) -> Result<()>;
    fn count(&self) -> Result<i64>;
    fn subscription_count(&self, user_id: i32) -> Result<i64>;
    fn total_subscription_count(&self) -> Result<i64>;
    /// Idempotent subscribe. `Ok(true)` when a row was inserted, `Ok(false)`
    /// when the pair already existed.
    fn add_subscription(&self, user_id: i32, currency_id: i32) -> Result<bool>;
    /// `Ok(true)` when a row was deleted, `Ok(false)` when no such
    /// subscription existed.
    fn remove_subscription(&self, user_id: i32, currency_id: i32) -> Result<bool>;
}

/// Trait defining the contract for user service operations.
pub trait UserServiceTrait: Send + Sync {
    fn create_user(&self, new_user: NewUser) -> Result<User>;
    fn get_users(&self) -> Result<Vec<User>>;
    fn get_user(&self, user_id: i32) -> Result<Option<User>>;
    fn update_user(&self, user_id: i32, update: UserUpdate) -> Result<User>;
    fn delete_user(&self, user_id: i32) -> Result<()>;
    fn user_count(&self) -> Result<i64>;
    fn subscription_count(&self, user_id: i32) -> Result<i64>;
    fn total_subscription_count(&self) -> Result<i64>;
    fn add_subscription(&self, user_id: i32, currency_id: i32) -> Result<bool>;
    fn remove_subscription(&self, user_id: i32, currency_id: i32) -> Result<bool>;
}
