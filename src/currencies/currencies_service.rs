use std::sync::Arc;

use super::currencies_model::{Currency, CurrencyUpdate, CurrencyWithSubscription, NewCurrency};
use super::currencies_repository::CurrencyRepository;
use super::currencies_traits::{CurrencyRepositoryTrait, CurrencyServiceTrait};
use crate::db::DbPool;
use crate::errors::Result;

/// Service exposing currency operations to the presentation layer
pub struct CurrencyService {
    repository: CurrencyRepository,
}

impl CurrencyService {
    /// Creates a new CurrencyService instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self {
            repository: CurrencyRepository::new(pool),
        }
    }
}

impl CurrencyServiceTrait for CurrencyService {
    fn create_currency(&self, new_currency: NewCurrency) -> Result<Currency> {
        self.repository.create(new_currency)
    }

    fn get_currencies(&self) -> Result<Vec<Currency>> {
        self.repository.list()
    }

    fn get_currency(&self, currency_id: i32) -> Result<Option<Currency>> {
        self.repository.get_by_id(currency_id)
    }

    fn get_currency_by_code(&self, code: &str) -> Result<Option<Currency>> {
        self.repository.get_by_code(code)
    }

    fn update_currency(&self, currency_id: i32, update: CurrencyUpdate) -> Result<Currency> {
        self.repository.update(currency_id, update)
    }

    fn update_rate(&self, code: &str, new_value: f64) -> Result<Currency> {
        self.repository.update_rate_by_code(code, new_value)
    }

    fn delete_currency(&self, currency_id: i32) -> Result<()> {
        self.repository.delete(currency_id)
    }

    fn currency_count(&self) -> Result<i64> {
        self.repository.count()
    }

    fn get_subscribed_currencies(&self, user_id: i32) -> Result<Vec<Currency>> {
        self.repository.list_subscribed_by_user(user_id)
    }

    fn get_currencies_with_subscription_flag(
        &self,
        user_id: Option<i32>,
    ) -> Result<Vec<CurrencyWithSubscription>> {
        self.repository.list_with_subscription_flag(user_id)
    }
}
