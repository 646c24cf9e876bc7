use super::currencies_model::{Currency, CurrencyUpdate, CurrencyWithSubscription, NewCurrency};
use crate::errors::Result;

/// Trait defining the contract for currency repository operations.
pub trait CurrencyRepositoryTrait: Send + Sync {
    /// Rejects duplicate codes (case-insensitive) before touching the store.
    fn create(&self, new_currency: NewCurrency) -> Result<Currency>;
    fn list(&self) -> Result<Vec<Currency>>;
    fn get_by_id(&self, currency_id: i32) -> Result<Option<Currency>>;
    fn get_by_code(&self, code: &str) -> Result<Option<Currency>>;
    fn update(&self, currency_id: i32, update: CurrencyUpdate) -> Result<Currency>;
    /// Partial update of the exchange rate only, used for rate refreshes.
    fn update_rate_by_code(&self, code: &str, new_value: f64) -> Result<Currency>;
    fn delete(&self, currency_id: i32) -> Result<()>;
    fn count(&self) -> Result<i64>;
    fn list_subscribed_by_user(&self, user_id: i32) -> Result<Vec<Currency>>;
    fn list_with_subscription_flag(
        &self,
        user_id: Option<i32>,
    ) -> Result<Vec<CurrencyWithSubscription>>;
}

/// Trait defining the contract for currency service operations.
pub trait CurrencyServiceTrait: Send + Sync {
    fn create_currency(&self, new_currency: NewCurrency) -> Result<Currency>;
    fn get_currencies(&self) -> Result<Vec<Currency>>;
    fn get_currency(&self, currency_id: i32) -> Result<Option<Currency>>;
    fn get_currency_by_code(&self, code: &str) -> Result<Option<Currency>>;
    fn update_currency(&self, currency_id: i32, update: CurrencyUpdate) -> Result<Currency>;
    fn update_rate(&self, code: &str, new_value: f64) -> Result<Currency>;
    fn delete_currency(&self, currency_id: i32) -> Result<()>;
    fn currency_count(&self) -> Result<i64>;
    fn get_subscribed_currencies(&self, user_id: i32) -> Result<Vec<Currency>>;
    fn get_currencies_with_subscription_flag(
        &self,
        user_id: Option<i32>,
    ) -> Result<Vec<CurrencyWithSubscription>>;
}
