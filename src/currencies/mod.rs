// Module declarations
pub(crate) mod currencies_model;
pub(crate) mod currencies_repository;
pub(crate) mod currencies_service;
pub(crate) mod currencies_traits;

// Re-export the public interface
pub use currencies_model::{
    canonical_code, Currency, CurrencyDB, CurrencyUpdate, CurrencyWithSubscription, NewCurrency,
};
pub use currencies_repository::CurrencyRepository;
pub use currencies_service::CurrencyService;
pub use currencies_traits::{CurrencyRepositoryTrait, CurrencyServiceTrait};
