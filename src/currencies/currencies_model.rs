use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Canonical form of a currency code: trimmed and upper-cased.
///
/// All code lookups and the uniqueness check in `create` go through this, so
/// "usd" and "USD" name the same currency.
pub fn canonical_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Domain model representing a tracked currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub id: i32,
    pub num_code: String,
    pub char_code: String,
    pub name: String,
    pub value: f64,
    pub nominal: i32,
    pub created_at: NaiveDateTime,
}

impl Currency {
    /// Exchange rate for a single unit of the currency.
    pub fn value_per_unit(&self) -> f64 {
        self.value / self.nominal as f64
    }
}

/// Input model for creating a new currency
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCurrency {
    pub num_code: String,
    pub char_code: String,
    pub name: String,
    pub value: f64,
    pub nominal: i32,
}

impl NewCurrency {
    /// Validates the new currency data
    pub fn validate(&self) -> Result<()> {
        validate_currency_fields(&self.char_code, &self.name, self.value, self.nominal)
    }
}

/// Input model for a full field replace of an existing currency
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyUpdate {
    pub num_code: String,
    pub char_code: String,
    pub name: String,
    pub value: f64,
    pub nominal: i32,
}

impl CurrencyUpdate {
    /// Validates the currency update data
    pub fn validate(&self) -> Result<()> {
        validate_currency_fields(&self.char_code, &self.name, self.value, self.nominal)
    }
}

fn validate_currency_fields(char_code: &str, name: &str, value: f64, nominal: i32) -> Result<()> {
    if char_code.trim().chars().count() != 3 {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Currency code must be exactly 3 characters".to_string(),
        )));
    }
    if name.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            "name".to_string(),
        )));
    }
    if value <= 0.0 {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Exchange rate must be positive".to_string(),
        )));
    }
    if nominal < 1 {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Nominal must be at least 1".to_string(),
        )));
    }
    Ok(())
}

/// Currency annotated with the subscription flag for a given user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyWithSubscription {
    #[serde(flatten)]
    pub currency: Currency,
    pub is_subscribed: bool,
}

/// Database model for currencies
#[derive(Queryable, Identifiable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::currencies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CurrencyDB {
    pub id: i32,
    pub num_code: String,
    pub char_code: String,
    pub name: String,
    pub value: f64,
    pub nominal: i32,
    pub created_at: NaiveDateTime,
}

impl From<CurrencyDB> for Currency {
    fn from(db: CurrencyDB) -> Self {
        Self {
            id: db.id,
            num_code: db.num_code,
            char_code: db.char_code,
            name: db.name,
            value: db.value,
            nominal: db.nominal,
            created_at: db.created_at,
        }
    }
}
