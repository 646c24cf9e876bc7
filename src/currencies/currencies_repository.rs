use std::collections::HashSet;
use std::sync::Arc;

use diesel::prelude::*;
use log::debug;

use super::currencies_model::{
    canonical_code, Currency, CurrencyDB, CurrencyUpdate, CurrencyWithSubscription, NewCurrency,
};
use super::currencies_traits::CurrencyRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::errors::{Error, Result, ValidationError};
use crate::schema::{currencies, subscriptions};

/// Repository for managing currency records
pub struct CurrencyRepository {
    pool: Arc<DbPool>,
}

impl CurrencyRepository {
    /// Creates a new CurrencyRepository instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl CurrencyRepositoryTrait for CurrencyRepository {
    fn create(&self, new_currency: NewCurrency) -> Result<Currency> {
        new_currency.validate()?;
        let code = canonical_code(&new_currency.char_code);

        // Check-then-insert: the code lookup is case-insensitive, so this also
        // covers lower-cased duplicates before the unique index would.
        if self.get_by_code(&code)?.is_some() {
            return Err(Error::Conflict(format!(
                "Currency with code {} already exists",
                code
            )));
        }

        let mut conn = get_connection(&self.pool)?;
        let row: CurrencyDB = diesel::insert_into(currencies::table)
            .values((
                currencies::num_code.eq(new_currency.num_code.trim()),
                currencies::char_code.eq(&code),
                currencies::name.eq(new_currency.name.trim()),
                currencies::value.eq(new_currency.value),
                currencies::nominal.eq(new_currency.nominal),
                currencies::created_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .get_result(&mut conn)?;

        debug!("Created currency {} with id {}", row.char_code, row.id);
        Ok(row.into())
    }

    fn list(&self) -> Result<Vec<Currency>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = currencies::table
            .order(currencies::id.asc())
            .load::<CurrencyDB>(&mut conn)?;
        Ok(rows.into_iter().map(Currency::from).collect())
    }

    fn get_by_id(&self, currency_id: i32) -> Result<Option<Currency>> {
        let mut conn = get_connection(&self.pool)?;
        let row = currencies::table
            .find(currency_id)
            .first::<CurrencyDB>(&mut conn)
            .optional()?;
        Ok(row.map(Currency::from))
    }

    fn get_by_code(&self, code: &str) -> Result<Option<Currency>> {
        let mut conn = get_connection(&self.pool)?;
        let row = currencies::table
            .filter(currencies::char_code.eq(canonical_code(code)))
            .first::<CurrencyDB>(&mut conn)
            .optional()?;
        Ok(row.map(Currency::from))
    }

    fn update(&self, currency_id: i32, update: CurrencyUpdate) -> Result<Currency> {
        update.validate()?;

        let mut conn = get_connection(&self.pool)?;
        let row: CurrencyDB = diesel::update(currencies::table.find(currency_id))
            .set((
                currencies::num_code.eq(update.num_code.trim()),
                currencies::char_code.eq(canonical_code(&update.char_code)),
                currencies::name.eq(update.name.trim()),
                currencies::value.eq(update.value),
                currencies::nominal.eq(update.nominal),
            ))
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    Error::NotFound(format!("Currency with id {} not found", currency_id))
                }
                other => Error::from(other),
            })?;
        Ok(row.into())
    }

    fn update_rate_by_code(&self, code: &str, new_value: f64) -> Result<Currency> {
        if new_value <= 0.0 {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Exchange rate must be positive".to_string(),
            )));
        }

        let code = canonical_code(code);
        let mut conn = get_connection(&self.pool)?;
        let row: CurrencyDB =
            diesel::update(currencies::table.filter(currencies::char_code.eq(&code)))
                .set(currencies::value.eq(new_value))
                .get_result(&mut conn)
                .map_err(|e| match e {
                    diesel::result::Error::NotFound => {
                        Error::NotFound(format!("Currency with code {} not found", code))
                    }
                    other => Error::from(other),
                })?;

        debug!("Updated rate for {} to {}", code, new_value);
        Ok(row.into())
    }

    fn delete(&self, currency_id: i32) -> Result<()> {
        let existing = self.get_by_id(currency_id)?.ok_or_else(|| {
            Error::NotFound(format!("Currency with id {} not found", currency_id))
        })?;

        let mut conn = get_connection(&self.pool)?;
        // Dependent subscription rows go with the currency via the schema cascade.
        diesel::delete(currencies::table.find(currency_id)).execute(&mut conn)?;

        debug!("Deleted currency {}", existing.char_code);
        Ok(())
    }

    fn count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(currencies::table.count().get_result(&mut conn)?)
    }

    fn list_subscribed_by_user(&self, user_id: i32) -> Result<Vec<Currency>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = currencies::table
            .inner_join(subscriptions::table)
            .filter(subscriptions::user_id.eq(user_id))
            .select(CurrencyDB::as_select())
            .order(currencies::char_code.asc())
            .load::<CurrencyDB>(&mut conn)?;
        Ok(rows.into_iter().map(Currency::from).collect())
    }

    fn list_with_subscription_flag(
        &self,
        user_id: Option<i32>,
    ) -> Result<Vec<CurrencyWithSubscription>> {
        let all = self.list()?;
        let subscribed_ids: HashSet<i32> = match user_id {
            Some(uid) => self
                .list_subscribed_by_user(uid)?
                .into_iter()
                .map(|c| c.id)
                .collect(),
            None => HashSet::new(),
        };

        Ok(all
            .into_iter()
            .map(|currency| {
                let is_subscribed = subscribed_ids.contains(&currency.id);
                CurrencyWithSubscription {
                    currency,
                    is_subscribed,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations};
    use crate::users::{NewUser, UserRepository, UserRepositoryTrait};
    use tempfile::TempDir;

    fn create_test_repository() -> (CurrencyRepository, Arc<DbPool>, TempDir) {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db").to_string_lossy().to_string();

        let pool = create_pool(&db_path).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");

        let repo = CurrencyRepository::new(Arc::clone(&pool));
        (repo, pool, temp_dir)
    }

    fn usd() -> NewCurrency {
        NewCurrency {
            num_code: "840".to_string(),
            char_code: "USD".to_string(),
            name: "US Dollar".to_string(),
            value: 90.0,
            nominal: 1,
        }
    }

    fn eur() -> NewCurrency {
        NewCurrency {
            num_code: "978".to_string(),
            char_code: "EUR".to_string(),
            name: "Euro".to_string(),
            value: 91.0,
            nominal: 1,
        }
    }

    fn create_test_user(pool: &Arc<DbPool>, name: &str) -> i32 {
        let repo = UserRepository::new(Arc::clone(pool));
        repo.create(NewUser {
            name: name.to_string(),
        })
        .expect("Failed to create test user")
        .id
    }

    #[test]
    fn create_then_get_by_code_returns_equal_fields() {
        let (repo, _pool, _temp_dir) = create_test_repository();

        let created = repo.create(usd()).expect("Failed to create currency");
        let fetched = repo
            .get_by_code("usd")
            .expect("Failed to fetch currency")
            .expect("Currency should exist");

        assert_eq!(fetched, created);
        assert_eq!(fetched.num_code, "840");
        assert_eq!(fetched.char_code, "USD");
        assert_eq!(fetched.name, "US Dollar");
        assert_eq!(fetched.value, 90.0);
        assert_eq!(fetched.nominal, 1);
    }

    #[test]
    fn lowercase_input_code_is_stored_canonically() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        let mut input = usd();
        input.char_code = " usd ".to_string();

        let created = repo.create(input).unwrap();
        assert_eq!(created.char_code, "USD");
    }

    #[test]
    fn duplicate_code_is_rejected_without_writing() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        repo.create(usd()).unwrap();

        let mut duplicate = usd();
        duplicate.char_code = "usd".to_string();
        duplicate.value = 123.0;

        let result = repo.create(duplicate);
        assert!(matches!(result, Err(Error::Conflict(_))));
        assert_eq!(repo.count().unwrap(), 1);
        // The surviving record is the original one.
        assert_eq!(repo.get_by_code("USD").unwrap().unwrap().value, 90.0);
    }

    #[test]
    fn invalid_code_length_is_rejected_without_writing() {
        let (repo, _pool, _temp_dir) = create_test_repository();

        let mut bad = usd();
        bad.char_code = "USDT".to_string();
        let result = repo.create(bad);

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn list_is_ordered_by_id() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        repo.create(usd()).unwrap();
        repo.create(eur()).unwrap();

        let codes: Vec<String> = repo
            .list()
            .unwrap()
            .into_iter()
            .map(|c| c.char_code)
            .collect();
        assert_eq!(codes, ["USD", "EUR"]);
    }

    #[test]
    fn update_replaces_all_fields() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        let created = repo.create(usd()).unwrap();

        let updated = repo
            .update(
                created.id,
                CurrencyUpdate {
                    num_code: "841".to_string(),
                    char_code: "usn".to_string(),
                    name: "US Dollar (Next day)".to_string(),
                    value: 89.5,
                    nominal: 1,
                },
            )
            .expect("Failed to update currency");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.num_code, "841");
        assert_eq!(updated.char_code, "USN");
        assert_eq!(updated.value, 89.5);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn update_rate_by_code_changes_only_the_value() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        let created = repo.create(usd()).unwrap();

        let updated = repo
            .update_rate_by_code("usd", 95.0)
            .expect("Failed to update rate");
        assert_eq!(updated.value, 95.0);

        let fetched = repo.get_by_code("USD").unwrap().unwrap();
        assert_eq!(fetched.value, 95.0);
        assert_eq!(fetched.num_code, created.num_code);
        assert_eq!(fetched.char_code, created.char_code);
        assert_eq!(fetched.name, created.name);
        assert_eq!(fetched.nominal, created.nominal);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[test]
    fn update_rate_for_unknown_code_is_not_found() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        let result = repo.update_rate_by_code("XXX", 95.0);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn update_rate_rejects_non_positive_values() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        repo.create(usd()).unwrap();

        let result = repo.update_rate_by_code("USD", -1.0);
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(repo.get_by_code("USD").unwrap().unwrap().value, 90.0);
    }

    #[test]
    fn delete_of_unknown_currency_is_not_found() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        assert!(matches!(repo.delete(42), Err(Error::NotFound(_))));
    }

    #[test]
    fn deleting_a_currency_cascades_to_subscriptions() {
        let (repo, pool, _temp_dir) = create_test_repository();
        let currency = repo.create(usd()).unwrap();
        let user_id = create_test_user(&pool, "Alice");

        let users = UserRepository::new(Arc::clone(&pool));
        users.add_subscription(user_id, currency.id).unwrap();
        assert_eq!(users.subscription_count(user_id).unwrap(), 1);

        repo.delete(currency.id).expect("Failed to delete currency");

        assert_eq!(users.subscription_count(user_id).unwrap(), 0);
        assert_eq!(users.total_subscription_count().unwrap(), 0);
    }

    #[test]
    fn count_tracks_inserts() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        assert_eq!(repo.count().unwrap(), 0);

        repo.create(usd()).unwrap();
        repo.create(eur()).unwrap();
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn subscribed_currencies_are_ordered_by_code() {
        let (repo, pool, _temp_dir) = create_test_repository();
        let usd_id = repo.create(usd()).unwrap().id;
        let eur_id = repo.create(eur()).unwrap().id;
        let user_id = create_test_user(&pool, "Alice");

        let users = UserRepository::new(Arc::clone(&pool));
        users.add_subscription(user_id, usd_id).unwrap();
        users.add_subscription(user_id, eur_id).unwrap();

        let codes: Vec<String> = repo
            .list_subscribed_by_user(user_id)
            .unwrap()
            .into_iter()
            .map(|c| c.char_code)
            .collect();
        assert_eq!(codes, ["EUR", "USD"]);
    }

    #[test]
    fn subscription_flag_reflects_the_given_user() {
        let (repo, pool, _temp_dir) = create_test_repository();
        let usd_id = repo.create(usd()).unwrap().id;
        repo.create(eur()).unwrap();
        let user_id = create_test_user(&pool, "Alice");

        let users = UserRepository::new(Arc::clone(&pool));
        users.add_subscription(user_id, usd_id).unwrap();

        let flagged = repo.list_with_subscription_flag(Some(user_id)).unwrap();
        assert_eq!(flagged.len(), 2);
        for entry in &flagged {
            assert_eq!(entry.is_subscribed, entry.currency.id == usd_id);
        }

        // Without a user the flag is false across the board.
        let anonymous = repo.list_with_subscription_flag(None).unwrap();
        assert!(anonymous.iter().all(|entry| !entry.is_subscribed));
    }
}
