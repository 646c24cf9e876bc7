use std::sync::Arc;

use diesel::prelude::*;
use log::info;

use super::{DbConnection, DbPool, DbTransactionExecutor};
use crate::errors::{Error, Result};
use crate::schema::{currencies, subscriptions, users};

const BASELINE_USERS: [&str; 3] = ["Alexey Petrov", "Daniil Kozlov", "Angelina Ivanchenko"];

/// (num_code, char_code, name, value, nominal)
const BASELINE_CURRENCIES: [(&str, &str, &str, f64, i32); 6] = [
    ("840", "USD", "US Dollar", 90.0, 1),
    ("978", "EUR", "Euro", 91.0, 1),
    ("156", "CNY", "Chinese Yuan", 12.5, 1),
    ("826", "GBP", "Pound Sterling", 115.0, 1),
    ("392", "JPY", "Japanese Yen", 0.6, 100),
    ("398", "KZT", "Kazakhstani Tenge", 0.2, 100),
];

/// Baseline subscriptions as (user position in id order, currency code)
const BASELINE_SUBSCRIPTIONS: [(usize, &str); 5] =
    [(0, "USD"), (0, "EUR"), (1, "CNY"), (2, "USD"), (2, "GBP")];

/// Seeds baseline users, currencies and subscriptions exactly once.
///
/// Guarded by row counts on `users` and `currencies` so reopening an existing
/// database never duplicates seed rows. The whole batch commits or rolls back
/// as a single transaction.
pub fn seed_baseline_data(pool: &Arc<DbPool>) -> Result<()> {
    pool.execute(|conn: &mut DbConnection| -> Result<()> {
        let user_count: i64 = users::table.count().get_result(conn).map_err(Error::from)?;
        let currency_count: i64 = currencies::table
            .count()
            .get_result(conn)
            .map_err(Error::from)?;

        if user_count > 0 && currency_count > 0 {
            info!("Baseline data already present, skipping seed");
            return Ok(());
        }

        info!("Inserting baseline data");

        for name in BASELINE_USERS {
            diesel::insert_into(users::table)
                .values(users::name.eq(name))
                .execute(conn)
                .map_err(Error::from)?;
        }

        let now = chrono::Utc::now().naive_utc();
        for (num_code, char_code, name, value, nominal) in BASELINE_CURRENCIES {
            diesel::insert_into(currencies::table)
                .values((
                    currencies::num_code.eq(num_code),
                    currencies::char_code.eq(char_code),
                    currencies::name.eq(name),
                    currencies::value.eq(value),
                    currencies::nominal.eq(nominal),
                    currencies::created_at.eq(now),
                ))
                .on_conflict_do_nothing()
                .execute(conn)
                .map_err(Error::from)?;
        }

        let currency_ids: Vec<(i32, String)> = currencies::table
            .select((currencies::id, currencies::char_code))
            .load(conn)
            .map_err(Error::from)?;
        let user_ids: Vec<i32> = users::table
            .select(users::id)
            .order(users::id.asc())
            .load(conn)
            .map_err(Error::from)?;

        if user_ids.len() >= BASELINE_USERS.len() {
            for (user_pos, code) in BASELINE_SUBSCRIPTIONS {
                let currency_id = currency_ids
                    .iter()
                    .find(|(_, char_code)| char_code == code)
                    .map(|(id, _)| *id);

                if let Some(currency_id) = currency_id {
                    diesel::insert_into(subscriptions::table)
                        .values((
                            subscriptions::user_id.eq(user_ids[user_pos]),
                            subscriptions::currency_id.eq(currency_id),
                        ))
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .map_err(Error::from)?;
                }
            }
        }

        Ok(())
    })
}
