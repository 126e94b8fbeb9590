use chrono::NaiveDate;
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{MonthDate, NewSubscription, Subscription, TotalCostFilter};

/// Raw row shape of the `subscriptions` table. Month columns are stored as
/// the first day of the month and truncated back on the way out.
#[derive(Debug, FromRow)]
struct SubscriptionRow {
    id: Uuid,
    service_name: String,
    price: i32,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            id: row.id,
            service_name: row.service_name,
            price: row.price,
            user_id: row.user_id,
            start_date: MonthDate::from(row.start_date),
            end_date: row.end_date.map(MonthDate::from),
        }
    }
}

#[derive(Clone)]
pub struct SubscriptionService {
    pool: DbPool,
}

impl SubscriptionService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewSubscription) -> AppResult<Subscription> {
        let sub = Subscription {
            id: Uuid::new_v4(),
            service_name: new.service_name,
            price: new.price,
            user_id: new.user_id,
            start_date: new.start_date,
            end_date: new.end_date,
        };

        sqlx::query(
            "INSERT INTO subscriptions (id, service_name, price, user_id, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(sub.id)
        .bind(&sub.service_name)
        .bind(sub.price)
        .bind(sub.user_id)
        .bind(sub.start_date.first_day())
        .bind(sub.end_date.map(|d| d.first_day()))
        .execute(&self.pool)
        .await?;

        log::info!("created subscription {} for user {}", sub.id, sub.user_id);
        Ok(sub)
    }

    pub async fn get_all(&self) -> AppResult<Vec<Subscription>> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(
            "SELECT id, service_name, price, user_id, start_date, end_date FROM subscriptions",
        )
        .fetch_all(&self.pool)
        .await?;

        log::info!("retrieved {} subscriptions", rows.len());
        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Subscription> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            "SELECT id, service_name, price, user_id, start_date, end_date FROM subscriptions \
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Subscription::from)
            .ok_or_else(|| AppError::NotFound(format!("subscription {id} not found")))
    }

    /// Replaces every field except the id. An unknown id is reported as
    /// `NotFound` rather than silently succeeding.
    pub async fn update(&self, id: Uuid, new: NewSubscription) -> AppResult<Subscription> {
        let result = sqlx::query(
            "UPDATE subscriptions \
             SET service_name = $1, price = $2, user_id = $3, start_date = $4, end_date = $5 \
             WHERE id = $6",
        )
        .bind(&new.service_name)
        .bind(new.price)
        .bind(new.user_id)
        .bind(new.start_date.first_day())
        .bind(new.end_date.map(|d| d.first_day()))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("subscription {id} not found")));
        }

        log::info!("updated subscription {id}");
        Ok(Subscription {
            id,
            service_name: new.service_name,
            price: new.price,
            user_id: new.user_id,
            start_date: new.start_date,
            end_date: new.end_date,
        })
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("subscription {id} not found")));
        }

        log::info!("deleted subscription {id}");
        Ok(())
    }

    /// Sums the prices of subscriptions whose start month falls inside the
    /// inclusive `[from, to]` range, narrowed by whichever filters were
    /// supplied. No matches is a total of 0, not an error.
    pub async fn total_cost(&self, filter: &TotalCostFilter) -> AppResult<i64> {
        log::info!(
            "calculating total cost for {} to {} (user: {:?}, service: {:?})",
            filter.from,
            filter.to,
            filter.user_id,
            filter.service_name
        );

        let mut query = build_total_cost_query(filter);
        let total: i64 = query.build_query_scalar().fetch_one(&self.pool).await?;

        log::info!("total cost is {total}");
        Ok(total)
    }
}

/// Starts from the fixed range predicate on `start_date` and appends one
/// parameterized equality clause per supplied filter. Values only ever
/// travel as bind parameters, never spliced into the SQL text.
fn build_total_cost_query(filter: &TotalCostFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder: QueryBuilder<'static, Postgres> = QueryBuilder::new(
        "SELECT COALESCE(SUM(price), 0) FROM subscriptions WHERE start_date >= ",
    );
    builder.push_bind(filter.from.first_day());
    builder.push(" AND start_date <= ");
    builder.push_bind(filter.to.first_day());

    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ");
        builder.push_bind(user_id);
    }

    if let Some(service_name) = &filter.service_name {
        builder.push(" AND service_name = ");
        builder.push_bind(service_name.clone());
    }

    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(user_id: Option<Uuid>, service_name: Option<&str>) -> TotalCostFilter {
        TotalCostFilter {
            from: "01-2024".parse().unwrap(),
            to: "12-2024".parse().unwrap(),
            user_id,
            service_name: service_name.map(str::to_string),
        }
    }

    #[test]
    fn test_total_cost_query_without_filters() {
        let sql = build_total_cost_query(&filter(None, None)).into_sql();
        assert_eq!(
            sql,
            "SELECT COALESCE(SUM(price), 0) FROM subscriptions \
             WHERE start_date >= $1 AND start_date <= $2"
        );
    }

    #[test]
    fn test_total_cost_query_with_user_filter() {
        let sql = build_total_cost_query(&filter(Some(Uuid::new_v4()), None)).into_sql();
        assert!(sql.ends_with("AND user_id = $3"));
        assert!(!sql.contains("service_name"));
    }

    #[test]
    fn test_total_cost_query_with_service_filter() {
        let sql = build_total_cost_query(&filter(None, Some("Yandex Plus"))).into_sql();
        assert!(sql.ends_with("AND service_name = $3"));
        assert!(!sql.contains("user_id"));
    }

    #[test]
    fn test_total_cost_query_with_both_filters() {
        let sql =
            build_total_cost_query(&filter(Some(Uuid::new_v4()), Some("Yandex Plus"))).into_sql();
        assert!(sql.contains("AND user_id = $3"));
        assert!(sql.ends_with("AND service_name = $4"));
    }

    // Filters only ever append AND clauses to the shared base predicate, so
    // removing a filter can only widen the matched set and the returned sum
    // never decreases.
    #[test]
    fn test_filters_extend_the_base_query() {
        let base = build_total_cost_query(&filter(None, None)).into_sql();
        let narrowed =
            build_total_cost_query(&filter(Some(Uuid::new_v4()), Some("Yandex Plus"))).into_sql();
        assert!(narrowed.starts_with(&base));
    }

    #[test]
    fn test_filter_values_never_reach_the_sql_text() {
        let user_id = Uuid::new_v4();
        let sql = build_total_cost_query(&filter(Some(user_id), Some("'; DROP TABLE--"))).into_sql();
        assert!(!sql.contains(&user_id.to_string()));
        assert!(!sql.contains("DROP TABLE"));
    }
}
