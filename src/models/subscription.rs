use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::MonthDate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: MonthDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<MonthDate>,
}

/// Request body for create and update. Fields arrive as raw text and are
/// checked by [`SubscriptionInput::validate`] before anything touches the
/// database.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionInput {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 499)]
    pub price: i32,
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: String,
    #[schema(example = "07-2024")]
    pub start_date: String,
    #[schema(example = "12-2024")]
    pub end_date: Option<String>,
}

/// A validated subscription that has not been assigned an id yet.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: MonthDate,
    pub end_date: Option<MonthDate>,
}

impl SubscriptionInput {
    /// Checks fields one at a time and returns the first failure:
    /// service name, then price, user id, start month, end month.
    pub fn validate(&self) -> AppResult<NewSubscription> {
        let service_name = self.service_name.trim();
        if service_name.is_empty() {
            return Err(AppError::ValidationError(
                "service_name must not be empty".to_string(),
            ));
        }

        if self.price <= 0 {
            return Err(AppError::ValidationError(
                "price must be greater than zero".to_string(),
            ));
        }

        let user_id = Uuid::parse_str(&self.user_id).map_err(|_| {
            AppError::ValidationError(format!("invalid user_id '{}'", self.user_id))
        })?;

        let start_date: MonthDate = self.start_date.parse()?;

        let end_date = match self.end_date.as_deref() {
            Some(raw) => {
                let end: MonthDate = raw.parse()?;
                if end < start_date {
                    return Err(AppError::ValidationError(format!(
                        "end_date {end} is before start_date {start_date}"
                    )));
                }
                Some(end)
            }
            None => None,
        };

        Ok(NewSubscription {
            service_name: service_name.to_string(),
            price: self.price,
            user_id,
            start_date,
            end_date,
        })
    }
}

/// Query parameters of the total-cost endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TotalCostQuery {
    pub from: String,
    pub to: String,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

/// Typed form of [`TotalCostQuery`]. Absent filters stay `None` and are
/// omitted from the query entirely rather than compared to a wildcard.
#[derive(Debug, Clone)]
pub struct TotalCostFilter {
    pub from: MonthDate,
    pub to: MonthDate,
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

impl TotalCostQuery {
    pub fn validate(&self) -> AppResult<TotalCostFilter> {
        let from: MonthDate = self.from.parse()?;
        let to: MonthDate = self.to.parse()?;

        // An empty query value means the filter was not supplied.
        let user_id = match self.user_id.as_deref() {
            Some(raw) if !raw.is_empty() => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| AppError::ValidationError(format!("invalid user_id '{raw}'")))?,
            ),
            _ => None,
        };

        let service_name = self
            .service_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(TotalCostFilter {
            from,
            to,
            user_id,
            service_name,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TotalCostResponse {
    #[schema(example = 499)]
    pub total: i64,
}
