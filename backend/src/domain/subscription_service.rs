//! Recurring service costs.

use chrono::{Duration, NaiveDate};
use log::info;
use shared::{BillingCycle, CreateSubscriptionRequest, Subscription, UpdateSubscriptionRequest};
use uuid::Uuid;

use crate::domain::calculations::{add_months, round_cents};
use crate::domain::error::{
    require_non_negative, require_text, require_window_days, DomainError, DomainResult,
};
use crate::storage::{CollectionRepository, StoreConnection};

/// Cost per month of one subscription (yearly plans spread over 12 months)
pub fn monthly_equivalent(subscription: &Subscription) -> f64 {
    match subscription.billing_cycle {
        BillingCycle::Monthly => subscription.cost,
        BillingCycle::Yearly => subscription.cost / 12.0,
    }
}

/// Combined monthly cost of the active subscriptions
pub fn total_monthly_cost(subscriptions: &[Subscription]) -> f64 {
    round_cents(
        subscriptions
            .iter()
            .filter(|s| s.active)
            .map(monthly_equivalent)
            .sum(),
    )
}

/// Next billing date after one full cycle
pub fn next_billing_date(date: NaiveDate, cycle: BillingCycle) -> NaiveDate {
    match cycle {
        BillingCycle::Monthly => add_months(date, 1),
        BillingCycle::Yearly => add_months(date, 12),
    }
}

#[derive(Clone)]
pub struct SubscriptionService {
    subscriptions: CollectionRepository<Subscription>,
}

impl SubscriptionService {
    pub fn new(connection: &StoreConnection) -> Self {
        Self {
            subscriptions: connection.repository(),
        }
    }

    pub async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> DomainResult<Subscription> {
        let subscription = Subscription {
            id: Uuid::new_v4().to_string(),
            name: require_text("Name", &request.name)?,
            provider: request.provider.trim().to_string(),
            cost: require_non_negative("Cost", request.cost)?,
            billing_cycle: request.billing_cycle,
            next_billing_date: request.next_billing_date,
            category: request.category.trim().to_string(),
            active: true,
        };
        let subscription = self.subscriptions.insert(subscription).await?;
        info!("Added subscription '{}'", subscription.name);
        Ok(subscription)
    }

    /// All subscriptions, next bill first
    pub async fn list_subscriptions(&self) -> DomainResult<Vec<Subscription>> {
        let mut subscriptions = self.subscriptions.load_all().await?;
        subscriptions.sort_by_key(|s| s.next_billing_date);
        Ok(subscriptions)
    }

    pub async fn get_subscription(&self, id: &str) -> DomainResult<Subscription> {
        self.subscriptions
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Subscription", id))
    }

    pub async fn update_subscription(
        &self,
        id: &str,
        request: UpdateSubscriptionRequest,
    ) -> DomainResult<Subscription> {
        self.subscriptions
            .mutate(|subscriptions| {
                let sub = subscriptions
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or_else(|| DomainError::not_found("Subscription", id))?;
                if let Some(name) = request.name {
                    sub.name = require_text("Name", &name)?;
                }
                if let Some(provider) = request.provider {
                    sub.provider = provider.trim().to_string();
                }
                if let Some(cost) = request.cost {
                    sub.cost = require_non_negative("Cost", cost)?;
                }
                if let Some(cycle) = request.billing_cycle {
                    sub.billing_cycle = cycle;
                }
                if let Some(date) = request.next_billing_date {
                    sub.next_billing_date = date;
                }
                if let Some(category) = request.category {
                    sub.category = category.trim().to_string();
                }
                if let Some(active) = request.active {
                    sub.active = active;
                }
                Ok(sub.clone())
            })
            .await
    }

    pub async fn delete_subscription(&self, id: &str) -> DomainResult<()> {
        if !self.subscriptions.delete(id).await? {
            return Err(DomainError::not_found("Subscription", id));
        }
        Ok(())
    }

    /// Advance the next billing date by one cycle
    pub async fn renew(&self, id: &str) -> DomainResult<Subscription> {
        let sub = self
            .subscriptions
            .mutate(|subscriptions| {
                let sub = subscriptions
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or_else(|| DomainError::not_found("Subscription", id))?;
                if !sub.active {
                    return Err(DomainError::InvalidState(format!(
                        "Subscription '{}' is inactive",
                        sub.name
                    )));
                }
                sub.next_billing_date = next_billing_date(sub.next_billing_date, sub.billing_cycle);
                Ok(sub.clone())
            })
            .await?;
        info!("Renewed '{}' until {}", sub.name, sub.next_billing_date);
        Ok(sub)
    }

    /// Active subscriptions billing within `days` of `today` (overdue included)
    pub async fn due_within(&self, today: NaiveDate, days: i64) -> DomainResult<Vec<Subscription>> {
        let days = require_window_days("Days", days)?;
        let horizon = today + Duration::days(days);
        Ok(self
            .list_subscriptions()
            .await?
            .into_iter()
            .filter(|s| s.active && s.next_billing_date <= horizon)
            .collect())
    }

    pub async fn monthly_cost(&self) -> DomainResult<f64> {
        Ok(total_monthly_cost(&self.subscriptions.load_all().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::memory_connection;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(name: &str, cost: f64, cycle: BillingCycle, next: NaiveDate) -> CreateSubscriptionRequest {
        CreateSubscriptionRequest {
            name: name.to_string(),
            provider: String::new(),
            cost,
            billing_cycle: cycle,
            next_billing_date: next,
            category: "Software".to_string(),
        }
    }

    #[tokio::test]
    async fn test_renew_clamps_month_end() {
        let service = SubscriptionService::new(&memory_connection().await);
        let sub = service
            .create_subscription(request("POS", 49.0, BillingCycle::Monthly, date(2025, 1, 31)))
            .await
            .unwrap();

        let renewed = service.renew(&sub.id).await.unwrap();
        assert_eq!(renewed.next_billing_date, date(2025, 2, 28));

        let yearly = service
            .create_subscription(request("Domain", 24.0, BillingCycle::Yearly, date(2024, 2, 29)))
            .await
            .unwrap();
        assert_eq!(service.renew(&yearly.id).await.unwrap().next_billing_date, date(2025, 2, 28));
    }

    #[tokio::test]
    async fn test_monthly_cost_skips_inactive_and_spreads_yearly() {
        let service = SubscriptionService::new(&memory_connection().await);
        service
            .create_subscription(request("Music", 15.0, BillingCycle::Monthly, date(2025, 3, 5)))
            .await
            .unwrap();
        service
            .create_subscription(request("Accounting", 120.0, BillingCycle::Yearly, date(2025, 9, 1)))
            .await
            .unwrap();
        let cancelled = service
            .create_subscription(request("Old POS", 80.0, BillingCycle::Monthly, date(2025, 3, 2)))
            .await
            .unwrap();
        service
            .update_subscription(
                &cancelled.id,
                UpdateSubscriptionRequest { active: Some(false), ..Default::default() },
            )
            .await
            .unwrap();

        assert_eq!(service.monthly_cost().await.unwrap(), 25.0);
        assert!(matches!(service.renew(&cancelled.id).await, Err(DomainError::InvalidState(_))));

        let due = service.due_within(date(2025, 3, 1), 7).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].name, "Music");
    }

    #[tokio::test]
    async fn test_due_window_out_of_range_is_rejected() {
        let service = SubscriptionService::new(&memory_connection().await);
        service
            .create_subscription(request("Music", 15.0, BillingCycle::Monthly, date(2025, 3, 5)))
            .await
            .unwrap();

        for days in [-1, 1_000_000_000, i64::MAX] {
            assert!(matches!(
                service.due_within(date(2025, 3, 1), days).await,
                Err(DomainError::Validation(_))
            ));
        }
        assert_eq!(service.due_within(date(2025, 3, 1), 3650).await.unwrap().len(), 1);
    }
}
