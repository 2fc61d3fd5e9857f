//! Financial summary and alert reducers for the overview screen.
//!
//! Everything here is computed on demand from the stored collections; no
//! aggregate is persisted. Empty collections produce zeros and empty alert
//! lists, never errors.

use chrono::{Duration, NaiveDate, Utc};
use shared::{
    DashboardAlerts, DashboardResponse, Document, ExpiringDocumentAlert, ExpiringStockAlert,
    FinancialSummary, InventoryItem, LowStockAlert, RentalUnit, Staff, Subscription,
    TransactionKind, TreasuryTransaction,
};

use crate::domain::calculations::{days_until, round_cents};
use crate::domain::error::DomainResult;
use crate::domain::inventory_service::is_low_stock;
use crate::domain::rental_service::{overdue_payments, paid_income};
use crate::domain::subscription_service::total_monthly_cost;
use crate::domain::treasury_service::sum_kind;
use crate::storage::{CollectionRepository, StoreConnection};

/// Sum of the staff running monthly earnings
pub fn payroll_cost(staff: &[Staff]) -> f64 {
    round_cents(staff.iter().map(|s| s.total_monthly_earnings).sum())
}

/// Net profit as a percentage of revenue; 0 when there is no revenue
pub fn profit_margin(net_profit: f64, total_revenue: f64) -> f64 {
    if total_revenue == 0.0 {
        return 0.0;
    }
    round_cents(net_profit / total_revenue * 100.0)
}

pub fn financial_summary(
    treasury: &[TreasuryTransaction],
    rentals: &[RentalUnit],
    staff: &[Staff],
    subscriptions: &[Subscription],
) -> FinancialSummary {
    let treasury_in = sum_kind(treasury, TransactionKind::In);
    let treasury_out = sum_kind(treasury, TransactionKind::Out);
    let rental_income = paid_income(rentals);
    let payroll_cost = payroll_cost(staff);
    let subscription_cost = total_monthly_cost(subscriptions);

    let total_revenue = round_cents(treasury_in + rental_income);
    let total_expenses = round_cents(treasury_out + payroll_cost + subscription_cost);
    let net_profit = round_cents(total_revenue - total_expenses);

    FinancialSummary {
        treasury_in,
        treasury_out,
        treasury_balance: round_cents(treasury_in - treasury_out),
        rental_income,
        payroll_cost,
        subscription_cost,
        total_revenue,
        total_expenses,
        net_profit,
        profit_margin: profit_margin(net_profit, total_revenue),
    }
}

pub fn low_stock_alerts(items: &[InventoryItem]) -> Vec<LowStockAlert> {
    items
        .iter()
        .filter(|item| is_low_stock(item))
        .map(|item| LowStockAlert {
            item_id: item.id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            min_limit: item.min_limit,
            unit: item.unit.clone(),
        })
        .collect()
}

/// Dated documents expiring on or before `today + window_days`,
/// already expired ones included and flagged
pub fn expiring_document_alerts(
    documents: &[Document],
    today: NaiveDate,
    window_days: i64,
) -> Vec<ExpiringDocumentAlert> {
    let horizon = today + Duration::days(window_days);
    let mut alerts: Vec<ExpiringDocumentAlert> = documents
        .iter()
        .filter_map(|doc| {
            let expiry = doc.expiry_date?;
            (expiry <= horizon).then(|| ExpiringDocumentAlert {
                document_id: doc.id.clone(),
                title: doc.title.clone(),
                expiry_date: expiry,
                days_remaining: days_until(today, expiry),
                expired: expiry < today,
            })
        })
        .collect();
    alerts.sort_by_key(|a| a.expiry_date);
    alerts
}

pub fn expiring_stock_alerts(
    items: &[InventoryItem],
    today: NaiveDate,
    window_days: i64,
) -> Vec<ExpiringStockAlert> {
    let horizon = today + Duration::days(window_days);
    let mut alerts: Vec<ExpiringStockAlert> = items
        .iter()
        .filter(|item| item.quantity > 0.0)
        .filter_map(|item| {
            let expiry = item.expiry_date?;
            (expiry <= horizon).then(|| ExpiringStockAlert {
                item_id: item.id.clone(),
                name: item.name.clone(),
                expiry_date: expiry,
                days_remaining: days_until(today, expiry),
            })
        })
        .collect();
    alerts.sort_by_key(|a| a.expiry_date);
    alerts
}

#[derive(Clone)]
pub struct DashboardService {
    inventory: CollectionRepository<InventoryItem>,
    staff: CollectionRepository<Staff>,
    documents: CollectionRepository<Document>,
    treasury: CollectionRepository<TreasuryTransaction>,
    rentals: CollectionRepository<RentalUnit>,
    subscriptions: CollectionRepository<Subscription>,
    alert_window_days: i64,
}

impl DashboardService {
    pub fn new(connection: &StoreConnection, alert_window_days: i64) -> Self {
        Self {
            inventory: connection.repository(),
            staff: connection.repository(),
            documents: connection.repository(),
            treasury: connection.repository(),
            rentals: connection.repository(),
            subscriptions: connection.repository(),
            alert_window_days,
        }
    }

    pub async fn summary(&self) -> DomainResult<FinancialSummary> {
        Ok(financial_summary(
            &self.treasury.load_all().await?,
            &self.rentals.load_all().await?,
            &self.staff.load_all().await?,
            &self.subscriptions.load_all().await?,
        ))
    }

    pub async fn alerts(&self, today: NaiveDate) -> DomainResult<DashboardAlerts> {
        let items = self.inventory.load_all().await?;
        let documents = self.documents.load_all().await?;
        let rentals = self.rentals.load_all().await?;

        Ok(DashboardAlerts {
            low_stock: low_stock_alerts(&items),
            expiring_documents: expiring_document_alerts(&documents, today, self.alert_window_days),
            overdue_payments: overdue_payments(&rentals, today),
            expiring_stock: expiring_stock_alerts(&items, today, self.alert_window_days),
        })
    }

    pub async fn dashboard(&self) -> DomainResult<DashboardResponse> {
        let now = Utc::now();
        Ok(DashboardResponse {
            summary: self.summary().await?,
            alerts: self.alerts(now.date_naive()).await?,
            generated_at: now,
        })
    }
}
