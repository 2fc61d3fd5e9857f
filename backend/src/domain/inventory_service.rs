//! Inventory domain logic: item CRUD, withdrawals and count reconciliation.
//!
//! Every quantity change appends a [`StockMovement`] to the movement log.
//! The item collection lock is always taken before the movement log lock.

use chrono::Utc;
use log::info;
use shared::{
    AdjustStockRequest, AdjustmentReason, CreateInventoryItemRequest, InventoryItem,
    StockChangeResponse, StockMovement, StockMovementKind, UpdateInventoryItemRequest,
    WithdrawStockRequest,
};
use uuid::Uuid;

use crate::domain::error::{require_non_negative, require_text, DomainError, DomainResult};
use crate::storage::{CollectionRepository, StoreConnection};

/// Quantity left after withdrawing `quantity` from `current`
///
/// A positive quantity is taken out and the result never drops below zero.
/// A negative quantity puts stock back.
pub fn quantity_after_withdrawal(current: f64, quantity: f64) -> f64 {
    if quantity > 0.0 {
        (current - quantity).max(0.0)
    } else {
        current - quantity
    }
}

pub fn is_low_stock(item: &InventoryItem) -> bool {
    item.quantity <= item.min_limit
}

struct PlannedChange {
    quantity_after: f64,
    kind: StockMovementKind,
    reason: Option<AdjustmentReason>,
}

#[derive(Clone)]
pub struct InventoryService {
    items: CollectionRepository<InventoryItem>,
    movements: CollectionRepository<StockMovement>,
}

impl InventoryService {
    pub fn new(connection: &StoreConnection) -> Self {
        Self {
            items: connection.repository(),
            movements: connection.repository(),
        }
    }

    pub async fn create_item(&self, request: CreateInventoryItemRequest) -> DomainResult<InventoryItem> {
        let item = InventoryItem {
            id: Uuid::new_v4().to_string(),
            name: require_text("Name", &request.name)?,
            category: request.category.trim().to_string(),
            quantity: require_non_negative("Quantity", request.quantity)?,
            unit: request.unit.trim().to_string(),
            min_limit: require_non_negative("Minimum limit", request.min_limit)?,
            cost_per_unit: require_non_negative("Cost per unit", request.cost_per_unit)?,
            expiry_date: request.expiry_date,
        };

        let item = self.items.insert(item).await?;
        info!("Created inventory item {} ({})", item.name, item.id);
        Ok(item)
    }

    /// All items, ordered by category then name
    pub async fn list_items(&self) -> DomainResult<Vec<InventoryItem>> {
        let mut items = self.items.load_all().await?;
        items.sort_by(|a, b| {
            a.category
                .to_lowercase()
                .cmp(&b.category.to_lowercase())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(items)
    }

    pub async fn get_item(&self, id: &str) -> DomainResult<InventoryItem> {
        self.items
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Inventory item", id))
    }

    /// Update descriptive fields. Quantity only changes through withdraw/adjust.
    pub async fn update_item(
        &self,
        id: &str,
        request: UpdateInventoryItemRequest,
    ) -> DomainResult<InventoryItem> {
        self.items
            .mutate(|items| {
                let item = items
                    .iter_mut()
                    .find(|i| i.id == id)
                    .ok_or_else(|| DomainError::not_found("Inventory item", id))?;

                if let Some(name) = request.name {
                    item.name = require_text("Name", &name)?;
                }
                if let Some(category) = request.category {
                    item.category = category.trim().to_string();
                }
                if let Some(unit) = request.unit {
                    item.unit = unit.trim().to_string();
                }
                if let Some(min_limit) = request.min_limit {
                    item.min_limit = require_non_negative("Minimum limit", min_limit)?;
                }
                if let Some(cost) = request.cost_per_unit {
                    item.cost_per_unit = require_non_negative("Cost per unit", cost)?;
                }
                if let Some(expiry) = request.expiry_date {
                    item.expiry_date = expiry;
                }
                Ok(item.clone())
            })
            .await
    }

    pub async fn delete_item(&self, id: &str) -> DomainResult<()> {
        if !self.items.delete(id).await? {
            return Err(DomainError::not_found("Inventory item", id));
        }
        info!("Deleted inventory item {}", id);
        Ok(())
    }

    /// Take stock out (positive quantity, clamped at zero) or put it back (negative)
    pub async fn withdraw(
        &self,
        id: &str,
        request: WithdrawStockRequest,
    ) -> DomainResult<StockChangeResponse> {
        let quantity = request.quantity;
        if !quantity.is_finite() || quantity == 0.0 {
            return Err(DomainError::Validation(
                "Withdrawal quantity must be a non-zero number".to_string(),
            ));
        }

        self.apply_change(id, request.note, |current| {
            Ok(PlannedChange {
                quantity_after: quantity_after_withdrawal(current, quantity),
                kind: if quantity > 0.0 {
                    StockMovementKind::Withdrawal
                } else {
                    StockMovementKind::Restock
                },
                reason: None,
            })
        })
        .await
    }

    /// Reconcile the system count with a physical count
    ///
    /// The logged diff is `physical_count - system_count` and the item ends
    /// up holding exactly the physical count.
    pub async fn adjust(
        &self,
        id: &str,
        request: AdjustStockRequest,
    ) -> DomainResult<StockChangeResponse> {
        let physical_count = require_non_negative("Physical count", request.physical_count)?;

        self.apply_change(id, request.note, |_| {
            Ok(PlannedChange {
                quantity_after: physical_count,
                kind: StockMovementKind::Adjustment,
                reason: Some(request.reason),
            })
        })
        .await
    }

    /// Movement log, newest first, optionally for a single item
    pub async fn list_movements(&self, item_id: Option<&str>) -> DomainResult<Vec<StockMovement>> {
        let mut movements: Vec<StockMovement> = self
            .movements
            .load_all()
            .await?
            .into_iter()
            .filter(|m| item_id.map_or(true, |id| m.item_id == id))
            .collect();
        movements.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(movements)
    }

    pub async fn low_stock(&self) -> DomainResult<Vec<InventoryItem>> {
        Ok(self
            .list_items()
            .await?
            .into_iter()
            .filter(is_low_stock)
            .collect())
    }

    async fn apply_change<F>(
        &self,
        id: &str,
        note: Option<String>,
        plan: F,
    ) -> DomainResult<StockChangeResponse>
    where
        F: FnOnce(f64) -> DomainResult<PlannedChange>,
    {
        let items_guard = self.items.lock().await;
        let movements_guard = self.movements.lock().await;

        let mut items = items_guard.load().await?;
        let item = items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| DomainError::not_found("Inventory item", id))?;

        let quantity_before = item.quantity;
        let change = plan(quantity_before)?;
        item.quantity = change.quantity_after;
        let updated = item.clone();

        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            item_id: id.to_string(),
            kind: change.kind,
            quantity_before,
            quantity_after: change.quantity_after,
            diff: change.quantity_after - quantity_before,
            reason: change.reason,
            note: note.filter(|n| !n.trim().is_empty()),
            timestamp: Utc::now(),
        };

        items_guard.save(&items).await?;
        let mut movements = movements_guard.load().await?;
        movements.push(movement.clone());
        movements_guard.save(&movements).await?;

        info!(
            "{:?} on {}: {} -> {} {}",
            movement.kind, updated.name, quantity_before, updated.quantity, updated.unit
        );
        Ok(StockChangeResponse {
            item: updated,
            movement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::memory_connection;

    async fn create_test_service() -> InventoryService {
        InventoryService::new(&memory_connection().await)
    }

    fn beans(quantity: f64) -> CreateInventoryItemRequest {
        CreateInventoryItemRequest {
            name: "Espresso beans".to_string(),
            category: "Coffee".to_string(),
            quantity,
            unit: "kg".to_string(),
            min_limit: 2.0,
            cost_per_unit: 18.0,
            expiry_date: None,
        }
    }

    #[test]
    fn test_quantity_after_withdrawal() {
        assert_eq!(quantity_after_withdrawal(10.0, 3.0), 7.0);
        assert_eq!(quantity_after_withdrawal(2.0, 5.0), 0.0);
        assert_eq!(quantity_after_withdrawal(2.0, -3.0), 5.0);
    }

    #[tokio::test]
    async fn test_create_item_validates_input() {
        let service = create_test_service().await;

        let mut request = beans(5.0);
        request.name = "  ".to_string();
        assert!(matches!(
            service.create_item(request).await,
            Err(DomainError::Validation(_))
        ));

        assert!(matches!(
            service.create_item(beans(-1.0)).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_withdraw_more_than_available_clamps_to_zero() {
        let service = create_test_service().await;
        let item = service.create_item(beans(3.0)).await.unwrap();

        let change = service
            .withdraw(&item.id, WithdrawStockRequest { quantity: 10.0, note: None })
            .await
            .unwrap();

        assert_eq!(change.item.quantity, 0.0);
        assert_eq!(change.movement.kind, StockMovementKind::Withdrawal);
        assert_eq!(change.movement.diff, -3.0);
        assert_eq!(service.get_item(&item.id).await.unwrap().quantity, 0.0);
    }

    #[tokio::test]
    async fn test_negative_withdrawal_adds_back() {
        let service = create_test_service().await;
        let item = service.create_item(beans(3.0)).await.unwrap();

        let change = service
            .withdraw(
                &item.id,
                WithdrawStockRequest { quantity: -2.0, note: Some("returned bag".to_string()) },
            )
            .await
            .unwrap();

        assert_eq!(change.item.quantity, 5.0);
        assert_eq!(change.movement.kind, StockMovementKind::Restock);
        assert_eq!(change.movement.note.as_deref(), Some("returned bag"));
    }

    #[tokio::test]
    async fn test_zero_withdrawal_rejected() {
        let service = create_test_service().await;
        let item = service.create_item(beans(3.0)).await.unwrap();

        let result = service
            .withdraw(&item.id, WithdrawStockRequest { quantity: 0.0, note: None })
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(service.list_movements(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adjustment_logs_signed_difference() {
        let service = create_test_service().await;
        let item = service.create_item(beans(12.0)).await.unwrap();

        let change = service
            .adjust(
                &item.id,
                AdjustStockRequest {
                    physical_count: 9.5,
                    reason: AdjustmentReason::Damaged,
                    note: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(change.item.quantity, 9.5);
        assert_eq!(change.movement.diff, 9.5 - 12.0);
        assert_eq!(change.movement.quantity_before, 12.0);
        assert_eq!(change.movement.reason, Some(AdjustmentReason::Damaged));

        let up = service
            .adjust(
                &item.id,
                AdjustStockRequest {
                    physical_count: 11.0,
                    reason: AdjustmentReason::CountCorrection,
                    note: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(up.movement.diff, 1.5);
        assert_eq!(service.list_movements(Some(&item.id)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_adjust_rejects_negative_count() {
        let service = create_test_service().await;
        let item = service.create_item(beans(12.0)).await.unwrap();

        let result = service
            .adjust(
                &item.id,
                AdjustStockRequest {
                    physical_count: -1.0,
                    reason: AdjustmentReason::Other,
                    note: None,
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_change_on_missing_item_is_not_found() {
        let service = create_test_service().await;
        let result = service
            .withdraw("nope", WithdrawStockRequest { quantity: 1.0, note: None })
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_low_stock_includes_items_at_limit() {
        let service = create_test_service().await;
        let at_limit = service.create_item(beans(2.0)).await.unwrap();
        let mut milk = beans(10.0);
        milk.name = "Milk".to_string();
        service.create_item(milk).await.unwrap();

        let low = service.low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, at_limit.id);
    }

    #[tokio::test]
    async fn test_update_and_delete_item() {
        let service = create_test_service().await;
        let item = service.create_item(beans(2.0)).await.unwrap();

        let updated = service
            .update_item(
                &item.id,
                UpdateInventoryItemRequest {
                    min_limit: Some(0.5),
                    unit: Some("bag".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.min_limit, 0.5);
        assert_eq!(updated.unit, "bag");
        assert_eq!(updated.quantity, 2.0);

        service.delete_item(&item.id).await.unwrap();
        assert!(matches!(
            service.delete_item(&item.id).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_sets_and_clears_expiry() {
        let service = create_test_service().await;
        let item = service.create_item(beans(2.0)).await.unwrap();
        let best_before = chrono::NaiveDate::from_ymd_opt(2025, 9, 30);

        let dated = service
            .update_item(
                &item.id,
                UpdateInventoryItemRequest {
                    expiry_date: Some(best_before),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(dated.expiry_date, best_before);

        let untouched = service
            .update_item(&item.id, UpdateInventoryItemRequest::default())
            .await
            .unwrap();
        assert_eq!(untouched.expiry_date, best_before);

        let cleared = service
            .update_item(
                &item.id,
                UpdateInventoryItemRequest {
                    expiry_date: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(cleared.expiry_date.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_withdrawals_are_serialized() {
        let service = create_test_service().await;
        let item = service.create_item(beans(100.0)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let service = service.clone();
            let id = item.id.clone();
            handles.push(tokio::spawn(async move {
                service
                    .withdraw(&id, WithdrawStockRequest { quantity: 1.0, note: None })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(service.get_item(&item.id).await.unwrap().quantity, 90.0);
        assert_eq!(service.list_movements(Some(&item.id)).await.unwrap().len(), 10);
    }
}
