//! Data import/export: inventory and payroll CSV, plus full JSON backups.

use anyhow::Context;
use chrono::Utc;
use csv::{ReaderBuilder, Trim, Writer};
use log::{info, warn};
use shared::{
    Asset, BackupDocument, CsvExportResponse, CsvImportResponse, Document, InventoryItem,
    RentalUnit, RestoreBackupResponse, Staff, StaffProfile, StockMovement, StockMovementKind,
    Subscription, Task, TreasuryTransaction,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::staff_service::build_payroll_summary;
use crate::storage::{CollectionRepository, Record, StoreConnection};

const IMPORT_NOTE: &str = "CSV import";

/// One usable line of an inventory import file
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
}

/// Parse `name, category, quantity, unit` lines
///
/// Returns the usable rows and the number of malformed lines skipped. A
/// leading header line (first field "name", quantity not numeric) is
/// dropped without being counted.
pub fn parse_inventory_csv(content: &str) -> (Vec<ImportRow>, usize) {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable CSV line {}: {}", index + 1, e);
                skipped += 1;
                continue;
            }
        };
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let field = |i: usize| record.get(i).unwrap_or("").to_string();
        let quantity = record.get(2).and_then(|q| q.parse::<f64>().ok());
        if index == 0 && quantity.is_none() && field(0).eq_ignore_ascii_case("name") {
            continue;
        }

        match quantity {
            Some(quantity)
                if record.len() >= 4
                    && !field(0).is_empty()
                    && quantity.is_finite()
                    && quantity >= 0.0 =>
            {
                rows.push(ImportRow {
                    name: field(0),
                    category: field(1),
                    quantity,
                    unit: field(3),
                });
            }
            _ => {
                warn!("Skipping malformed CSV line {}", index + 1);
                skipped += 1;
            }
        }
    }
    (rows, skipped)
}

fn write_csv(header: &[&str], rows: Vec<Vec<String>>) -> DomainResult<CsvExportResponse> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(header).context("Failed to write CSV header")?;
    let row_count = rows.len();
    for row in rows {
        writer.write_record(&row).context("Failed to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish CSV output: {}", e))?;
    let content = String::from_utf8(bytes).context("CSV output is not UTF-8")?;
    Ok(CsvExportResponse { content, row_count })
}

#[derive(Clone)]
pub struct ExportService {
    inventory: CollectionRepository<InventoryItem>,
    movements: CollectionRepository<StockMovement>,
    assets: CollectionRepository<Asset>,
    staff: CollectionRepository<Staff>,
    tasks: CollectionRepository<Task>,
    documents: CollectionRepository<Document>,
    treasury: CollectionRepository<TreasuryTransaction>,
    rentals: CollectionRepository<RentalUnit>,
    subscriptions: CollectionRepository<Subscription>,
}

impl ExportService {
    pub fn new(connection: &StoreConnection) -> Self {
        Self {
            inventory: connection.repository(),
            movements: connection.repository(),
            assets: connection.repository(),
            staff: connection.repository(),
            tasks: connection.repository(),
            documents: connection.repository(),
            treasury: connection.repository(),
            rentals: connection.repository(),
            subscriptions: connection.repository(),
        }
    }

    /// Merge an inventory CSV into the stock list
    ///
    /// Names match case-insensitively: a known item gets the imported
    /// quantity added (and a Restock movement logged), an unknown one is
    /// created with no minimum limit and no cost.
    pub async fn import_inventory_csv(&self, content: &str) -> DomainResult<CsvImportResponse> {
        let (rows, skipped) = parse_inventory_csv(content);

        let items_guard = self.inventory.lock().await;
        let movements_guard = self.movements.lock().await;
        let mut items = items_guard.load().await?;
        let mut new_movements = Vec::new();
        let mut created = 0;
        let mut updated = 0;

        let mut by_name: HashMap<String, usize> = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.name.to_lowercase(), i))
            .collect();

        for row in rows {
            match by_name.get(&row.name.to_lowercase()) {
                Some(&index) => {
                    let item = &mut items[index];
                    let before = item.quantity;
                    item.quantity = before + row.quantity;
                    new_movements.push(StockMovement {
                        id: Uuid::new_v4().to_string(),
                        item_id: item.id.clone(),
                        kind: StockMovementKind::Restock,
                        quantity_before: before,
                        quantity_after: item.quantity,
                        diff: row.quantity,
                        reason: None,
                        note: Some(IMPORT_NOTE.to_string()),
                        timestamp: Utc::now(),
                    });
                    updated += 1;
                }
                None => {
                    by_name.insert(row.name.to_lowercase(), items.len());
                    items.push(InventoryItem {
                        id: Uuid::new_v4().to_string(),
                        name: row.name,
                        category: row.category,
                        quantity: row.quantity,
                        unit: row.unit,
                        min_limit: 0.0,
                        cost_per_unit: 0.0,
                        expiry_date: None,
                    });
                    created += 1;
                }
            }
        }

        items_guard.save(&items).await?;
        if !new_movements.is_empty() {
            let mut movements = movements_guard.load().await?;
            movements.extend(new_movements);
            movements_guard.save(&movements).await?;
        }

        info!(
            "📥 IMPORT: {} created, {} updated, {} skipped",
            created, updated, skipped
        );
        Ok(CsvImportResponse {
            created,
            updated,
            skipped,
        })
    }

    pub async fn export_inventory_csv(&self) -> DomainResult<CsvExportResponse> {
        let mut items = self.inventory.load_all().await?;
        items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        let rows = items
            .into_iter()
            .map(|item| {
                vec![
                    item.name,
                    item.category,
                    item.quantity.to_string(),
                    item.unit,
                    item.min_limit.to_string(),
                    item.cost_per_unit.to_string(),
                    item.expiry_date.map(|d| d.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        write_csv(
            &["name", "category", "quantity", "unit", "min_limit", "cost_per_unit", "expiry_date"],
            rows,
        )
    }

    pub async fn export_payroll_csv(&self) -> DomainResult<CsvExportResponse> {
        let summary = build_payroll_summary(&self.staff.load_all().await?);
        let rows = summary
            .lines
            .into_iter()
            .map(|line| {
                vec![
                    line.name,
                    format!("{:?}", line.role),
                    format!("{:.2}", line.hourly_rate),
                    format!("{:.2}", line.total_hours),
                    format!("{:.2}", line.total_earnings),
                ]
            })
            .collect();
        write_csv(
            &["name", "role", "hourly_rate", "total_hours", "total_earnings"],
            rows,
        )
    }

    /// Snapshot of every business collection
    pub async fn export_backup(&self) -> DomainResult<BackupDocument> {
        let backup = BackupDocument {
            exported_at: Some(Utc::now()),
            inventory: Some(self.inventory.load_all().await?),
            stock_movements: Some(self.movements.load_all().await?),
            assets: Some(self.assets.load_all().await?),
            staff: Some(self.staff.load_all().await?.iter().map(StaffProfile::from).collect()),
            tasks: Some(self.tasks.load_all().await?),
            documents: Some(self.documents.load_all().await?),
            treasury: Some(self.treasury.load_all().await?),
            rentals: Some(self.rentals.load_all().await?),
            subscriptions: Some(self.subscriptions.load_all().await?),
        };
        info!("📤 EXPORT: backup document created");
        Ok(backup)
    }

    /// Replace every collection present in the backup; absent ones are untouched
    pub async fn restore_backup(&self, content: &str) -> DomainResult<RestoreBackupResponse> {
        let backup: BackupDocument = serde_json::from_str(content).map_err(|e| {
            warn!("Rejected backup: {}", e);
            DomainError::Validation("invalid backup document".to_string())
        })?;

        let mut restored = Vec::new();
        restore(&self.inventory, backup.inventory, &mut restored).await?;
        restore(&self.movements, backup.stock_movements, &mut restored).await?;
        restore(&self.assets, backup.assets, &mut restored).await?;
        if let Some(profiles) = backup.staff {
            self.restore_staff(profiles).await?;
            restored.push(Staff::COLLECTION.to_string());
        }
        restore(&self.tasks, backup.tasks, &mut restored).await?;
        restore(&self.documents, backup.documents, &mut restored).await?;
        restore(&self.treasury, backup.treasury, &mut restored).await?;
        restore(&self.rentals, backup.rentals, &mut restored).await?;
        restore(&self.subscriptions, backup.subscriptions, &mut restored).await?;

        info!("Restored collections: {}", restored.join(", "));
        Ok(RestoreBackupResponse {
            restored_collections: restored,
        })
    }

    /// Replace the staff list, keeping the stored password of every known id
    ///
    /// Staff new to this store come back without a password and cannot sign
    /// in until one is set through a staff update.
    async fn restore_staff(&self, profiles: Vec<StaffProfile>) -> DomainResult<()> {
        let guard = self.staff.lock().await;
        let mut hashes: HashMap<String, String> = guard
            .load()
            .await?
            .into_iter()
            .map(|s| (s.id, s.password_hash))
            .collect();

        let staff: Vec<Staff> = profiles
            .into_iter()
            .map(|profile| {
                let password_hash = hashes.remove(&profile.id).unwrap_or_default();
                if password_hash.is_empty() {
                    warn!("{} restored without a password", profile.name);
                }
                staff_from_profile(profile, password_hash)
            })
            .collect();
        guard.save(&staff).await?;
        Ok(())
    }
}

fn staff_from_profile(profile: StaffProfile, password_hash: String) -> Staff {
    Staff {
        id: profile.id,
        name: profile.name,
        username: profile.username,
        password_hash,
        role: profile.role,
        hourly_rate: profile.hourly_rate,
        is_clocked_in: profile.is_clocked_in,
        last_clock_in: profile.last_clock_in,
        attendance_history: profile.attendance_history,
        total_monthly_earnings: profile.total_monthly_earnings,
        total_monthly_hours: profile.total_monthly_hours,
        documents: profile.documents,
        permissions: profile.permissions,
    }
}

async fn restore<T: Record>(
    repository: &CollectionRepository<T>,
    records: Option<Vec<T>>,
    restored: &mut Vec<String>,
) -> DomainResult<()> {
    if let Some(records) = records {
        repository.replace_all(records).await?;
        restored.push(T::COLLECTION.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inventory_service::InventoryService;
    use crate::domain::staff_service::StaffService;
    use crate::storage::test_utils::memory_connection;
    use shared::{CreateInventoryItemRequest, CreateStaffRequest, Role, UpdateStaffRequest};

    fn barista(username: &str) -> CreateStaffRequest {
        CreateStaffRequest {
            name: "Mia".to_string(),
            username: username.to_string(),
            password: "espresso".to_string(),
            role: Role::Barista,
            hourly_rate: 11.0,
            permissions: vec![],
        }
    }

    #[test]
    fn test_parse_skips_header_and_malformed_lines() {
        let content = "name,category,quantity,unit\n\
                       Milk,Dairy,12,L\n\
                       \"Beans, house blend\",Coffee,4.5,kg\n\
                       Broken,Dry\n\
                       Sugar,Dry,lots,kg\n\
                       \n\
                       Cups,Paper,-3,pcs\n";
        let (rows, skipped) = parse_inventory_csv(content);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "Beans, house blend");
        assert_eq!(rows[1].quantity, 4.5);
        assert_eq!(skipped, 3);
    }

    #[test]
    fn test_parse_without_header() {
        let (rows, skipped) = parse_inventory_csv("Milk, Dairy, 3, L");
        assert_eq!(skipped, 0);
        assert_eq!(
            rows,
            vec![ImportRow {
                name: "Milk".to_string(),
                category: "Dairy".to_string(),
                quantity: 3.0,
                unit: "L".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_import_merges_by_name_case_insensitively() {
        let conn = memory_connection().await;
        let inventory = InventoryService::new(&conn);
        let export = ExportService::new(&conn);
        let milk = inventory
            .create_item(CreateInventoryItemRequest {
                name: "Milk".to_string(),
                category: "Dairy".to_string(),
                quantity: 5.0,
                unit: "L".to_string(),
                min_limit: 2.0,
                cost_per_unit: 1.2,
                expiry_date: None,
            })
            .await
            .unwrap();

        let result = export
            .import_inventory_csv("MILK,Dairy,10,L\nOat milk,Dairy,6,L\noat milk,Dairy,1,L\nbad line\n")
            .await
            .unwrap();
        assert_eq!(result, CsvImportResponse { created: 1, updated: 2, skipped: 1 });

        let items = inventory.list_items().await.unwrap();
        assert_eq!(items.len(), 2);
        let merged = inventory.get_item(&milk.id).await.unwrap();
        assert_eq!(merged.quantity, 15.0);
        assert_eq!(merged.min_limit, 2.0);
        let oat = items.iter().find(|i| i.name == "Oat milk").unwrap();
        assert_eq!(oat.quantity, 7.0);
        assert_eq!(oat.cost_per_unit, 0.0);

        let movements = inventory.list_movements(Some(&milk.id)).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].diff, 10.0);
    }

    #[tokio::test]
    async fn test_inventory_export() {
        let conn = memory_connection().await;
        let export = ExportService::new(&conn);
        export.import_inventory_csv("Milk,Dairy,3,L\nBeans,Coffee,2,kg").await.unwrap();

        let csv = export.export_inventory_csv().await.unwrap();
        assert_eq!(csv.row_count, 2);
        let lines: Vec<&str> = csv.content.lines().collect();
        assert_eq!(lines[0], "name,category,quantity,unit,min_limit,cost_per_unit,expiry_date");
        assert_eq!(lines[1], "Beans,Coffee,2,kg,0,0,");
    }

    #[tokio::test]
    async fn test_backup_round_trip_and_invalid_document() {
        let source = memory_connection().await;
        let export = ExportService::new(&source);
        export.import_inventory_csv("Milk,Dairy,3,L").await.unwrap();
        let backup = export.export_backup().await.unwrap();
        let json = serde_json::to_string(&backup).unwrap();

        let target = memory_connection().await;
        let restorer = ExportService::new(&target);
        let response = restorer.restore_backup(&json).await.unwrap();
        assert_eq!(response.restored_collections.len(), 9);
        assert_eq!(restorer.export_backup().await.unwrap().inventory, backup.inventory);

        let err = restorer.restore_backup("{ nope").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m == "invalid backup document"));
    }

    #[tokio::test]
    async fn test_partial_backup_leaves_other_collections() {
        let conn = memory_connection().await;
        let export = ExportService::new(&conn);
        export.import_inventory_csv("Milk,Dairy,3,L").await.unwrap();

        let response = export.restore_backup(r#"{"assets": []}"#).await.unwrap();
        assert_eq!(response.restored_collections, vec!["assets".to_string()]);
        assert_eq!(export.export_inventory_csv().await.unwrap().row_count, 1);
    }

    #[tokio::test]
    async fn test_backup_never_carries_password_hashes() {
        let conn = memory_connection().await;
        let staff = StaffService::new(&conn);
        let export = ExportService::new(&conn);
        let mia = staff.create_staff(barista("mia")).await.unwrap();

        let backup = export.export_backup().await.unwrap();
        let json = serde_json::to_string(&backup).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$argon2"));
        assert_eq!(backup.staff.as_ref().map(Vec::len), Some(1));

        // Known ids keep their password through a restore
        export.restore_backup(&json).await.unwrap();
        assert_eq!(staff.authenticate("mia", "espresso").await.unwrap().id, mia.id);

        // A fresh store gets the staff back, but nobody can sign in yet
        let target = memory_connection().await;
        let target_staff = StaffService::new(&target);
        ExportService::new(&target).restore_backup(&json).await.unwrap();
        assert_eq!(target_staff.get_staff(&mia.id).await.unwrap().username, "mia");
        assert!(matches!(
            target_staff.authenticate("mia", "espresso").await,
            Err(DomainError::Unauthorized)
        ));

        target_staff
            .update_staff(
                &mia.id,
                UpdateStaffRequest { password: Some("new-pass".to_string()), ..Default::default() },
            )
            .await
            .unwrap();
        assert!(target_staff.authenticate("mia", "new-pass").await.is_ok());
    }
}
