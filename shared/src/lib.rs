use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A stock line item (coffee beans, milk, cups, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Current on-hand quantity, expressed in `unit`
    pub quantity: f64,
    pub unit: String,
    /// Quantity at or below which the item is reported as low stock
    #[serde(default)]
    pub min_limit: f64,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

/// Kind of stock movement recorded in the movement log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockMovementKind {
    /// Stock taken out for use or sale
    Withdrawal,
    /// Stock added back (negative withdrawal)
    Restock,
    /// Reconciliation against a physical count
    Adjustment,
}

/// Reason code attached to a stock adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentReason {
    CountCorrection,
    Damaged,
    Expired,
    Theft,
    Other,
}

/// Append-only record of a quantity change on an inventory item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: String,
    pub item_id: String,
    pub kind: StockMovementKind,
    pub quantity_before: f64,
    pub quantity_after: f64,
    /// Signed difference actually applied (`quantity_after - quantity_before`)
    pub diff: f64,
    #[serde(default)]
    pub reason: Option<AdjustmentReason>,
    #[serde(default)]
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInventoryItemRequest {
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub min_limit: f64,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateInventoryItemRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub min_limit: Option<f64>,
    pub cost_per_unit: Option<f64>,
    /// Absent leaves the date unchanged, `null` clears it
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub expiry_date: Option<Option<NaiveDate>>,
}

/// Withdraw (positive) or add back (negative) a quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawStockRequest {
    pub quantity: f64,
    #[serde(default)]
    pub note: Option<String>,
}

/// Reconcile the recorded quantity with a physical count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustStockRequest {
    pub physical_count: f64,
    pub reason: AdjustmentReason,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockChangeResponse {
    pub item: InventoryItem,
    pub movement: StockMovement,
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetStatus {
    Active,
    UnderMaintenance,
    Retired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub cost: f64,
}

/// Equipment owned by the business (espresso machine, fridge, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub maintenance_date: Option<NaiveDate>,
    pub cost: f64,
    pub status: AssetStatus,
    /// Append-only maintenance log
    #[serde(default)]
    pub maintenance_history: Vec<MaintenanceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAssetRequest {
    pub name: String,
    pub purchase_date: NaiveDate,
    pub cost: f64,
    #[serde(default)]
    pub status: Option<AssetStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAssetRequest {
    pub name: Option<String>,
    pub cost: Option<f64>,
    pub status: Option<AssetStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMaintenanceRequest {
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub cost: f64,
}

// ---------------------------------------------------------------------------
// Staff, attendance and payroll
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Manager,
    Barista,
    Cashier,
    Other,
}

/// Area of the dashboard a staff member may access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    Inventory,
    Staff,
    Treasury,
    Rentals,
    Subscriptions,
    Documents,
    Reports,
    Advisor,
    Settings,
}

/// Direction of a clock event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClockDirection {
    In,
    Out,
}

/// One entry of a staff member's attendance history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceLog {
    #[serde(rename = "type")]
    pub kind: ClockDirection,
    pub timestamp: DateTime<Utc>,
    /// Hours worked in the shift closed by this entry (0 for IN)
    #[serde(default)]
    pub hours: f64,
    /// Pay accrued for the shift closed by this entry (0 for IN)
    #[serde(default)]
    pub earned_amount: f64,
}

/// Personal document attached to a staff record (contract, health card, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffDocument {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Persisted staff record. Never returned over the API; see [`StaffProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: String,
    pub name: String,
    pub username: String,
    /// Argon2 PHC string
    #[serde(default)]
    pub password_hash: String,
    pub role: Role,
    pub hourly_rate: f64,
    #[serde(default)]
    pub is_clocked_in: bool,
    #[serde(default)]
    pub last_clock_in: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attendance_history: Vec<AttendanceLog>,
    #[serde(default)]
    pub total_monthly_earnings: f64,
    #[serde(default)]
    pub total_monthly_hours: f64,
    #[serde(default)]
    pub documents: Vec<StaffDocument>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// Public view of a staff member (no credentials)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub id: String,
    pub name: String,
    pub username: String,
    pub role: Role,
    pub hourly_rate: f64,
    pub is_clocked_in: bool,
    pub last_clock_in: Option<DateTime<Utc>>,
    pub attendance_history: Vec<AttendanceLog>,
    pub total_monthly_earnings: f64,
    pub total_monthly_hours: f64,
    pub documents: Vec<StaffDocument>,
    pub permissions: Vec<Permission>,
}

impl From<&Staff> for StaffProfile {
    fn from(staff: &Staff) -> Self {
        Self {
            id: staff.id.clone(),
            name: staff.name.clone(),
            username: staff.username.clone(),
            role: staff.role,
            hourly_rate: staff.hourly_rate,
            is_clocked_in: staff.is_clocked_in,
            last_clock_in: staff.last_clock_in,
            attendance_history: staff.attendance_history.clone(),
            total_monthly_earnings: staff.total_monthly_earnings,
            total_monthly_hours: staff.total_monthly_hours,
            documents: staff.documents.clone(),
            permissions: staff.permissions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStaffRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub hourly_rate: f64,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateStaffRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub hourly_rate: Option<f64>,
    pub permissions: Option<Vec<Permission>>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockRequest {
    pub direction: ClockDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockResponse {
    pub profile: StaffProfile,
    pub entry: AttendanceLog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddStaffDocumentRequest {
    pub title: String,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecomputeTotalsRequest {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollLine {
    pub staff_id: String,
    pub name: String,
    pub role: Role,
    pub hourly_rate: f64,
    pub total_hours: f64,
    pub total_earnings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollSummary {
    pub lines: Vec<PayrollLine>,
    pub total_hours: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Staff id; not checked against the staff collection
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub priority: TaskPriority,
    /// Checklist item texts
    #[serde(default)]
    pub checklist: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskListQuery {
    pub assigned_to: Option<String>,
    pub status: Option<TaskStatus>,
}

/// Task with its assignee resolved to a display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub assignee_name: String,
}

// ---------------------------------------------------------------------------
// Compliance documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    /// Free-form kind: license, permit, insurance, ...
    #[serde(rename = "type")]
    pub document_type: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default = "default_remind_before_days")]
    pub remind_before_days: u32,
}

fn default_remind_before_days() -> u32 {
    30
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    Valid,
    ExpiringSoon,
    Expired,
    NoExpiry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentView {
    #[serde(flatten)]
    pub document: Document,
    pub status: DocumentStatus,
    pub days_until_expiry: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub document_type: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub remind_before_days: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub expiry_date: Option<Option<NaiveDate>>,
    #[serde(rename = "type")]
    pub document_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub file_url: Option<Option<String>>,
    pub remind_before_days: Option<u32>,
}

// ---------------------------------------------------------------------------
// Treasury
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    In,
    Out,
}

/// Ledger entry. Amount is always positive; the kind gives the sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasuryTransaction {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTreasuryTransactionRequest {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreasuryQuery {
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasurySummary {
    pub total_in: f64,
    pub total_out: f64,
    pub balance: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total_in: f64,
    pub total_out: f64,
}

// ---------------------------------------------------------------------------
// Rentals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalPayment {
    pub id: String,
    pub due_date: NaiveDate,
    pub amount: f64,
    pub status: PaymentStatus,
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalUnit {
    pub id: String,
    pub unit_number: String,
    pub tenant_name: String,
    pub rent_amount: f64,
    #[serde(default)]
    pub payments: Vec<RentalPayment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRentalUnitRequest {
    pub unit_number: String,
    pub tenant_name: String,
    pub rent_amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRentalUnitRequest {
    pub unit_number: Option<String>,
    pub tenant_name: Option<String>,
    pub rent_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRentalPaymentRequest {
    pub due_date: NaiveDate,
    /// Defaults to the unit's rent amount
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkPaymentPaidRequest {
    /// Defaults to today
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverduePayment {
    pub unit_id: String,
    pub unit_number: String,
    pub tenant_name: String,
    pub payment: RentalPayment,
    pub days_overdue: i64,
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

/// Recurring service cost (POS licence, music streaming, internet, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub provider: String,
    pub cost: f64,
    pub billing_cycle: BillingCycle,
    pub next_billing_date: NaiveDate,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub name: String,
    #[serde(default)]
    pub provider: String,
    pub cost: f64,
    pub billing_cycle: BillingCycle,
    pub next_billing_date: NaiveDate,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub name: Option<String>,
    pub provider: Option<String>,
    pub cost: Option<f64>,
    pub billing_cycle: Option<BillingCycle>,
    pub next_billing_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub treasury_in: f64,
    pub treasury_out: f64,
    pub treasury_balance: f64,
    pub rental_income: f64,
    pub payroll_cost: f64,
    pub subscription_cost: f64,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    /// Percentage of revenue; 0 when there is no revenue
    pub profit_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub item_id: String,
    pub name: String,
    pub quantity: f64,
    pub min_limit: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiringDocumentAlert {
    pub document_id: String,
    pub title: String,
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
    pub expired: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiringStockAlert {
    pub item_id: String,
    pub name: String,
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardAlerts {
    pub low_stock: Vec<LowStockAlert>,
    pub expiring_documents: Vec<ExpiringDocumentAlert>,
    pub overdue_payments: Vec<OverduePayment>,
    pub expiring_stock: Vec<ExpiringStockAlert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub summary: FinancialSummary,
    pub alerts: DashboardAlerts,
    pub generated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// AI advisor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorResponse {
    pub text: String,
    /// True when the advisor could not be reached and `text` is the stock reply
    pub fallback: bool,
}

// ---------------------------------------------------------------------------
// Device pairing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingStatus {
    Pending,
    Authenticated,
}

/// Short-lived record used to log a second device in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingSession {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: PairingStatus,
    #[serde(default)]
    pub staff_id: Option<String>,
    #[serde(default)]
    pub device_label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePairingRequest {
    #[serde(default)]
    pub device_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingSessionResponse {
    pub id: String,
    pub status: PairingStatus,
    pub expires_at: DateTime<Utc>,
}

impl From<&PairingSession> for PairingSessionResponse {
    fn from(session: &PairingSession) -> Self {
        Self {
            id: session.id.clone(),
            status: session.status,
            expires_at: session.expires_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvImportRequest {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvImportResponse {
    pub created: usize,
    pub updated: usize,
    /// Lines that could not be parsed and were ignored
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvExportResponse {
    pub content: String,
    pub row_count: usize,
}

/// Every collection in one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub inventory: Option<Vec<InventoryItem>>,
    #[serde(default)]
    pub stock_movements: Option<Vec<StockMovement>>,
    #[serde(default)]
    pub assets: Option<Vec<Asset>>,
    /// Public staff views; credentials are never exported
    #[serde(default)]
    pub staff: Option<Vec<StaffProfile>>,
    #[serde(default)]
    pub tasks: Option<Vec<Task>>,
    #[serde(default)]
    pub documents: Option<Vec<Document>>,
    #[serde(default)]
    pub treasury: Option<Vec<TreasuryTransaction>>,
    #[serde(default)]
    pub rentals: Option<Vec<RentalUnit>>,
    #[serde(default)]
    pub subscriptions: Option<Vec<Subscription>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreBackupRequest {
    /// Raw JSON text of a [`BackupDocument`]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreBackupResponse {
    pub restored_collections: Vec<String>,
}

/// JSON body returned with every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Marks a nullable patch field as present so `null` can be told apart from absent
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_item_defaults_missing_fields() {
        let json = r#"{"id":"a","name":"Milk","category":"Dairy","quantity":4,"unit":"L"}"#;
        let item: InventoryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.min_limit, 0.0);
        assert_eq!(item.cost_per_unit, 0.0);
        assert!(item.expiry_date.is_none());
    }

    #[test]
    fn test_treasury_kind_uses_uppercase_type_field() {
        let json = r#"{"id":"t","date":"2025-03-01","type":"OUT","amount":12.5,"category":"Supplies"}"#;
        let tx: TreasuryTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionKind::Out);
        assert!(tx.reference_number.is_none());

        let back = serde_json::to_value(&tx).unwrap();
        assert_eq!(back["type"], "OUT");
    }

    #[test]
    fn test_update_document_null_clears_absent_keeps() {
        let request: UpdateDocumentRequest =
            serde_json::from_str(r#"{"expiry_date":null}"#).unwrap();
        assert_eq!(request.expiry_date, Some(None));
        assert_eq!(request.file_url, None);

        let request: UpdateDocumentRequest =
            serde_json::from_str(r#"{"expiry_date":"2026-01-01","file_url":"x.pdf"}"#).unwrap();
        assert_eq!(request.expiry_date, Some(NaiveDate::from_ymd_opt(2026, 1, 1)));
        assert_eq!(request.file_url, Some(Some("x.pdf".to_string())));

        let item: UpdateInventoryItemRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(item.expiry_date, None);
    }

    #[test]
    fn test_document_defaults_reminder_window() {
        let json = r#"{"id":"d","title":"Health permit","type":"permit"}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.remind_before_days, 30);
        assert!(doc.expiry_date.is_none());
    }

    #[test]
    fn test_staff_profile_omits_password_hash() {
        let staff = Staff {
            id: "s1".to_string(),
            name: "Ana".to_string(),
            username: "ana".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Barista,
            hourly_rate: 12.0,
            is_clocked_in: false,
            last_clock_in: None,
            attendance_history: vec![],
            total_monthly_earnings: 0.0,
            total_monthly_hours: 0.0,
            documents: vec![],
            permissions: vec![Permission::Inventory],
        };
        let profile = StaffProfile::from(&staff);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2"));
        assert_eq!(profile.permissions, vec![Permission::Inventory]);
    }

    #[test]
    fn test_subscription_defaults_active() {
        let json = r#"{"id":"x","name":"POS","cost":240,"billing_cycle":"yearly","next_billing_date":"2025-01-01"}"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert!(sub.active);
        assert_eq!(sub.billing_cycle, BillingCycle::Yearly);
    }
}
