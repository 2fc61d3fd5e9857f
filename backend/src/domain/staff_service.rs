//! Staff records, attendance and earnings accrual.
//!
//! Accrual happens at clock-out: the hours since the matching clock-in are
//! multiplied by the hourly rate and added to the running monthly totals.
//! The OUT entry in the attendance history carries the same hours and pay,
//! so the totals for any month can be rebuilt from the history alone.

use anyhow::anyhow;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Datelike, Utc};
use log::{info, warn};
use shared::{
    AddStaffDocumentRequest, AttendanceLog, ClockDirection, ClockResponse, CreateStaffRequest,
    PayrollLine, PayrollSummary, Staff, StaffDocument, StaffProfile, UpdateStaffRequest,
};
use uuid::Uuid;

use crate::domain::calculations::{hours_between, round_cents};
use crate::domain::error::{require_non_negative, require_text, DomainError, DomainResult};
use crate::storage::{CollectionRepository, StoreConnection};

const MIN_PASSWORD_LENGTH: usize = 4;

/// Apply a clock event to a staff record and return the appended log entry
pub fn apply_clock_event(
    staff: &mut Staff,
    direction: ClockDirection,
    now: DateTime<Utc>,
) -> DomainResult<AttendanceLog> {
    let entry = match direction {
        ClockDirection::In => {
            if staff.is_clocked_in {
                return Err(DomainError::InvalidState(format!(
                    "{} is already clocked in",
                    staff.name
                )));
            }
            staff.is_clocked_in = true;
            staff.last_clock_in = Some(now);
            AttendanceLog {
                kind: ClockDirection::In,
                timestamp: now,
                hours: 0.0,
                earned_amount: 0.0,
            }
        }
        ClockDirection::Out => {
            let clocked_in_at = match (staff.is_clocked_in, staff.last_clock_in) {
                (true, Some(at)) => at,
                _ => {
                    return Err(DomainError::InvalidState(format!(
                        "{} is not clocked in",
                        staff.name
                    )))
                }
            };
            // Keep the history chronological even if the wall clock stepped back
            let timestamp = now.max(clocked_in_at);
            let raw_hours = hours_between(clocked_in_at, timestamp);
            let hours = round_cents(raw_hours);
            let earned = round_cents(raw_hours * staff.hourly_rate);

            staff.is_clocked_in = false;
            staff.total_monthly_hours = round_cents(staff.total_monthly_hours + hours);
            staff.total_monthly_earnings = round_cents(staff.total_monthly_earnings + earned);
            AttendanceLog {
                kind: ClockDirection::Out,
                timestamp,
                hours,
                earned_amount: earned,
            }
        }
    };

    staff.attendance_history.push(entry.clone());
    Ok(entry)
}

/// Hours and earnings of the shifts closed in a given month
pub fn monthly_totals(history: &[AttendanceLog], year: i32, month: u32) -> (f64, f64) {
    let (hours, earned) = history
        .iter()
        .filter(|log| log.kind == ClockDirection::Out)
        .filter(|log| log.timestamp.year() == year && log.timestamp.month() == month)
        .fold((0.0, 0.0), |(h, e), log| (h + log.hours, e + log.earned_amount));
    (round_cents(hours), round_cents(earned))
}

fn hash_password(password: &str) -> DomainResult<String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| anyhow!("Failed to encode salt: {}", e))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn find_staff<'a>(staff: &'a mut [Staff], id: &str) -> DomainResult<&'a mut Staff> {
    staff
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| DomainError::not_found("Staff member", id))
}

#[derive(Clone)]
pub struct StaffService {
    staff: CollectionRepository<Staff>,
}

impl StaffService {
    pub fn new(connection: &StoreConnection) -> Self {
        Self {
            staff: connection.repository(),
        }
    }

    pub async fn create_staff(&self, request: CreateStaffRequest) -> DomainResult<StaffProfile> {
        let username = require_text("Username", &request.username)?.to_lowercase();
        let record = Staff {
            id: Uuid::new_v4().to_string(),
            name: require_text("Name", &request.name)?,
            username,
            password_hash: hash_password(&request.password)?,
            role: request.role,
            hourly_rate: require_non_negative("Hourly rate", request.hourly_rate)?,
            is_clocked_in: false,
            last_clock_in: None,
            attendance_history: Vec::new(),
            total_monthly_earnings: 0.0,
            total_monthly_hours: 0.0,
            documents: Vec::new(),
            permissions: request.permissions,
        };

        let profile = self
            .staff
            .mutate(|staff| {
                if staff.iter().any(|s| s.username == record.username) {
                    return Err(DomainError::Validation(format!(
                        "Username '{}' is already taken",
                        record.username
                    )));
                }
                let profile = StaffProfile::from(&record);
                staff.push(record);
                Ok(profile)
            })
            .await?;

        info!("Created staff member {} ({:?})", profile.name, profile.role);
        Ok(profile)
    }

    pub async fn list_staff(&self) -> DomainResult<Vec<StaffProfile>> {
        let mut staff = self.staff.load_all().await?;
        staff.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(staff.iter().map(StaffProfile::from).collect())
    }

    pub async fn get_staff(&self, id: &str) -> DomainResult<StaffProfile> {
        self.staff
            .get(id)
            .await?
            .map(|s| StaffProfile::from(&s))
            .ok_or_else(|| DomainError::not_found("Staff member", id))
    }

    pub async fn update_staff(
        &self,
        id: &str,
        request: UpdateStaffRequest,
    ) -> DomainResult<StaffProfile> {
        let new_hash = match request.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        self.staff
            .mutate(|staff| {
                let member = find_staff(staff, id)?;
                if let Some(name) = request.name {
                    member.name = require_text("Name", &name)?;
                }
                if let Some(role) = request.role {
                    member.role = role;
                }
                if let Some(rate) = request.hourly_rate {
                    member.hourly_rate = require_non_negative("Hourly rate", rate)?;
                }
                if let Some(permissions) = request.permissions {
                    member.permissions = permissions;
                }
                if let Some(hash) = new_hash {
                    member.password_hash = hash;
                }
                Ok(StaffProfile::from(&*member))
            })
            .await
    }

    pub async fn delete_staff(&self, id: &str) -> DomainResult<()> {
        if !self.staff.delete(id).await? {
            return Err(DomainError::not_found("Staff member", id));
        }
        info!("Deleted staff member {}", id);
        Ok(())
    }

    /// Clock a staff member in or out at the current time
    pub async fn clock(&self, id: &str, direction: ClockDirection) -> DomainResult<ClockResponse> {
        self.clock_at(id, direction, Utc::now()).await
    }

    pub async fn clock_at(
        &self,
        id: &str,
        direction: ClockDirection,
        now: DateTime<Utc>,
    ) -> DomainResult<ClockResponse> {
        let response = self
            .staff
            .mutate(|staff| {
                let member = find_staff(staff, id)?;
                let entry = apply_clock_event(member, direction, now)?;
                Ok::<_, DomainError>(ClockResponse {
                    profile: StaffProfile::from(&*member),
                    entry,
                })
            })
            .await?;

        info!(
            "{} clocked {:?}: {:.2}h, earned {:.2}",
            response.profile.name, direction, response.entry.hours, response.entry.earned_amount
        );
        Ok(response)
    }

    /// Rebuild a staff member's running totals from the attendance history
    pub async fn recompute_monthly_totals(
        &self,
        id: &str,
        year: i32,
        month: u32,
    ) -> DomainResult<StaffProfile> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::Validation(format!("Invalid month: {}", month)));
        }

        self.staff
            .mutate(|staff| {
                let member = find_staff(staff, id)?;
                let (hours, earned) = monthly_totals(&member.attendance_history, year, month);
                if (hours, earned) != (member.total_monthly_hours, member.total_monthly_earnings) {
                    warn!(
                        "Totals for {} drifted: stored {:.2}h/{:.2}, history {:.2}h/{:.2}",
                        member.name,
                        member.total_monthly_hours,
                        member.total_monthly_earnings,
                        hours,
                        earned
                    );
                }
                member.total_monthly_hours = hours;
                member.total_monthly_earnings = earned;
                Ok(StaffProfile::from(&*member))
            })
            .await
    }

    /// Zero every staff member's running totals (month close)
    /// Returns the number of records reset
    pub async fn reset_monthly_totals(&self) -> DomainResult<usize> {
        let count = self
            .staff
            .mutate(|staff| {
                for member in staff.iter_mut() {
                    member.total_monthly_hours = 0.0;
                    member.total_monthly_earnings = 0.0;
                }
                Ok::<_, DomainError>(staff.len())
            })
            .await?;
        info!("Reset monthly totals for {} staff members", count);
        Ok(count)
    }

    pub async fn payroll_summary(&self) -> DomainResult<PayrollSummary> {
        let staff = self.staff.load_all().await?;
        Ok(build_payroll_summary(&staff))
    }

    pub async fn add_document(
        &self,
        id: &str,
        request: AddStaffDocumentRequest,
    ) -> DomainResult<StaffProfile> {
        let document = StaffDocument {
            id: Uuid::new_v4().to_string(),
            title: require_text("Title", &request.title)?,
            expiry_date: request.expiry_date,
            file_url: request.file_url,
        };
        self.staff
            .mutate(|staff| {
                let member = find_staff(staff, id)?;
                member.documents.push(document);
                Ok(StaffProfile::from(&*member))
            })
            .await
    }

    pub async fn remove_document(&self, id: &str, document_id: &str) -> DomainResult<StaffProfile> {
        self.staff
            .mutate(|staff| {
                let member = find_staff(staff, id)?;
                let before = member.documents.len();
                member.documents.retain(|d| d.id != document_id);
                if member.documents.len() == before {
                    return Err(DomainError::not_found("Staff document", document_id));
                }
                Ok(StaffProfile::from(&*member))
            })
            .await
    }

    /// Check a username/password pair
    pub async fn authenticate(&self, username: &str, password: &str) -> DomainResult<StaffProfile> {
        let username = username.trim().to_lowercase();
        let staff = self.staff.load_all().await?;
        match staff.iter().find(|s| s.username == username) {
            Some(member) if verify_password(password, &member.password_hash) => {
                info!("{} signed in", member.name);
                Ok(StaffProfile::from(member))
            }
            _ => {
                warn!("Failed sign-in attempt for '{}'", username);
                Err(DomainError::Unauthorized)
            }
        }
    }
}

/// One payroll line per staff member from their running totals
pub fn build_payroll_summary(staff: &[Staff]) -> PayrollSummary {
    let mut lines: Vec<PayrollLine> = staff
        .iter()
        .map(|s| PayrollLine {
            staff_id: s.id.clone(),
            name: s.name.clone(),
            role: s.role,
            hourly_rate: s.hourly_rate,
            total_hours: s.total_monthly_hours,
            total_earnings: s.total_monthly_earnings,
        })
        .collect();
    lines.sort_by(|a, b| a.name.cmp(&b.name));

    let total_hours = round_cents(lines.iter().map(|l| l.total_hours).sum());
    let total_cost = round_cents(lines.iter().map(|l| l.total_earnings).sum());
    PayrollSummary {
        lines,
        total_hours,
        total_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::memory_connection;
    use chrono::TimeZone;
    use shared::{Permission, Role};

    async fn create_test_service() -> StaffService {
        StaffService::new(&memory_connection().await)
    }

    fn barista(username: &str, rate: f64) -> CreateStaffRequest {
        CreateStaffRequest {
            name: format!("Barista {}", username),
            username: username.to_string(),
            password: "latte-art".to_string(),
            role: Role::Barista,
            hourly_rate: rate,
            permissions: vec![Permission::Inventory],
        }
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, minute, 0).unwrap()
    }

    fn bare_staff(rate: f64) -> Staff {
        Staff {
            id: "s".to_string(),
            name: "Sam".to_string(),
            username: "sam".to_string(),
            password_hash: String::new(),
            role: Role::Cashier,
            hourly_rate: rate,
            is_clocked_in: false,
            last_clock_in: None,
            attendance_history: vec![],
            total_monthly_earnings: 0.0,
            total_monthly_hours: 0.0,
            documents: vec![],
            permissions: vec![],
        }
    }

    #[test]
    fn test_in_then_out_appends_two_entries_in_order() {
        let mut staff = bare_staff(12.0);

        apply_clock_event(&mut staff, ClockDirection::In, at(1, 8, 0)).unwrap();
        let out = apply_clock_event(&mut staff, ClockDirection::Out, at(1, 16, 30)).unwrap();

        assert!(!staff.is_clocked_in);
        assert_eq!(staff.attendance_history.len(), 2);
        assert_eq!(staff.attendance_history[0].kind, ClockDirection::In);
        assert_eq!(staff.attendance_history[1].kind, ClockDirection::Out);
        assert!(staff.attendance_history[0].timestamp <= staff.attendance_history[1].timestamp);
        assert_eq!(out.hours, 8.5);
        assert_eq!(out.earned_amount, 102.0);
        assert_eq!(staff.total_monthly_hours, 8.5);
        assert_eq!(staff.total_monthly_earnings, 102.0);
    }

    #[test]
    fn test_double_clock_in_and_out_without_in_rejected() {
        let mut staff = bare_staff(10.0);
        assert!(matches!(
            apply_clock_event(&mut staff, ClockDirection::Out, at(1, 9, 0)),
            Err(DomainError::InvalidState(_))
        ));

        apply_clock_event(&mut staff, ClockDirection::In, at(1, 9, 0)).unwrap();
        assert!(matches!(
            apply_clock_event(&mut staff, ClockDirection::In, at(1, 10, 0)),
            Err(DomainError::InvalidState(_))
        ));
        assert_eq!(staff.attendance_history.len(), 1);
    }

    #[test]
    fn test_clock_out_before_clock_in_time_earns_nothing() {
        let mut staff = bare_staff(10.0);
        apply_clock_event(&mut staff, ClockDirection::In, at(2, 9, 0)).unwrap();
        let out = apply_clock_event(&mut staff, ClockDirection::Out, at(2, 8, 0)).unwrap();

        assert_eq!(out.hours, 0.0);
        assert_eq!(out.earned_amount, 0.0);
        assert_eq!(out.timestamp, at(2, 9, 0));
    }

    #[test]
    fn test_monthly_totals_only_count_out_entries_in_month() {
        let mut staff = bare_staff(20.0);
        apply_clock_event(&mut staff, ClockDirection::In, at(3, 8, 0)).unwrap();
        apply_clock_event(&mut staff, ClockDirection::Out, at(3, 12, 0)).unwrap();
        apply_clock_event(&mut staff, ClockDirection::In, at(4, 8, 0)).unwrap();
        apply_clock_event(&mut staff, ClockDirection::Out, at(4, 10, 15)).unwrap();

        assert_eq!(monthly_totals(&staff.attendance_history, 2025, 3), (6.25, 125.0));
        assert_eq!(monthly_totals(&staff.attendance_history, 2025, 4), (0.0, 0.0));
    }

    #[tokio::test]
    async fn test_clock_cycle_through_service() {
        let service = create_test_service().await;
        let profile = service.create_staff(barista("ana", 15.0)).await.unwrap();

        let clocked_in = service
            .clock_at(&profile.id, ClockDirection::In, at(5, 7, 0))
            .await
            .unwrap();
        assert!(clocked_in.profile.is_clocked_in);
        assert_eq!(clocked_in.profile.last_clock_in, Some(at(5, 7, 0)));

        let clocked_out = service
            .clock_at(&profile.id, ClockDirection::Out, at(5, 11, 0))
            .await
            .unwrap();
        assert!(!clocked_out.profile.is_clocked_in);
        assert_eq!(clocked_out.entry.earned_amount, 60.0);

        let stored = service.get_staff(&profile.id).await.unwrap();
        assert_eq!(stored.attendance_history.len(), 2);
        assert_eq!(stored.total_monthly_earnings, 60.0);
        assert_eq!(stored.total_monthly_hours, 4.0);
    }

    #[tokio::test]
    async fn test_recompute_repairs_drifted_totals() {
        let service = create_test_service().await;
        let profile = service.create_staff(barista("ben", 10.0)).await.unwrap();
        service.clock_at(&profile.id, ClockDirection::In, at(6, 9, 0)).await.unwrap();
        service.clock_at(&profile.id, ClockDirection::Out, at(6, 12, 0)).await.unwrap();

        // Simulate drift from an external edit
        service
            .staff
            .mutate(|staff| {
                staff[0].total_monthly_earnings = 999.0;
                Ok::<_, DomainError>(())
            })
            .await
            .unwrap();

        let repaired = service.recompute_monthly_totals(&profile.id, 2025, 3).await.unwrap();
        assert_eq!(repaired.total_monthly_earnings, 30.0);
        assert_eq!(repaired.total_monthly_hours, 3.0);

        assert!(matches!(
            service.recompute_monthly_totals(&profile.id, 2025, 13).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_payroll_summary_and_reset() {
        let service = create_test_service().await;
        let ana = service.create_staff(barista("ana", 12.0)).await.unwrap();
        let ben = service.create_staff(barista("ben", 14.0)).await.unwrap();
        for (id, hours) in [(&ana.id, 2), (&ben.id, 5)] {
            service.clock_at(id, ClockDirection::In, at(7, 8, 0)).await.unwrap();
            service.clock_at(id, ClockDirection::Out, at(7, 8 + hours, 0)).await.unwrap();
        }

        let summary = service.payroll_summary().await.unwrap();
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.total_hours, 7.0);
        assert_eq!(summary.total_cost, 24.0 + 70.0);

        assert_eq!(service.reset_monthly_totals().await.unwrap(), 2);
        assert_eq!(service.payroll_summary().await.unwrap().total_cost, 0.0);
        // History survives the reset
        assert_eq!(service.get_staff(&ana.id).await.unwrap().attendance_history.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let service = create_test_service().await;
        service.create_staff(barista("ana", 12.0)).await.unwrap();
        let result = service.create_staff(barista("ANA", 12.0)).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let service = create_test_service().await;
        let profile = service.create_staff(barista("cleo", 12.0)).await.unwrap();

        let signed_in = service.authenticate("Cleo", "latte-art").await.unwrap();
        assert_eq!(signed_in.id, profile.id);

        assert!(matches!(
            service.authenticate("cleo", "wrong").await,
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            service.authenticate("nobody", "latte-art").await,
            Err(DomainError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_update_password_and_documents() {
        let service = create_test_service().await;
        let profile = service.create_staff(barista("dan", 12.0)).await.unwrap();

        service
            .update_staff(
                &profile.id,
                UpdateStaffRequest {
                    password: Some("new-secret".to_string()),
                    hourly_rate: Some(13.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(service.authenticate("dan", "new-secret").await.is_ok());
        assert!(service.authenticate("dan", "latte-art").await.is_err());

        let with_doc = service
            .add_document(
                &profile.id,
                AddStaffDocumentRequest {
                    title: "Food handler card".to_string(),
                    expiry_date: None,
                    file_url: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(with_doc.hourly_rate, 13.5);
        let doc_id = with_doc.documents[0].id.clone();

        let without = service.remove_document(&profile.id, &doc_id).await.unwrap();
        assert!(without.documents.is_empty());
        assert!(matches!(
            service.remove_document(&profile.id, &doc_id).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let service = create_test_service().await;
        let mut request = barista("eve", 12.0);
        request.password = "abc".to_string();
        assert!(matches!(
            service.create_staff(request).await,
            Err(DomainError::Validation(_))
        ));
    }
}
