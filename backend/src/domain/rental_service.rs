//! Rented-out units and their rent payment schedule.

use chrono::{NaiveDate, Utc};
use log::info;
use shared::{
    AddRentalPaymentRequest, CreateRentalUnitRequest, OverduePayment, PaymentStatus,
    RentalPayment, RentalUnit, UpdateRentalUnitRequest,
};
use uuid::Uuid;

use crate::domain::calculations::{days_until, round_cents};
use crate::domain::error::{require_non_negative, require_positive, require_text, DomainError, DomainResult};
use crate::storage::{CollectionRepository, StoreConnection};

/// Pending payments whose due date is before `today`, most overdue first
pub fn overdue_payments(units: &[RentalUnit], today: NaiveDate) -> Vec<OverduePayment> {
    let mut overdue: Vec<OverduePayment> = units
        .iter()
        .flat_map(|unit| {
            unit.payments
                .iter()
                .filter(|p| p.status == PaymentStatus::Pending && p.due_date < today)
                .map(move |p| OverduePayment {
                    unit_id: unit.id.clone(),
                    unit_number: unit.unit_number.clone(),
                    tenant_name: unit.tenant_name.clone(),
                    payment: p.clone(),
                    days_overdue: -days_until(today, p.due_date),
                })
        })
        .collect();
    overdue.sort_by(|a, b| b.days_overdue.cmp(&a.days_overdue));
    overdue
}

/// Sum of all paid rental payments
pub fn paid_income(units: &[RentalUnit]) -> f64 {
    round_cents(
        units
            .iter()
            .flat_map(|u| u.payments.iter())
            .filter(|p| p.status == PaymentStatus::Paid)
            .map(|p| p.amount)
            .sum(),
    )
}

fn find_unit<'a>(units: &'a mut [RentalUnit], id: &str) -> DomainResult<&'a mut RentalUnit> {
    units
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| DomainError::not_found("Rental unit", id))
}

#[derive(Clone)]
pub struct RentalService {
    units: CollectionRepository<RentalUnit>,
}

impl RentalService {
    pub fn new(connection: &StoreConnection) -> Self {
        Self {
            units: connection.repository(),
        }
    }

    pub async fn create_unit(&self, request: CreateRentalUnitRequest) -> DomainResult<RentalUnit> {
        let unit = RentalUnit {
            id: Uuid::new_v4().to_string(),
            unit_number: require_text("Unit number", &request.unit_number)?,
            tenant_name: require_text("Tenant name", &request.tenant_name)?,
            rent_amount: require_non_negative("Rent amount", request.rent_amount)?,
            payments: Vec::new(),
        };
        let unit = self.units.insert(unit).await?;
        info!("Added rental unit {} ({})", unit.unit_number, unit.tenant_name);
        Ok(unit)
    }

    pub async fn list_units(&self) -> DomainResult<Vec<RentalUnit>> {
        let mut units = self.units.load_all().await?;
        units.sort_by(|a, b| a.unit_number.cmp(&b.unit_number));
        Ok(units)
    }

    pub async fn get_unit(&self, id: &str) -> DomainResult<RentalUnit> {
        self.units
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Rental unit", id))
    }

    pub async fn update_unit(
        &self,
        id: &str,
        request: UpdateRentalUnitRequest,
    ) -> DomainResult<RentalUnit> {
        self.units
            .mutate(|units| {
                let unit = find_unit(units, id)?;
                if let Some(number) = request.unit_number {
                    unit.unit_number = require_text("Unit number", &number)?;
                }
                if let Some(tenant) = request.tenant_name {
                    unit.tenant_name = require_text("Tenant name", &tenant)?;
                }
                if let Some(rent) = request.rent_amount {
                    unit.rent_amount = require_non_negative("Rent amount", rent)?;
                }
                Ok(unit.clone())
            })
            .await
    }

    pub async fn delete_unit(&self, id: &str) -> DomainResult<()> {
        if !self.units.delete(id).await? {
            return Err(DomainError::not_found("Rental unit", id));
        }
        Ok(())
    }

    /// Schedule a payment; the amount defaults to the unit's rent
    pub async fn add_payment(
        &self,
        unit_id: &str,
        request: AddRentalPaymentRequest,
    ) -> DomainResult<RentalUnit> {
        let amount = match request.amount {
            Some(amount) => Some(require_positive("Amount", amount)?),
            None => None,
        };
        self.units
            .mutate(|units| {
                let unit = find_unit(units, unit_id)?;
                unit.payments.push(RentalPayment {
                    id: Uuid::new_v4().to_string(),
                    due_date: request.due_date,
                    amount: amount.unwrap_or(unit.rent_amount),
                    status: PaymentStatus::Pending,
                    paid_date: None,
                });
                unit.payments.sort_by_key(|p| p.due_date);
                Ok(unit.clone())
            })
            .await
    }

    pub async fn mark_paid(
        &self,
        unit_id: &str,
        payment_id: &str,
        paid_date: Option<NaiveDate>,
    ) -> DomainResult<RentalUnit> {
        let paid_date = paid_date.unwrap_or_else(|| Utc::now().date_naive());
        let unit = self
            .units
            .mutate(|units| {
                let unit = find_unit(units, unit_id)?;
                let payment = unit
                    .payments
                    .iter_mut()
                    .find(|p| p.id == payment_id)
                    .ok_or_else(|| DomainError::not_found("Payment", payment_id))?;
                if payment.status == PaymentStatus::Paid {
                    return Err(DomainError::InvalidState(format!(
                        "Payment due {} is already paid",
                        payment.due_date
                    )));
                }
                payment.status = PaymentStatus::Paid;
                payment.paid_date = Some(paid_date);
                Ok(unit.clone())
            })
            .await?;
        info!("Unit {} payment {} marked paid", unit.unit_number, payment_id);
        Ok(unit)
    }

    pub async fn overdue(&self, today: NaiveDate) -> DomainResult<Vec<OverduePayment>> {
        Ok(overdue_payments(&self.units.load_all().await?, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::memory_connection;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    async fn service_with_unit() -> (RentalService, RentalUnit) {
        let service = RentalService::new(&memory_connection().await);
        let unit = service
            .create_unit(CreateRentalUnitRequest {
                unit_number: "2B".to_string(),
                tenant_name: "Flower shop".to_string(),
                rent_amount: 300.0,
            })
            .await
            .unwrap();
        (service, unit)
    }

    #[tokio::test]
    async fn test_payment_defaults_to_rent_amount() {
        let (service, unit) = service_with_unit().await;
        let unit = service
            .add_payment(&unit.id, AddRentalPaymentRequest { due_date: date(3, 1), amount: None })
            .await
            .unwrap();
        assert_eq!(unit.payments[0].amount, 300.0);
        assert_eq!(unit.payments[0].status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_overdue_and_mark_paid() {
        let (service, unit) = service_with_unit().await;
        for due in [date(1, 1), date(2, 1), date(4, 1)] {
            service
                .add_payment(&unit.id, AddRentalPaymentRequest { due_date: due, amount: None })
                .await
                .unwrap();
        }
        let today = date(3, 1);

        let overdue = service.overdue(today).await.unwrap();
        assert_eq!(overdue.len(), 2);
        assert_eq!(overdue[0].payment.due_date, date(1, 1));
        assert_eq!(overdue[0].days_overdue, 59);
        assert_eq!(overdue[1].days_overdue, 28);

        let first = overdue[0].payment.id.clone();
        let updated = service.mark_paid(&unit.id, &first, Some(date(3, 1))).await.unwrap();
        assert_eq!(paid_income(&[updated]), 300.0);
        assert_eq!(service.overdue(today).await.unwrap().len(), 1);

        assert!(matches!(
            service.mark_paid(&unit.id, &first, None).await,
            Err(DomainError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_due_today_is_not_overdue() {
        let (service, unit) = service_with_unit().await;
        service
            .add_payment(&unit.id, AddRentalPaymentRequest { due_date: date(3, 1), amount: Some(150.0) })
            .await
            .unwrap();
        assert!(service.overdue(date(3, 1)).await.unwrap().is_empty());
    }
}
