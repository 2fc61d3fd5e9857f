//! # Domain Layer
//!
//! Business rules of the café dashboard. Each service owns the repositories
//! for the collections it manages and is cheap to clone; the REST layer
//! holds one instance of each in the application state.
//!
//! Pure calculations (accrual, financial reducers, alert filters) are free
//! functions so they can be tested without storage.

pub mod advisor_service;
pub mod asset_service;
pub mod calculations;
pub mod dashboard_service;
pub mod document_service;
pub mod error;
pub mod export_service;
pub mod inventory_service;
pub mod pairing_service;
pub mod rental_service;
pub mod staff_service;
pub mod subscription_service;
pub mod task_service;
pub mod treasury_service;

pub use advisor_service::{AdvisorClient, AdvisorService, HttpAdvisorClient};
pub use asset_service::AssetService;
pub use dashboard_service::DashboardService;
pub use document_service::DocumentService;
pub use error::{DomainError, DomainResult};
pub use export_service::ExportService;
pub use inventory_service::InventoryService;
pub use pairing_service::PairingService;
pub use rental_service::RentalService;
pub use staff_service::StaffService;
pub use subscription_service::SubscriptionService;
pub use task_service::TaskService;
pub use treasury_service::TreasuryService;
