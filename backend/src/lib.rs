//! # Café Manager Backend
//!
//! Server side of the café management dashboard: inventory, staff
//! attendance and payroll, tasks, compliance documents, treasury, rentals,
//! subscriptions and reports.
//!
//! ## Architecture
//!
//! ```text
//! Browser / tablet UI
//!     ↓
//! IO Layer (REST API under /api)
//!     ↓
//! Domain Layer (services, calculations)
//!     ↓
//! Storage Layer (one JSON blob per collection, SQLite or files)
//! ```
//!
//! The server is the only writer. Devices talk to the API and every
//! read-modify-write of a collection is serialized by the storage layer.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::domain::{
    AdvisorService, AssetService, DashboardService, DocumentService, ExportService,
    HttpAdvisorClient, InventoryService, PairingService, RentalService, StaffService,
    SubscriptionService, TaskService, TreasuryService,
};
use crate::storage::StoreConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub inventory_service: InventoryService,
    pub asset_service: AssetService,
    pub staff_service: StaffService,
    pub task_service: TaskService,
    pub document_service: DocumentService,
    pub treasury_service: TreasuryService,
    pub rental_service: RentalService,
    pub subscription_service: SubscriptionService,
    pub dashboard_service: DashboardService,
    pub advisor_service: AdvisorService,
    pub pairing_service: PairingService,
    pub export_service: ExportService,
}

impl AppState {
    /// Wire every service to one storage connection
    pub fn new(connection: StoreConnection, config: AppConfig) -> Result<Self> {
        config.validate()?;
        let staff_service = StaffService::new(&connection);
        let dashboard_service = DashboardService::new(&connection, config.alert_window_days);
        let advisor_client = HttpAdvisorClient::new(&config.advisor)?;

        Ok(Self {
            inventory_service: InventoryService::new(&connection),
            asset_service: AssetService::new(&connection),
            task_service: TaskService::new(&connection),
            document_service: DocumentService::new(&connection),
            treasury_service: TreasuryService::new(&connection),
            rental_service: RentalService::new(&connection),
            subscription_service: SubscriptionService::new(&connection),
            advisor_service: AdvisorService::new(Arc::new(advisor_client), dashboard_service.clone()),
            pairing_service: PairingService::new(
                &connection,
                staff_service.clone(),
                config.pairing_ttl_seconds,
            ),
            export_service: ExportService::new(&connection),
            dashboard_service,
            staff_service,
            config: Arc::new(config),
        })
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: AppConfig) -> Result<AppState> {
    info!("Setting up storage");
    let connection = StoreConnection::open(&config).await?;

    info!("Setting up domain services");
    AppState::new(connection, config)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Result<Router> {
    // CORS setup to allow the dashboard frontend to make requests
    let origin = app_state
        .config
        .frontend_origin
        .parse::<HeaderValue>()
        .with_context(|| {
            format!(
                "Invalid frontend origin '{}'",
                app_state.config.frontend_origin
            )
        })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Ok(Router::new()
        .nest("/api", io::rest::api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
