//! Equipment register with an append-only maintenance log per asset.

use chrono::{Duration, NaiveDate};
use log::info;
use shared::{
    Asset, AssetStatus, CreateAssetRequest, MaintenanceRecord, RecordMaintenanceRequest,
    UpdateAssetRequest,
};
use uuid::Uuid;

use crate::domain::error::{require_non_negative, require_text, DomainError, DomainResult};
use crate::storage::{CollectionRepository, StoreConnection};

/// Last date the asset was serviced, or its purchase date if never serviced
pub fn last_serviced(asset: &Asset) -> NaiveDate {
    asset.maintenance_date.unwrap_or(asset.purchase_date)
}

#[derive(Clone)]
pub struct AssetService {
    assets: CollectionRepository<Asset>,
}

impl AssetService {
    pub fn new(connection: &StoreConnection) -> Self {
        Self {
            assets: connection.repository(),
        }
    }

    pub async fn create_asset(&self, request: CreateAssetRequest) -> DomainResult<Asset> {
        let asset = Asset {
            id: Uuid::new_v4().to_string(),
            name: require_text("Name", &request.name)?,
            purchase_date: request.purchase_date,
            maintenance_date: None,
            cost: require_non_negative("Cost", request.cost)?,
            status: request.status.unwrap_or(AssetStatus::Active),
            maintenance_history: Vec::new(),
        };
        let asset = self.assets.insert(asset).await?;
        info!("Registered asset {} ({})", asset.name, asset.id);
        Ok(asset)
    }

    pub async fn list_assets(&self) -> DomainResult<Vec<Asset>> {
        let mut assets = self.assets.load_all().await?;
        assets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(assets)
    }

    pub async fn get_asset(&self, id: &str) -> DomainResult<Asset> {
        self.assets
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Asset", id))
    }

    pub async fn update_asset(&self, id: &str, request: UpdateAssetRequest) -> DomainResult<Asset> {
        self.assets
            .mutate(|assets| {
                let asset = assets
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or_else(|| DomainError::not_found("Asset", id))?;
                if let Some(name) = request.name {
                    asset.name = require_text("Name", &name)?;
                }
                if let Some(cost) = request.cost {
                    asset.cost = require_non_negative("Cost", cost)?;
                }
                if let Some(status) = request.status {
                    asset.status = status;
                }
                Ok(asset.clone())
            })
            .await
    }

    pub async fn delete_asset(&self, id: &str) -> DomainResult<()> {
        if !self.assets.delete(id).await? {
            return Err(DomainError::not_found("Asset", id));
        }
        Ok(())
    }

    /// Append a maintenance record and move the asset's maintenance date forward
    ///
    /// Back-dated records are logged but never move the maintenance date back.
    pub async fn record_maintenance(
        &self,
        id: &str,
        request: RecordMaintenanceRequest,
    ) -> DomainResult<Asset> {
        let description = require_text("Description", &request.description)?;
        let cost = require_non_negative("Cost", request.cost)?;

        let asset = self
            .assets
            .mutate(|assets| {
                let asset = assets
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or_else(|| DomainError::not_found("Asset", id))?;
                if asset.status == AssetStatus::Retired {
                    return Err(DomainError::InvalidState(format!(
                        "Asset '{}' is retired",
                        asset.name
                    )));
                }

                asset.maintenance_history.push(MaintenanceRecord {
                    id: Uuid::new_v4().to_string(),
                    date: request.date,
                    description,
                    cost,
                });
                if asset.maintenance_date.map_or(true, |d| request.date > d) {
                    asset.maintenance_date = Some(request.date);
                }
                asset.status = AssetStatus::Active;
                Ok(asset.clone())
            })
            .await?;

        info!("Recorded maintenance on {} ({})", asset.name, request.date);
        Ok(asset)
    }

    /// Active assets not serviced within `interval_days` of `today`
    pub async fn maintenance_due(
        &self,
        today: NaiveDate,
        interval_days: i64,
    ) -> DomainResult<Vec<Asset>> {
        let cutoff = today - Duration::days(interval_days);
        Ok(self
            .list_assets()
            .await?
            .into_iter()
            .filter(|a| a.status != AssetStatus::Retired && last_serviced(a) <= cutoff)
            .collect())
    }
}
