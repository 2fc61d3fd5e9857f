//! Second-device login.
//!
//! A new device creates a short-lived pairing session and shows its id
//! (typically as a QR code). A signed-in device authenticates the session
//! with staff credentials, and the new device then claims it to receive the
//! staff profile. Sessions expire after the configured TTL.

use chrono::{DateTime, Duration, Utc};
use log::info;
use shared::{PairingSession, PairingSessionResponse, PairingStatus, StaffProfile};
use uuid::Uuid;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::staff_service::StaffService;
use crate::storage::{CollectionRepository, StoreConnection};

#[derive(Clone)]
pub struct PairingService {
    sessions: CollectionRepository<PairingSession>,
    staff: StaffService,
    ttl: Duration,
}

impl PairingService {
    pub fn new(connection: &StoreConnection, staff: StaffService, ttl_seconds: i64) -> Self {
        Self {
            sessions: connection.repository(),
            staff,
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    pub async fn create_session(
        &self,
        device_label: Option<String>,
    ) -> DomainResult<PairingSessionResponse> {
        self.create_session_at(device_label, Utc::now()).await
    }

    pub async fn create_session_at(
        &self,
        device_label: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<PairingSessionResponse> {
        let session = PairingSession {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            expires_at: now + self.ttl,
            status: PairingStatus::Pending,
            staff_id: None,
            device_label: device_label
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        };
        let response = self
            .sessions
            .mutate(|sessions| {
                sessions.retain(|s| s.expires_at > now);
                let response = PairingSessionResponse::from(&session);
                sessions.push(session);
                Ok::<_, DomainError>(response)
            })
            .await?;
        info!("Opened pairing session {}", response.id);
        Ok(response)
    }

    /// Current status; an expired session is removed and reported missing
    pub async fn status(&self, id: &str) -> DomainResult<PairingSessionResponse> {
        self.status_at(id, Utc::now()).await
    }

    pub async fn status_at(&self, id: &str, now: DateTime<Utc>) -> DomainResult<PairingSessionResponse> {
        self.with_live_session(id, now, |sessions, index| {
            Ok(PairingSessionResponse::from(&sessions[index]))
        })
        .await
    }

    /// Approve a pending session with staff credentials
    pub async fn authenticate(
        &self,
        id: &str,
        username: &str,
        password: &str,
    ) -> DomainResult<PairingSessionResponse> {
        self.authenticate_at(id, username, password, Utc::now()).await
    }

    pub async fn authenticate_at(
        &self,
        id: &str,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<PairingSessionResponse> {
        let profile = self.staff.authenticate(username, password).await?;
        let response = self
            .with_live_session(id, now, |sessions, index| {
                let session = &mut sessions[index];
                if session.status != PairingStatus::Pending {
                    return Err(DomainError::InvalidState(
                        "Pairing session is already approved".to_string(),
                    ));
                }
                session.status = PairingStatus::Authenticated;
                session.staff_id = Some(profile.id.clone());
                Ok(PairingSessionResponse::from(&*session))
            })
            .await?;
        info!("Pairing session {} approved by {}", id, profile.name);
        Ok(response)
    }

    /// Hand the approved staff profile to the new device and close the session
    pub async fn claim(&self, id: &str) -> DomainResult<StaffProfile> {
        self.claim_at(id, Utc::now()).await
    }

    pub async fn claim_at(&self, id: &str, now: DateTime<Utc>) -> DomainResult<StaffProfile> {
        let staff_id = self
            .with_live_session(id, now, |sessions, index| {
                let session = &sessions[index];
                let staff_id = match (session.status, &session.staff_id) {
                    (PairingStatus::Authenticated, Some(staff_id)) => staff_id.clone(),
                    _ => {
                        return Err(DomainError::InvalidState(
                            "Pairing session has not been approved yet".to_string(),
                        ))
                    }
                };
                sessions.remove(index);
                Ok(staff_id)
            })
            .await?;
        self.staff.get_staff(&staff_id).await
    }

    /// Drop every expired session; returns how many were removed
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let removed = self
            .sessions
            .mutate(|sessions| {
                let before = sessions.len();
                sessions.retain(|s| s.expires_at > now);
                Ok::<_, DomainError>(before - sessions.len())
            })
            .await?;
        if removed > 0 {
            info!("Purged {} expired pairing sessions", removed);
        }
        Ok(removed)
    }

    /// Run `f` on a live session under the collection lock
    ///
    /// Expired sessions are deleted first, and that deletion is saved even
    /// when the requested session turns out to be missing.
    async fn with_live_session<R, F>(&self, id: &str, now: DateTime<Utc>, f: F) -> DomainResult<R>
    where
        F: FnOnce(&mut Vec<PairingSession>, usize) -> DomainResult<R>,
    {
        let guard = self.sessions.lock().await;
        let mut sessions = guard.load().await?;
        let before = sessions.len();
        sessions.retain(|s| s.expires_at > now);
        if sessions.len() != before {
            guard.save(&sessions).await?;
        }

        let index = sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| DomainError::not_found("Pairing session", id))?;
        let result = f(&mut sessions, index)?;
        guard.save(&sessions).await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::memory_connection;
    use shared::{CreateStaffRequest, Role};

    async fn setup() -> (PairingService, StaffProfile) {
        let conn = memory_connection().await;
        let staff = StaffService::new(&conn);
        let owner = staff
            .create_staff(CreateStaffRequest {
                name: "Olga".to_string(),
                username: "olga".to_string(),
                password: "owner-pass".to_string(),
                role: Role::Owner,
                hourly_rate: 0.0,
                permissions: vec![],
            })
            .await
            .unwrap();
        (PairingService::new(&conn, staff, 120), owner)
    }

    #[tokio::test]
    async fn test_pairing_flow() {
        let (service, owner) = setup().await;
        let session = service.create_session(Some("Counter tablet".to_string())).await.unwrap();
        assert_eq!(session.status, PairingStatus::Pending);

        // Claiming before approval is refused and keeps the session
        assert!(matches!(
            service.claim(&session.id).await,
            Err(DomainError::InvalidState(_))
        ));

        let approved = service.authenticate(&session.id, "olga", "owner-pass").await.unwrap();
        assert_eq!(approved.status, PairingStatus::Authenticated);

        let profile = service.claim(&session.id).await.unwrap();
        assert_eq!(profile.id, owner.id);

        // Sessions are single use
        assert!(matches!(service.status(&session.id).await, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_wrong_password_leaves_session_pending() {
        let (service, _) = setup().await;
        let session = service.create_session(None).await.unwrap();
        assert!(matches!(
            service.authenticate(&session.id, "olga", "nope").await,
            Err(DomainError::Unauthorized)
        ));
        assert_eq!(service.status(&session.id).await.unwrap().status, PairingStatus::Pending);
    }

    #[tokio::test]
    async fn test_session_is_approved_only_once() {
        let (service, owner) = setup().await;
        service
            .staff
            .create_staff(CreateStaffRequest {
                name: "Bo".to_string(),
                username: "bo".to_string(),
                password: "barista-pass".to_string(),
                role: Role::Barista,
                hourly_rate: 10.0,
                permissions: vec![],
            })
            .await
            .unwrap();
        let session = service.create_session(None).await.unwrap();
        service.authenticate(&session.id, "olga", "owner-pass").await.unwrap();

        assert!(matches!(
            service.authenticate(&session.id, "bo", "barista-pass").await,
            Err(DomainError::InvalidState(_))
        ));

        let profile = service.claim(&session.id).await.unwrap();
        assert_eq!(profile.id, owner.id);
    }

    #[tokio::test]
    async fn test_expired_session_is_removed() {
        let (service, _) = setup().await;
        let start = Utc::now();
        let session = service.create_session_at(None, start).await.unwrap();
        assert_eq!(session.expires_at, start + Duration::seconds(120));

        let later = start + Duration::seconds(121);
        assert!(matches!(
            service.status_at(&session.id, later).await,
            Err(DomainError::NotFound(_))
        ));
        // The expired session was deleted, not just hidden
        assert!(matches!(
            service.status_at(&session.id, start).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (service, _) = setup().await;
        let start = Utc::now();
        service.create_session_at(None, start).await.unwrap();
        service.create_session_at(None, start + Duration::seconds(100)).await.unwrap();

        assert_eq!(service.purge_expired(start + Duration::seconds(150)).await.unwrap(), 1);
        assert_eq!(service.purge_expired(start + Duration::seconds(150)).await.unwrap(), 0);
    }
}
