//! Business compliance documents (licenses, permits, insurance) and their
//! expiry tracking.

use chrono::NaiveDate;
use log::info;
use shared::{
    CreateDocumentRequest, Document, DocumentStatus, DocumentView, UpdateDocumentRequest,
};
use uuid::Uuid;

use crate::domain::calculations::days_until;
use crate::domain::error::{require_text, DomainError, DomainResult};
use crate::storage::{CollectionRepository, StoreConnection};

const DEFAULT_REMIND_BEFORE_DAYS: u32 = 30;

/// Expiry status of a document relative to `today`
pub fn document_status(document: &Document, today: NaiveDate) -> DocumentStatus {
    match document.expiry_date {
        None => DocumentStatus::NoExpiry,
        Some(expiry) => {
            let days = days_until(today, expiry);
            if days < 0 {
                DocumentStatus::Expired
            } else if days <= i64::from(document.remind_before_days) {
                DocumentStatus::ExpiringSoon
            } else {
                DocumentStatus::Valid
            }
        }
    }
}

pub fn document_view(document: Document, today: NaiveDate) -> DocumentView {
    DocumentView {
        status: document_status(&document, today),
        days_until_expiry: document.expiry_date.map(|d| days_until(today, d)),
        document,
    }
}

#[derive(Clone)]
pub struct DocumentService {
    documents: CollectionRepository<Document>,
}

impl DocumentService {
    pub fn new(connection: &StoreConnection) -> Self {
        Self {
            documents: connection.repository(),
        }
    }

    pub async fn create_document(&self, request: CreateDocumentRequest) -> DomainResult<Document> {
        let document = Document {
            id: Uuid::new_v4().to_string(),
            title: require_text("Title", &request.title)?,
            expiry_date: request.expiry_date,
            document_type: require_text("Type", &request.document_type)?,
            file_url: request.file_url,
            remind_before_days: request
                .remind_before_days
                .unwrap_or(DEFAULT_REMIND_BEFORE_DAYS),
        };
        let document = self.documents.insert(document).await?;
        info!("Added document '{}'", document.title);
        Ok(document)
    }

    /// All documents, soonest expiry first, undated last
    pub async fn list_documents(&self, today: NaiveDate) -> DomainResult<Vec<DocumentView>> {
        let mut documents = self.documents.load_all().await?;
        documents.sort_by(|a, b| match (a.expiry_date, b.expiry_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.title.cmp(&b.title),
        });
        Ok(documents
            .into_iter()
            .map(|d| document_view(d, today))
            .collect())
    }

    pub async fn get_document(&self, id: &str, today: NaiveDate) -> DomainResult<DocumentView> {
        self.documents
            .get(id)
            .await?
            .map(|d| document_view(d, today))
            .ok_or_else(|| DomainError::not_found("Document", id))
    }

    pub async fn update_document(
        &self,
        id: &str,
        request: UpdateDocumentRequest,
    ) -> DomainResult<Document> {
        self.documents
            .mutate(|documents| {
                let document = documents
                    .iter_mut()
                    .find(|d| d.id == id)
                    .ok_or_else(|| DomainError::not_found("Document", id))?;
                if let Some(title) = request.title {
                    document.title = require_text("Title", &title)?;
                }
                if let Some(expiry) = request.expiry_date {
                    document.expiry_date = expiry;
                }
                if let Some(kind) = request.document_type {
                    document.document_type = require_text("Type", &kind)?;
                }
                if let Some(url) = request.file_url {
                    document.file_url = url;
                }
                if let Some(days) = request.remind_before_days {
                    document.remind_before_days = days;
                }
                Ok(document.clone())
            })
            .await
    }

    pub async fn delete_document(&self, id: &str) -> DomainResult<()> {
        if !self.documents.delete(id).await? {
            return Err(DomainError::not_found("Document", id));
        }
        Ok(())
    }

    /// Documents that are expired or inside their own reminder window
    pub async fn expiring(&self, today: NaiveDate) -> DomainResult<Vec<DocumentView>> {
        Ok(self
            .list_documents(today)
            .await?
            .into_iter()
            .filter(|view| {
                matches!(
                    view.status,
                    DocumentStatus::Expired | DocumentStatus::ExpiringSoon
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::memory_connection;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn doc(expiry: Option<NaiveDate>, remind: u32) -> Document {
        Document {
            id: "d".to_string(),
            title: "Permit".to_string(),
            expiry_date: expiry,
            document_type: "permit".to_string(),
            file_url: None,
            remind_before_days: remind,
        }
    }

    #[test]
    fn test_document_status() {
        let today = date(2025, 3, 1);
        assert_eq!(document_status(&doc(None, 30), today), DocumentStatus::NoExpiry);
        assert_eq!(
            document_status(&doc(Some(date(2025, 2, 28)), 30), today),
            DocumentStatus::Expired
        );
        assert_eq!(
            document_status(&doc(Some(date(2025, 3, 1)), 30), today),
            DocumentStatus::ExpiringSoon
        );
        assert_eq!(
            document_status(&doc(Some(date(2025, 3, 20)), 10), today),
            DocumentStatus::Valid
        );
        assert_eq!(
            document_status(&doc(Some(date(2025, 3, 20)), 30), today),
            DocumentStatus::ExpiringSoon
        );
    }

    #[tokio::test]
    async fn test_expiring_uses_each_reminder_window_and_skips_undated() {
        let service = DocumentService::new(&memory_connection().await);
        let today = date(2025, 3, 1);

        for (title, expiry, remind) in [
            ("Insurance", Some(date(2025, 3, 25)), Some(7)),
            ("Health permit", Some(date(2025, 3, 25)), None),
            ("Lease", None, Some(365)),
            ("Old license", Some(date(2025, 1, 1)), None),
        ] {
            service
                .create_document(CreateDocumentRequest {
                    title: title.to_string(),
                    expiry_date: expiry,
                    document_type: "license".to_string(),
                    file_url: None,
                    remind_before_days: remind,
                })
                .await
                .unwrap();
        }

        let expiring = service.expiring(today).await.unwrap();
        let titles: Vec<&str> = expiring.iter().map(|v| v.document.title.as_str()).collect();
        assert_eq!(titles, vec!["Old license", "Health permit"]);
        assert_eq!(expiring[0].days_until_expiry, Some(-59));

        let all = service.list_documents(today).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[3].status, DocumentStatus::NoExpiry);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let service = DocumentService::new(&memory_connection().await);
        let created = service
            .create_document(CreateDocumentRequest {
                title: "Fire certificate".to_string(),
                expiry_date: None,
                document_type: "certificate".to_string(),
                file_url: None,
                remind_before_days: None,
            })
            .await
            .unwrap();
        assert_eq!(created.remind_before_days, 30);

        let updated = service
            .update_document(
                &created.id,
                UpdateDocumentRequest {
                    expiry_date: Some(Some(date(2026, 1, 1))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.expiry_date, Some(date(2026, 1, 1)));

        service.delete_document(&created.id).await.unwrap();
        assert!(matches!(
            service.get_document(&created.id, date(2025, 1, 1)).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_clearing_expiry_returns_to_no_expiry() {
        let service = DocumentService::new(&memory_connection().await);
        let created = service
            .create_document(CreateDocumentRequest {
                title: "Liquor license".to_string(),
                expiry_date: Some(date(2025, 6, 1)),
                document_type: "license".to_string(),
                file_url: Some("license.pdf".to_string()),
                remind_before_days: None,
            })
            .await
            .unwrap();

        let patch: UpdateDocumentRequest =
            serde_json::from_str(r#"{"expiry_date":null,"file_url":null}"#).unwrap();
        let updated = service.update_document(&created.id, patch).await.unwrap();
        assert!(updated.expiry_date.is_none());
        assert!(updated.file_url.is_none());
        assert_eq!(updated.title, "Liquor license");

        let view = service.get_document(&created.id, date(2025, 5, 20)).await.unwrap();
        assert_eq!(view.status, DocumentStatus::NoExpiry);
        assert!(view.days_until_expiry.is_none());
    }
}
