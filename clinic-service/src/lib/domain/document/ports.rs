use async_trait::async_trait;
use thiserror::Error;

use crate::domain::auth::models::Principal;
use crate::domain::document::errors::DocumentError;
use crate::domain::document::models::CreateDocument;
use crate::domain::document::models::CreatedDocument;
use crate::domain::document::models::Document;
use crate::domain::document::models::DocumentAudience;
use crate::domain::document::models::DocumentDetail;
use crate::domain::document::models::DocumentDownload;
use crate::domain::document::models::DocumentFilter;
use crate::domain::document::models::DocumentStatus;
use crate::domain::document::models::DocumentSummary;
use crate::domain::document::models::NewDocumentRecord;
use crate::domain::document::models::UpdateDocument;
use crate::domain::paging::Page;

/// Document operations with the practice's visibility rules applied.
#[async_trait]
pub trait DocumentServicePort: Send + Sync + 'static {
    async fn list(
        &self,
        principal: &Principal,
        filter: DocumentFilter,
    ) -> Result<Page<DocumentSummary>, DocumentError>;

    /// Upload; nutritionists only.
    async fn create(
        &self,
        principal: &Principal,
        command: CreateDocument,
    ) -> Result<CreatedDocument, DocumentError>;

    async fn get(&self, principal: &Principal, id: i64) -> Result<DocumentDetail, DocumentError>;

    /// Metadata update; uploader or master.
    async fn update(
        &self,
        principal: &Principal,
        id: i64,
        command: UpdateDocument,
    ) -> Result<(), DocumentError>;

    async fn toggle_status(
        &self,
        principal: &Principal,
        id: i64,
    ) -> Result<DocumentStatus, DocumentError>;

    /// Removes assignments, the stored file and the row.
    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), DocumentError>;

    async fn download(
        &self,
        principal: &Principal,
        id: i64,
    ) -> Result<DocumentDownload, DocumentError>;
}

/// Persistence for documents and their patient assignments.
#[async_trait]
pub trait DocumentRepository: Send + Sync + 'static {
    async fn create(&self, record: NewDocumentRecord) -> Result<Document, DocumentError>;

    async fn set_download_url(&self, id: i64, url: &str) -> Result<(), DocumentError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Document>, DocumentError>;

    async fn list(
        &self,
        audience: &DocumentAudience,
        filter: &DocumentFilter,
    ) -> Result<Page<Document>, DocumentError>;

    async fn update(&self, document: &Document) -> Result<(), DocumentError>;

    async fn delete(&self, id: i64) -> Result<(), DocumentError>;

    /// Replace the whole assignment set for a document.
    async fn replace_assignments(
        &self,
        document_id: i64,
        patient_ids: &[i64],
    ) -> Result<(), DocumentError>;

    async fn is_assigned(&self, document_id: i64, patient_id: i64)
        -> Result<bool, DocumentError>;

    async fn clear_assignments(&self, document_id: i64) -> Result<(), DocumentError>;
}

#[derive(Debug, Clone, Error)]
pub enum FileStoreError {
    #[error("file not found")]
    NotFound,

    #[error("{0}")]
    Io(String),
}

/// Blob storage for uploaded documents, addressed by a relative path.
#[async_trait]
pub trait FileStore: Send + Sync + 'static {
    async fn save(&self, relative_path: &str, content: &[u8]) -> Result<(), FileStoreError>;

    async fn read(&self, relative_path: &str) -> Result<Vec<u8>, FileStoreError>;

    async fn remove(&self, relative_path: &str) -> Result<(), FileStoreError>;
}
