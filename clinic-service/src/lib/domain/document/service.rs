use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;
use uuid::Uuid;

use crate::domain::auth::models::Principal;
use crate::domain::auth::ports::Clock;
use crate::domain::document::errors::DocumentError;
use crate::domain::document::models::CreateDocument;
use crate::domain::document::models::CreatedDocument;
use crate::domain::document::models::Document;
use crate::domain::document::models::DocumentAudience;
use crate::domain::document::models::DocumentDetail;
use crate::domain::document::models::DocumentDownload;
use crate::domain::document::models::DocumentFilter;
use crate::domain::document::models::DocumentScope;
use crate::domain::document::models::DocumentStatus;
use crate::domain::document::models::DocumentSummary;
use crate::domain::document::models::NewDocumentRecord;
use crate::domain::document::models::UpdateDocument;
use crate::domain::document::ports::DocumentRepository;
use crate::domain::document::ports::DocumentServicePort;
use crate::domain::document::ports::FileStore;
use crate::domain::document::ports::FileStoreError;
use crate::domain::paging;
use crate::domain::paging::Page;
use crate::domain::user::models::Role;

pub struct DocumentService<D, F, C>
where
    D: DocumentRepository,
    F: FileStore,
    C: Clock,
{
    documents: Arc<D>,
    files: Arc<F>,
    clock: Arc<C>,
    /// Public API base URL; canonical download links hang off it.
    base_url: String,
}

impl<D, F, C> DocumentService<D, F, C>
where
    D: DocumentRepository,
    F: FileStore,
    C: Clock,
{
    pub fn new(documents: Arc<D>, files: Arc<F>, clock: Arc<C>, base_url: String) -> Self {
        Self {
            documents,
            files,
            clock,
            base_url,
        }
    }

    fn audience(&self, principal: &Principal) -> DocumentAudience {
        match principal.role {
            Role::Master => DocumentAudience::All,
            Role::Nutritionist => DocumentAudience::UploadedBy(principal.user_id),
            Role::Patient => DocumentAudience::VisibleToPatient(principal.user_id),
        }
    }

    /// Mutations go through the shared ownership predicate: the uploader
    /// (a nutritionist) or a master.
    fn ensure_owner(&self, principal: &Principal, doc: &Document) -> Result<(), DocumentError> {
        if principal.can_act_for(Role::Nutritionist, doc.uploaded_by) {
            return Ok(());
        }
        if principal.role == Role::Nutritionist {
            Err(DocumentError::NotOwner)
        } else {
            Err(DocumentError::Forbidden)
        }
    }

    async fn load(&self, id: i64) -> Result<Document, DocumentError> {
        self.documents
            .find_by_id(id)
            .await?
            .ok_or(DocumentError::NotFound)
    }

    async fn patient_may_read(
        &self,
        doc: &Document,
        patient_id: i64,
    ) -> Result<bool, DocumentError> {
        if doc.status != DocumentStatus::Active {
            return Ok(false);
        }
        match doc.scope {
            DocumentScope::General => Ok(true),
            DocumentScope::Patient => self.documents.is_assigned(doc.id, patient_id).await,
        }
    }

    fn download_url(&self, id: i64) -> String {
        format!("{}/documents/{}/download", self.base_url.trim_end_matches('/'), id)
    }
}

/// Friendly attachment name: lowercase title with anything outside
/// `[a-z0-9._-]` collapsed to underscores, plus the file extension.
fn download_file_name(title: &str, file_type: &str) -> String {
    let mut name = String::with_capacity(title.len());
    let mut last_was_underscore = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
            name.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            name.push('_');
            last_was_underscore = true;
        }
    }
    format!("{}.{}", name.trim_matches('_'), file_type)
}

fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "bin".to_string())
}

#[async_trait]
impl<D, F, C> DocumentServicePort for DocumentService<D, F, C>
where
    D: DocumentRepository,
    F: FileStore,
    C: Clock,
{
    async fn list(
        &self,
        principal: &Principal,
        mut filter: DocumentFilter,
    ) -> Result<Page<DocumentSummary>, DocumentError> {
        let (page, per_page) = paging::clamp(filter.page, filter.per_page);
        filter.page = page;
        filter.per_page = per_page;

        let docs = self
            .documents
            .list(&self.audience(principal), &filter)
            .await?;
        Ok(docs.map(|d| DocumentSummary::from(&d)))
    }

    async fn create(
        &self,
        principal: &Principal,
        command: CreateDocument,
    ) -> Result<CreatedDocument, DocumentError> {
        // Uploads are a nutritionist task; masters manage but do not upload.
        if principal.role != Role::Nutritionist {
            return Err(DocumentError::Forbidden);
        }

        let title = command.title.trim();
        if title.is_empty() {
            return Err(DocumentError::MissingFields);
        }
        if command.scope == DocumentScope::Patient && command.patient_ids.is_empty() {
            return Err(DocumentError::MissingPatients);
        }

        let now = self.clock.now();
        let file_type = file_extension(&command.file_name);
        let storage_path = format!(
            "uploads/ebooks/{}/{:02}/doc_{}.{}",
            now.year(),
            now.month(),
            Uuid::new_v4().simple(),
            file_type,
        );

        self.files
            .save(&storage_path, &command.content)
            .await
            .map_err(|e| DocumentError::Storage(e.to_string()))?;

        let doc = self
            .documents
            .create(NewDocumentRecord {
                title: title.to_string(),
                description: command.description.filter(|d| !d.is_empty()),
                file_type,
                storage_path,
                size_bytes: command.content.len() as i64,
                scope: command.scope,
                status: DocumentStatus::Active,
                uploaded_by: principal.user_id,
            })
            .await?;

        let download_url = self.download_url(doc.id);
        self.documents.set_download_url(doc.id, &download_url).await?;

        if command.scope == DocumentScope::Patient {
            self.documents
                .replace_assignments(doc.id, &command.patient_ids)
                .await?;
        }

        tracing::info!(document_id = doc.id, uploaded_by = principal.user_id, "document stored");

        Ok(CreatedDocument {
            id: doc.id,
            download_url,
        })
    }

    async fn get(&self, principal: &Principal, id: i64) -> Result<DocumentDetail, DocumentError> {
        let doc = self.load(id).await?;

        match principal.role {
            Role::Master => {}
            Role::Nutritionist => self.ensure_owner(principal, &doc)?,
            Role::Patient => {
                if !self.patient_may_read(&doc, principal.user_id).await? {
                    return Err(DocumentError::Forbidden);
                }
            }
        }

        Ok(DocumentDetail::from(&doc))
    }

    async fn update(
        &self,
        principal: &Principal,
        id: i64,
        command: UpdateDocument,
    ) -> Result<(), DocumentError> {
        let mut doc = self.load(id).await?;
        self.ensure_owner(principal, &doc)?;

        if let Some(title) = command.title {
            doc.title = title;
        }
        if let Some(description) = command.description {
            doc.description = Some(description);
        }
        if let Some(status) = command.status {
            doc.status = status;
        }
        if let Some(scope) = command.scope {
            doc.scope = scope;
        }

        self.documents.update(&doc).await?;

        if let Some(patient_ids) = command.patient_ids {
            self.documents.replace_assignments(doc.id, &patient_ids).await?;
        }

        Ok(())
    }

    async fn toggle_status(
        &self,
        principal: &Principal,
        id: i64,
    ) -> Result<DocumentStatus, DocumentError> {
        let mut doc = self.load(id).await?;
        self.ensure_owner(principal, &doc)?;

        doc.status = doc.status.toggled();
        self.documents.update(&doc).await?;

        Ok(doc.status)
    }

    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), DocumentError> {
        let doc = self.load(id).await?;
        self.ensure_owner(principal, &doc)?;

        self.documents.clear_assignments(doc.id).await?;

        // A file already gone must not block deleting the metadata.
        match self.files.remove(&doc.storage_path).await {
            Ok(()) | Err(FileStoreError::NotFound) => {}
            Err(e) => {
                tracing::warn!(document_id = doc.id, error = %e, "stored file left behind");
            }
        }

        self.documents.delete(doc.id).await
    }

    async fn download(
        &self,
        principal: &Principal,
        id: i64,
    ) -> Result<DocumentDownload, DocumentError> {
        let doc = self
            .documents
            .find_by_id(id)
            .await?
            .filter(|d| d.status == DocumentStatus::Active)
            .ok_or(DocumentError::NotAvailable)?;

        let allowed = match principal.role {
            // Any nutritionist may download for care management, not
            // only the uploader.
            Role::Master | Role::Nutritionist => true,
            Role::Patient => self.patient_may_read(&doc, principal.user_id).await?,
        };
        if !allowed {
            return Err(DocumentError::Forbidden);
        }

        let content = self
            .files
            .read(&doc.storage_path)
            .await
            .map_err(|e| match e {
                FileStoreError::NotFound => DocumentError::FileMissing,
                FileStoreError::Io(msg) => DocumentError::Storage(msg),
            })?;

        Ok(DocumentDownload {
            file_name: download_file_name(&doc.title, &doc.file_type),
            content,
        })
    }
}
