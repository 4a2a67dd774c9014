use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// General documents are visible to every patient; patient-scoped ones
/// only to the patients they are assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentScope {
    General,
    Patient,
}

impl DocumentScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentScope::General => "general",
            DocumentScope::Patient => "patient",
        }
    }
}

impl FromStr for DocumentScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(DocumentScope::General),
            "patient" => Ok(DocumentScope::Patient),
            other => Err(format!("unknown scope: {}", other)),
        }
    }
}

impl fmt::Display for DocumentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Active,
    Inactive,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Active => "active",
            DocumentStatus::Inactive => "inactive",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            DocumentStatus::Active => DocumentStatus::Inactive,
            DocumentStatus::Inactive => DocumentStatus::Active,
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(DocumentStatus::Active),
            "inactive" => Ok(DocumentStatus::Inactive),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document aggregate (ebook metadata; bytes live in the file store).
#[derive(Debug, Clone)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_type: String,
    pub storage_path: String,
    pub download_url: String,
    pub size_bytes: i64,
    pub scope: DocumentScope,
    pub status: DocumentStatus,
    pub uploaded_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection (no storage path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_type: String,
    pub scope: DocumentScope,
    pub status: DocumentStatus,
    pub uploaded_by: i64,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            description: doc.description.clone(),
            file_type: doc.file_type.clone(),
            scope: doc.scope,
            status: doc.status,
            uploaded_by: doc.uploaded_by,
            size_bytes: doc.size_bytes,
            created_at: doc.created_at,
        }
    }
}

/// Detail projection, includes the canonical download URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentDetail {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_type: String,
    pub scope: DocumentScope,
    pub status: DocumentStatus,
    pub size_bytes: i64,
    pub uploaded_by: i64,
    pub created_at: DateTime<Utc>,
    pub download_url: String,
}

impl From<&Document> for DocumentDetail {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            description: doc.description.clone(),
            file_type: doc.file_type.clone(),
            scope: doc.scope,
            status: doc.status,
            size_bytes: doc.size_bytes,
            uploaded_by: doc.uploaded_by,
            created_at: doc.created_at,
            download_url: doc.download_url.clone(),
        }
    }
}

/// Upload command as parsed from the multipart request.
#[derive(Debug)]
pub struct CreateDocument {
    pub title: String,
    pub description: Option<String>,
    pub scope: DocumentScope,
    pub patient_ids: Vec<i64>,
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Partial metadata update; `patient_ids` replaces the assignment set.
#[derive(Debug, Default)]
pub struct UpdateDocument {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<DocumentStatus>,
    pub scope: Option<DocumentScope>,
    pub patient_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub q: Option<String>,
    pub scope: Option<DocumentScope>,
    pub status: Option<DocumentStatus>,
    pub page: i64,
    pub per_page: i64,
}

/// Who is looking: decides which rows a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentAudience {
    /// Masters: everything.
    All,
    /// Nutritionists: their own uploads.
    UploadedBy(i64),
    /// Patients: active documents that are general or assigned to them.
    VisibleToPatient(i64),
}

/// Insert record; id, url and timestamps come later.
#[derive(Debug)]
pub struct NewDocumentRecord {
    pub title: String,
    pub description: Option<String>,
    pub file_type: String,
    pub storage_path: String,
    pub size_bytes: i64,
    pub scope: DocumentScope,
    pub status: DocumentStatus,
    pub uploaded_by: i64,
}

/// Outcome of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedDocument {
    pub id: i64,
    pub download_url: String,
}

/// A download ready to stream back to the client.
#[derive(Debug, Clone)]
pub struct DocumentDownload {
    pub file_name: String,
    pub content: Vec<u8>,
}
