use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    #[error("Access denied.")]
    Forbidden,

    /// A nutritionist acting on a document someone else uploaded.
    #[error("You may only manage documents you uploaded.")]
    NotOwner,

    #[error("Document not found.")]
    NotFound,

    /// Inactive or missing document requested for download.
    #[error("Document not available.")]
    NotAvailable,

    /// Metadata row exists but the stored file is gone.
    #[error("File not found.")]
    FileMissing,

    #[error("Title and scope are required.")]
    MissingFields,

    #[error("patient_ids are required for patient-scoped documents.")]
    MissingPatients,

    #[error("Failed to store file: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),
}
