use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::auth::models::Principal;
use crate::domain::link::errors::LinkError;
use crate::domain::link::models::AttachOutcome;
use crate::domain::link::models::LinkedPatient;

/// Nutritionist↔patient link management. Masters manage any roster,
/// nutritionists only their own.
#[async_trait]
pub trait LinkServicePort: Send + Sync + 'static {
    async fn list_patients(
        &self,
        principal: &Principal,
        nutritionist_id: i64,
    ) -> Result<Vec<LinkedPatient>, LinkError>;

    /// Link a patient to a nutritionist; linking twice is a friendly
    /// no-op.
    async fn attach(
        &self,
        principal: &Principal,
        nutritionist_id: i64,
        patient_id: i64,
    ) -> Result<AttachOutcome, LinkError>;

    async fn detach(
        &self,
        principal: &Principal,
        nutritionist_id: i64,
        patient_id: i64,
    ) -> Result<(), LinkError>;
}

/// Persistence for the composite-key link table.
#[async_trait]
pub trait LinkRepository: Send + Sync + 'static {
    async fn list_patients(&self, nutritionist_id: i64) -> Result<Vec<LinkedPatient>, LinkError>;

    async fn exists(&self, nutritionist_id: i64, patient_id: i64) -> Result<bool, LinkError>;

    async fn insert(
        &self,
        nutritionist_id: i64,
        patient_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<(), LinkError>;

    async fn delete(&self, nutritionist_id: i64, patient_id: i64) -> Result<(), LinkError>;
}
