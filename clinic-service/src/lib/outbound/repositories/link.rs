use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::domain::link::errors::LinkError;
use crate::domain::link::models::LinkedPatient;
use crate::domain::link::ports::LinkRepository;

pub struct PostgresLinkRepository {
    pool: PgPool,
}

impl PostgresLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(e: sqlx::Error) -> LinkError {
    LinkError::Database(e.to_string())
}

#[derive(Debug, FromRow)]
struct LinkedPatientRow {
    id: i64,
    name: String,
    email: String,
    status: String,
    photo_url: Option<String>,
}

impl LinkedPatientRow {
    fn into_patient(self) -> Result<LinkedPatient, LinkError> {
        Ok(LinkedPatient {
            id: self.id,
            name: self.name,
            email: self.email,
            status: self
                .status
                .parse()
                .map_err(|e: String| LinkError::Database(format!("corrupt users row: {}", e)))?,
            photo_url: self.photo_url,
        })
    }
}

#[async_trait]
impl LinkRepository for PostgresLinkRepository {
    async fn list_patients(&self, nutritionist_id: i64) -> Result<Vec<LinkedPatient>, LinkError> {
        let rows = sqlx::query_as::<_, LinkedPatientRow>(
            "SELECT u.id, u.name, u.email, u.status, u.photo_url \
             FROM nutritionist_patient np \
             INNER JOIN users u ON u.id = np.patient_id \
             WHERE np.nutritionist_id = $1 AND u.deleted_at IS NULL \
             ORDER BY u.name",
        )
        .bind(nutritionist_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(LinkedPatientRow::into_patient).collect()
    }

    async fn exists(&self, nutritionist_id: i64, patient_id: i64) -> Result<bool, LinkError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS( \
                 SELECT 1 FROM nutritionist_patient \
                 WHERE nutritionist_id = $1 AND patient_id = $2)",
        )
        .bind(nutritionist_id)
        .bind(patient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)
    }

    async fn insert(
        &self,
        nutritionist_id: i64,
        patient_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<(), LinkError> {
        // The composite primary key absorbs a racing duplicate insert.
        sqlx::query(
            "INSERT INTO nutritionist_patient (nutritionist_id, patient_id, created_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (nutritionist_id, patient_id) DO NOTHING",
        )
        .bind(nutritionist_id)
        .bind(patient_id)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }

    async fn delete(&self, nutritionist_id: i64, patient_id: i64) -> Result<(), LinkError> {
        sqlx::query(
            "DELETE FROM nutritionist_patient \
             WHERE nutritionist_id = $1 AND patient_id = $2",
        )
        .bind(nutritionist_id)
        .bind(patient_id)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }
}
