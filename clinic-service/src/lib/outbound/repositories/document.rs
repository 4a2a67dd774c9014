use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use sqlx::QueryBuilder;

use crate::domain::document::errors::DocumentError;
use crate::domain::document::models::Document;
use crate::domain::document::models::DocumentAudience;
use crate::domain::document::models::DocumentFilter;
use crate::domain::document::models::NewDocumentRecord;
use crate::domain::document::ports::DocumentRepository;
use crate::domain::paging::Page;

const DOCUMENT_COLUMNS: &str = "id, title, description, file_type, storage_path, download_url, \
                                size_bytes, scope, status, uploaded_by, created_at, updated_at";

pub struct PostgresDocumentRepository {
    pool: PgPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(e: sqlx::Error) -> DocumentError {
    DocumentError::Database(e.to_string())
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: i64,
    title: String,
    description: Option<String>,
    file_type: String,
    storage_path: String,
    download_url: String,
    size_bytes: i64,
    scope: String,
    status: String,
    uploaded_by: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DocumentRow {
    fn into_document(self) -> Result<Document, DocumentError> {
        Ok(Document {
            id: self.id,
            title: self.title,
            description: self.description,
            file_type: self.file_type,
            storage_path: self.storage_path,
            download_url: self.download_url,
            size_bytes: self.size_bytes,
            scope: self.scope.parse().map_err(|e: String| {
                DocumentError::Database(format!("corrupt documents row: {}", e))
            })?,
            status: self.status.parse().map_err(|e: String| {
                DocumentError::Database(format!("corrupt documents row: {}", e))
            })?,
            uploaded_by: self.uploaded_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn push_scope<'a>(
    builder: &mut QueryBuilder<'a, sqlx::Postgres>,
    audience: &'a DocumentAudience,
    filter: &'a DocumentFilter,
) {
    match audience {
        DocumentAudience::All => {}
        DocumentAudience::UploadedBy(user_id) => {
            builder.push(" AND uploaded_by = ").push_bind(*user_id);
        }
        DocumentAudience::VisibleToPatient(patient_id) => {
            builder
                .push(" AND status = 'active' AND (scope = 'general' OR id IN (")
                .push("SELECT document_id FROM document_patient WHERE patient_id = ")
                .push_bind(*patient_id)
                .push("))");
        }
    }

    if let Some(q) = &filter.q {
        let pattern = format!("%{}%", q);
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(scope) = filter.scope {
        builder.push(" AND scope = ").push_bind(scope.as_str());
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn create(&self, record: NewDocumentRecord) -> Result<Document, DocumentError> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "INSERT INTO documents \
             (title, description, file_type, storage_path, size_bytes, scope, status, uploaded_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            DOCUMENT_COLUMNS
        ))
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.file_type)
        .bind(&record.storage_path)
        .bind(record.size_bytes)
        .bind(record.scope.as_str())
        .bind(record.status.as_str())
        .bind(record.uploaded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        row.into_document()
    }

    async fn set_download_url(&self, id: i64, url: &str) -> Result<(), DocumentError> {
        sqlx::query("UPDATE documents SET download_url = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Document>, DocumentError> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {} FROM documents WHERE id = $1",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(DocumentRow::into_document).transpose()
    }

    async fn list(
        &self,
        audience: &DocumentAudience,
        filter: &DocumentFilter,
    ) -> Result<Page<Document>, DocumentError> {
        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM documents WHERE TRUE");
        push_scope(&mut count_builder, audience, filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;

        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM documents WHERE TRUE",
            DOCUMENT_COLUMNS
        ));
        push_scope(&mut builder, audience, filter);
        builder
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(filter.per_page)
            .push(" OFFSET ")
            .push_bind((filter.page - 1) * filter.per_page);

        let rows = builder
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        let documents = rows
            .into_iter()
            .map(DocumentRow::into_document)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(documents, filter.page, filter.per_page, total))
    }

    async fn update(&self, document: &Document) -> Result<(), DocumentError> {
        let result = sqlx::query(
            "UPDATE documents \
             SET title = $2, description = $3, status = $4, scope = $5, updated_at = now() \
             WHERE id = $1",
        )
        .bind(document.id)
        .bind(&document.title)
        .bind(&document.description)
        .bind(document.status.as_str())
        .bind(document.scope.as_str())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(DocumentError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DocumentError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(DocumentError::NotFound);
        }

        Ok(())
    }

    async fn replace_assignments(
        &self,
        document_id: i64,
        patient_ids: &[i64],
    ) -> Result<(), DocumentError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        sqlx::query("DELETE FROM document_patient WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        let ids: Vec<i64> = patient_ids.iter().copied().filter(|id| *id > 0).collect();
        if !ids.is_empty() {
            let mut builder =
                QueryBuilder::new("INSERT INTO document_patient (document_id, patient_id) ");
            builder.push_values(ids, |mut row, patient_id| {
                row.push_bind(document_id).push_bind(patient_id);
            });
            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
        }

        tx.commit().await.map_err(store_error)
    }

    async fn is_assigned(
        &self,
        document_id: i64,
        patient_id: i64,
    ) -> Result<bool, DocumentError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS( \
                 SELECT 1 FROM document_patient \
                 WHERE document_id = $1 AND patient_id = $2)",
        )
        .bind(document_id)
        .bind(patient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)
    }

    async fn clear_assignments(&self, document_id: i64) -> Result<(), DocumentError> {
        sqlx::query("DELETE FROM document_patient WHERE document_id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(())
    }
}
