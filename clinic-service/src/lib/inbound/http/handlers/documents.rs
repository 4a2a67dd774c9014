use axum::extract::Multipart;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::domain::auth::models::Principal;
use crate::domain::document::models::CreateDocument;
use crate::domain::document::models::CreatedDocument;
use crate::domain::document::models::DocumentDetail;
use crate::domain::document::models::DocumentFilter;
use crate::domain::document::models::DocumentScope;
use crate::domain::document::models::DocumentStatus;
use crate::domain::document::models::DocumentSummary;
use crate::domain::document::models::UpdateDocument;
use crate::domain::paging;
use crate::domain::paging::Page;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::Message;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct ListDocumentsQuery {
    q: Option<String>,
    scope: Option<DocumentScope>,
    status: Option<DocumentStatus>,
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_per_page")]
    per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    paging::DEFAULT_PER_PAGE
}

pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Page<DocumentSummary>>, ApiError> {
    let filter = DocumentFilter {
        q: query.q.filter(|q| !q.trim().is_empty()),
        scope: query.scope,
        status: query.status,
        page: query.page,
        per_page: query.per_page,
    };
    let page = state.document_service.list(&principal, filter).await?;
    Ok(Json(page))
}

pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreatedDocument>), ApiError> {
    let mut title = String::new();
    let mut description = None;
    let mut scope = None;
    let mut patient_ids = Vec::new();
    let mut file_name = String::new();
    let mut content = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::unprocessable("docs.bad_upload", e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = read_text(field).await?,
            "description" => description = Some(read_text(field).await?),
            "scope" => scope = read_text(field).await?.parse::<DocumentScope>().ok(),
            // Repeated field, one patient id per part.
            "patient_ids" => {
                if let Ok(id) = read_text(field).await?.trim().parse::<i64>() {
                    patient_ids.push(id);
                }
            }
            "file" => {
                file_name = field.file_name().unwrap_or("upload.bin").to_string();
                content = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::unprocessable("docs.bad_file", e.to_string()))?
                    .to_vec();
            }
            _ => {}
        }
    }

    let scope = scope
        .ok_or_else(|| ApiError::unprocessable("docs.missing_fields", "Title and scope are required."))?;
    if content.is_empty() {
        return Err(ApiError::unprocessable(
            "docs.bad_file",
            "File is missing or invalid.",
        ));
    }

    let command = CreateDocument {
        title,
        description,
        scope,
        patient_ids,
        file_name,
        content,
    };
    let created = state.document_service.create(&principal, command).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::unprocessable("docs.bad_upload", e.to_string()))
}

pub async fn show(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<DocumentDetail>, ApiError> {
    let document = state.document_service.get(&principal, id).await?;
    Ok(Json(document))
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDocumentRequest {
    title: Option<String>,
    description: Option<String>,
    status: Option<DocumentStatus>,
    scope: Option<DocumentScope>,
    patient_ids: Option<Vec<i64>>,
}

pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(body): Json<UpdateDocumentRequest>,
) -> Result<Json<Message>, ApiError> {
    let command = UpdateDocument {
        title: body.title,
        description: body.description,
        status: body.status,
        scope: body.scope,
        patient_ids: body.patient_ids,
    };
    state.document_service.update(&principal, id, command).await?;
    Ok(Json(Message::new("Updated.")))
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StatusBody {
    pub status: DocumentStatus,
}

pub async fn toggle_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<StatusBody>, ApiError> {
    let status = state.document_service.toggle_status(&principal, id).await?;
    Ok(Json(StatusBody { status }))
}

pub async fn remove(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<Message>, ApiError> {
    state.document_service.delete(&principal, id).await?;
    Ok(Json(Message::new("Deleted.")))
}

pub async fn download(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let download = state.document_service.download(&principal, id).await?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download.file_name),
        ),
    ];

    Ok((headers, download.content).into_response())
}
