use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::domain::auth::models::Principal;
use crate::domain::link::models::AttachOutcome;
use crate::domain::link::models::LinkedPatient;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::Data;
use crate::inbound::http::handlers::Message;
use crate::inbound::http::router::AppState;

pub async fn list_patients(
    State(state): State<AppState>,
    principal: Principal,
    Path(nutritionist_id): Path<i64>,
) -> Result<Json<Data<Vec<LinkedPatient>>>, ApiError> {
    let patients = state
        .link_service
        .list_patients(&principal, nutritionist_id)
        .await?;
    Ok(Json(Data { data: patients }))
}

pub async fn attach(
    State(state): State<AppState>,
    principal: Principal,
    Path((nutritionist_id, patient_id)): Path<(i64, i64)>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let outcome = state
        .link_service
        .attach(&principal, nutritionist_id, patient_id)
        .await?;

    Ok(match outcome {
        AttachOutcome::Created => (StatusCode::CREATED, Json(Message::new("Link created."))),
        AttachOutcome::AlreadyLinked => (StatusCode::OK, Json(Message::new("Already linked."))),
    })
}

pub async fn detach(
    State(state): State<AppState>,
    principal: Principal,
    Path((nutritionist_id, patient_id)): Path<(i64, i64)>,
) -> Result<Json<Message>, ApiError> {
    state
        .link_service
        .detach(&principal, nutritionist_id, patient_id)
        .await?;
    Ok(Json(Message::new("Link removed.")))
}
