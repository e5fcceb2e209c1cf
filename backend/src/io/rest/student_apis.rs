//! # REST API for Student Management
//!
//! Endpoints for registering students, importing legacy documents and
//! reading balances.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::domain::CoreError;
use crate::io::rest::desk_session;
use crate::io::rest::mappers::ledger_mapper::LedgerMapper;
use crate::io::rest::mappers::student_mapper::StudentMapper;
use crate::storage::migration::StudentDocument;
use crate::AppState;
use shared::{
    BalanceResponse, CreateStudentRequest, ImportStudentsResponse, Student, StudentListResponse,
    StudentResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/import", post(import_students))
        .route("/:id", get(get_student))
        .route("/:id/balance", get(get_balance))
}

/// Register a new student
pub async fn create_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, CoreError> {
    info!("POST /api/students - name: {}", request.name);

    let session = desk_session(&headers, &state);
    let new_student = StudentMapper::new_student_from_request(request)?;
    let student = state
        .student_service
        .create_student(&session, new_student)
        .await?;

    let response = StudentResponse {
        success_message: format!("{} registered", student.name),
        student: StudentMapper::to_dto(student),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_students(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StudentListResponse>, CoreError> {
    info!("GET /api/students");

    desk_session(&headers, &state).require_open()?;
    let students = state.student_service.list_students().await?;
    Ok(Json(StudentListResponse {
        students: StudentMapper::to_dto_list(students),
    }))
}

pub async fn get_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(student_id): Path<String>,
) -> Result<Json<Student>, CoreError> {
    info!("GET /api/students/{}", student_id);

    desk_session(&headers, &state).require_open()?;
    let student = state.student_service.get_student(&student_id).await?;
    Ok(Json(StudentMapper::to_dto(student)))
}

/// Import legacy student documents
pub async fn import_students(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(documents): Json<Vec<StudentDocument>>,
) -> Result<Json<ImportStudentsResponse>, CoreError> {
    info!("POST /api/students/import - {} documents", documents.len());

    let session = desk_session(&headers, &state);
    let result = state
        .student_service
        .import_documents(&session, documents)
        .await?;

    Ok(Json(ImportStudentsResponse {
        imported: result.imported.len(),
        skipped: result.skipped,
    }))
}

/// Category points, total and spendable balance for one student
pub async fn get_balance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(student_id): Path<String>,
) -> Result<Json<BalanceResponse>, CoreError> {
    info!("GET /api/students/{}/balance", student_id);

    desk_session(&headers, &state).require_open()?;
    let balance = state.ledger_service.balance(&student_id).await?;
    Ok(Json(LedgerMapper::balance_to_dto(balance)))
}
