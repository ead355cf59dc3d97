//! API service routes
//!
//! Every group under `/api` except `/api/user/login` sits behind the
//! authentication gate.

use auth::{AuthSession, auth_middleware};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};
use axum_extra::extract::WithRejection;
use common::response::{EmptyObject, Envelope};
use sqlx::PgPool;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        CreateDetailRequest, CreateIncomeRequest, Detail, DetailRecord, IdResponse, Income,
        IncomeResponse, Resource, UpdateDetailRequest, UpdateIncomeRequest,
    },
    services::{CrudService, DetailService, IncomeService},
    state::AppState,
};

type IdPath = WithRejection<Path<i64>, ApiError>;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let mut protected = Router::new();
    for (kind, service) in state.lookups {
        protected = protected.merge(crud_routes(&format!("/api/{}", kind.path()), service));
    }

    let protected = protected
        .merge(crud_routes("/api/receiver", state.receivers))
        .merge(income_routes("/api/income", state.incomes))
        .merge(detail_routes("/api/detail", state.details))
        .route_layer(middleware::from_fn_with_state(
            state.auth.token_authority.clone(),
            auth_middleware,
        ));

    let health = Router::new()
        .route("/health", get(health_check))
        .with_state(state.db_pool);

    Router::new()
        .merge(protected)
        .nest("/api/user", auth::create_router(state.auth))
        .merge(health)
        .fallback(not_found)
}

/// Envelope for paths no route matches
async fn not_found(uri: Uri) -> Response {
    Envelope::failure("Not found", format!("no route for {}", uri.path()))
        .with_status(StatusCode::NOT_FOUND)
}

/// Register the collection endpoints under `base` and `base/`, items under `base/:id`
fn resource_routes<S: Clone + Send + Sync + 'static>(
    base: &str,
    collection: MethodRouter<S>,
    item: MethodRouter<S>,
) -> Router<S> {
    Router::new()
        .route(base, collection.clone())
        .route(&format!("{}/", base), collection)
        .route(&format!("{}/:id", base), item)
}

/// Reports whether the database answers
pub async fn health_check(State(pool): State<PgPool>) -> Response {
    match common::database::health_check(&pool).await {
        Ok(true) => Envelope::success("Database reachable", EmptyObject {}).into_response(),
        Ok(false) => Envelope::failure("Database unreachable", "health check query failed")
            .with_status(StatusCode::SERVICE_UNAVAILABLE),
        Err(e) => Envelope::failure("Database unreachable", e.to_string())
            .with_status(StatusCode::SERVICE_UNAVAILABLE),
    }
}

/// "payment method" -> "Payment method"
fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The five CRUD endpoints of an id-keyed entity
fn crud_routes<R: Resource>(base: &str, service: CrudService<R>) -> Router {
    resource_routes(
        base,
        get(list::<R>).post(create::<R>),
        get(show::<R>).patch(update::<R>).delete(remove::<R>),
    )
    .with_state(service)
}

async fn list<R: Resource>(State(service): State<CrudService<R>>) -> ApiResult<Envelope<Vec<R>>> {
    let label = service.label();
    let rows = service
        .get_all()
        .await
        .map_err(|e| ApiError::service(format!("Failed to retrieve {}", label), e))?;

    Ok(Envelope::success(format!("Successfully retrieved {}", label), rows))
}

async fn show<R: Resource>(
    State(service): State<CrudService<R>>,
    WithRejection(Path(id), _): IdPath,
) -> ApiResult<Envelope<R>> {
    let label = service.label();
    let row = service
        .get_by_id(id)
        .await
        .map_err(|e| ApiError::service(format!("Failed to retrieve {}", label), e))?;

    Ok(Envelope::success(format!("Successfully retrieved {}", label), row))
}

async fn create<R: Resource>(
    State(service): State<CrudService<R>>,
    session: AuthSession,
    WithRejection(Json(payload), _): WithRejection<Json<R::Create>, ApiError>,
) -> ApiResult<Response> {
    let label = service.label();
    R::validate_create(&payload).map_err(ApiError::Validation)?;

    let id = service
        .create(payload)
        .await
        .map_err(|e| ApiError::service(format!("Failed to save {}", label), e))?;

    info!("User {} created {} {}", session.user_id, label, id);
    Ok(
        Envelope::success(format!("Data {} successfully saved", label), IdResponse { id })
            .with_status(StatusCode::CREATED),
    )
}

async fn update<R: Resource>(
    State(service): State<CrudService<R>>,
    session: AuthSession,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): WithRejection<Json<R::Update>, ApiError>,
) -> ApiResult<Envelope<IdResponse>> {
    let label = service.label();
    R::validate_update(&payload).map_err(ApiError::Validation)?;

    let id = service
        .update(id, payload)
        .await
        .map_err(|e| ApiError::service(format!("Failed to update {}", label), e))?;

    info!("User {} updated {} {}", session.user_id, label, id);
    Ok(Envelope::success(
        format!("{} successfully updated", capitalized(label)),
        IdResponse { id },
    ))
}

async fn remove<R: Resource>(
    State(service): State<CrudService<R>>,
    session: AuthSession,
    WithRejection(Path(id), _): IdPath,
) -> ApiResult<Envelope<IdResponse>> {
    let label = service.label();
    service
        .delete(id)
        .await
        .map_err(|e| ApiError::service(format!("Failed to delete {}", label), e))?;

    info!("User {} deleted {} {}", session.user_id, label, id);
    Ok(Envelope::success(
        format!("{} successfully deleted", capitalized(label)),
        IdResponse { id },
    ))
}

/// Income endpoints, keyed by invoice number
fn income_routes(base: &str, service: IncomeService) -> Router {
    resource_routes(
        base,
        get(list_incomes).post(create_income),
        get(show_income).patch(update_income).delete(remove_income),
    )
    .with_state(service)
}

async fn list_incomes(State(service): State<IncomeService>) -> ApiResult<Envelope<Vec<Income>>> {
    let incomes = service
        .get_all()
        .await
        .map_err(|e| ApiError::service("Failed to retrieve income", e))?;

    Ok(Envelope::success("Successfully retrieved income", incomes))
}

async fn show_income(
    State(service): State<IncomeService>,
    WithRejection(Path(invoice_id_number), _): IdPath,
) -> ApiResult<Envelope<Income>> {
    let income = service
        .get_by_invoice_id(invoice_id_number)
        .await
        .map_err(|e| ApiError::service("Failed to retrieve income", e))?;

    Ok(Envelope::success("Successfully retrieved income", income))
}

async fn create_income(
    State(service): State<IncomeService>,
    session: AuthSession,
    WithRejection(Json(payload), _): WithRejection<Json<CreateIncomeRequest>, ApiError>,
) -> ApiResult<Response> {
    payload.validate().map_err(ApiError::Validation)?;

    let invoice_id_number = service
        .create(payload)
        .await
        .map_err(|e| ApiError::service("Failed to save income", e))?;

    info!("User {} created income {}", session.user_id, invoice_id_number);
    Ok(Envelope::success(
        "Data income successfully saved",
        IncomeResponse { invoice_id_number },
    )
    .with_status(StatusCode::CREATED))
}

async fn update_income(
    State(service): State<IncomeService>,
    session: AuthSession,
    WithRejection(Path(current), _): IdPath,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateIncomeRequest>, ApiError>,
) -> ApiResult<Envelope<IncomeResponse>> {
    payload.validate().map_err(ApiError::Validation)?;

    let invoice_id_number = service
        .update(current, payload)
        .await
        .map_err(|e| ApiError::service("Failed to update income", e))?;

    info!("User {} updated income {}", session.user_id, invoice_id_number);
    Ok(Envelope::success(
        "Income successfully updated",
        IncomeResponse { invoice_id_number },
    ))
}

async fn remove_income(
    State(service): State<IncomeService>,
    session: AuthSession,
    WithRejection(Path(invoice_id_number), _): IdPath,
) -> ApiResult<Envelope<IncomeResponse>> {
    service
        .delete(invoice_id_number)
        .await
        .map_err(|e| ApiError::service("Failed to delete income", e))?;

    info!("User {} deleted income {}", session.user_id, invoice_id_number);
    Ok(Envelope::success(
        "Income successfully deleted",
        IncomeResponse { invoice_id_number },
    ))
}

/// Detail endpoints, keyed by detail id
fn detail_routes(base: &str, service: DetailService) -> Router {
    resource_routes(
        base,
        get(list_details).post(create_detail),
        get(show_detail).patch(update_detail).delete(remove_detail),
    )
    .with_state(service)
}

async fn list_details(State(service): State<DetailService>) -> ApiResult<Envelope<Vec<Detail>>> {
    let details = service
        .get_all()
        .await
        .map_err(|e| ApiError::service("Failed to retrieve detail", e))?;

    Ok(Envelope::success("Successfully retrieved detail", details))
}

async fn show_detail(
    State(service): State<DetailService>,
    WithRejection(Path(id), _): IdPath,
) -> ApiResult<Envelope<Detail>> {
    let detail = service
        .get_by_id(id)
        .await
        .map_err(|e| ApiError::service("Failed to retrieve detail", e))?;

    Ok(Envelope::success("Successfully retrieved detail", detail))
}

async fn create_detail(
    State(service): State<DetailService>,
    session: AuthSession,
    WithRejection(Json(payload), _): WithRejection<Json<CreateDetailRequest>, ApiError>,
) -> ApiResult<Response> {
    DetailRecord::validate_create(&payload).map_err(ApiError::Validation)?;

    let id = service
        .create(payload)
        .await
        .map_err(|e| ApiError::service("Failed to save detail", e))?;

    info!("User {} created detail {}", session.user_id, id);
    Ok(
        Envelope::success("Data detail successfully saved", IdResponse { id })
            .with_status(StatusCode::CREATED),
    )
}

async fn update_detail(
    State(service): State<DetailService>,
    session: AuthSession,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateDetailRequest>, ApiError>,
) -> ApiResult<Envelope<IdResponse>> {
    DetailRecord::validate_update(&payload).map_err(ApiError::Validation)?;

    let id = service
        .update(id, payload)
        .await
        .map_err(|e| ApiError::service("Failed to update detail", e))?;

    info!("User {} updated detail {}", session.user_id, id);
    Ok(Envelope::success(
        "Detail successfully updated",
        IdResponse { id },
    ))
}

async fn remove_detail(
    State(service): State<DetailService>,
    session: AuthSession,
    WithRejection(Path(id), _): IdPath,
) -> ApiResult<Envelope<IdResponse>> {
    service
        .delete(id)
        .await
        .map_err(|e| ApiError::service("Failed to delete detail", e))?;

    info!("User {} deleted detail {}", session.user_id, id);
    Ok(Envelope::success(
        "Detail successfully deleted",
        IdResponse { id },
    ))
}
