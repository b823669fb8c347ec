//! HTTP handlers for the back office. Every screen is a small JSON API; the
//! role checks mirror the login form's admin/manager split.

use crate::auth::{AuthError, AuthService, Credentials, JwtAuth};
use crate::config::Config;
use crate::error::Error;
use crate::model::*;
use crate::ops::{admin, manager, DateFilter};
use crate::session::{CartLine, Session, SessionRegistry};
use crate::store::Datastore;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Datastore behind the screens
    pub store: Arc<dyn Datastore>,
    /// Auth service for JWT operations
    pub auth_service: Arc<AuthService>,
    /// Per-login order flow state
    pub sessions: Arc<SessionRegistry>,
    /// Runtime configuration, mutable for the screen toggles
    pub config: Arc<RwLock<Config>>,
}

/// Error surfaced to the client as a status code plus a JSON message
pub enum ApiError {
    App(Error),
    Auth(AuthError),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::App(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(err) => err.into_response(),
            ApiError::App(err) => {
                let status = match &err {
                    Error::NotFound(_) => StatusCode::NOT_FOUND,
                    Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    Error::Auth(_) => StatusCode::UNAUTHORIZED,
                    _ => {
                        error!("Request failed: {}", err);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, Json(json!({ "error": err.to_string() }))).into_response()
            }
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Fetch the caller's session, recreating it from the token claims when the
/// server has restarted since login.
async fn session_for(state: &AppState, auth: &JwtAuth) -> ApiResult<(String, Session)> {
    let subject = auth.claims.sub.clone();
    if let Some(session) = state.sessions.get(&subject).await {
        return Ok((subject, session));
    }
    let user_id = subject
        .parse::<Id>()
        .map_err(|_| ApiError::Auth(AuthError::InvalidToken))?;
    let role = auth
        .claims
        .role()
        .ok_or(ApiError::Auth(AuthError::InvalidToken))?;
    state.sessions.open(&subject, user_id, role).await;
    let session = state
        .sessions
        .get(&subject)
        .await
        .ok_or(ApiError::Auth(AuthError::InvalidToken))?;
    Ok((subject, session))
}

/// Reject the request if the named screen has been switched off
async fn ensure_screen(state: &AppState, name: &str) -> ApiResult<()> {
    let config = state.config.read().await;
    if config.is_screen_enabled(name) {
        Ok(())
    } else {
        Err(ApiError::App(Error::InvalidInput(format!(
            "screen '{}' is disabled",
            name
        ))))
    }
}

/// Date selection shared by the list endpoints: a single day, an inclusive
/// range, or everything when no parameter is given.
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub on: Option<NaiveDate>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateQuery {
    fn filter(&self) -> DateFilter {
        match (self.on, self.start, self.end) {
            (Some(day), _, _) => DateFilter::On(day),
            (None, Some(start), Some(end)) => DateFilter::Between(start, end),
            _ => DateFilter::All,
        }
    }
}

// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub username: String,
}

/// Handler for login. A successful login opens a fresh session and sets the
/// auth cookie alongside the JSON body.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, ApiError> {
    match state
        .auth_service
        .authenticate(state.store.as_ref(), &credentials)
        .await
    {
        Ok((account, token)) => {
            info!("User {} successfully authenticated", account.username);
            state
                .sessions
                .open(&account.id.to_string(), account.id, account.role)
                .await;

            let cookie = format!("auth_token={}; Path=/; HttpOnly; SameSite=Strict", token);
            let body = LoginResponse {
                token,
                role: account.role,
                username: account.username,
            };
            let mut response = Json(body).into_response();
            response.headers_mut().insert(
                header::SET_COOKIE,
                header::HeaderValue::from_str(&cookie)
                    .map_err(|e| ApiError::Auth(AuthError::Other(e.to_string())))?,
            );
            Ok(response)
        }
        Err(err) => {
            error!("Failed login attempt for user: {}", credentials.username);
            Err(ApiError::Auth(err))
        }
    }
}

/// Handler for logout: drop the session and expire the cookie
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
) -> Response {
    state.sessions.close(&auth.claims.sub).await;
    let mut response = StatusCode::NO_CONTENT.into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        header::HeaderValue::from_static("auth_token=; Path=/; HttpOnly; Max-Age=0"),
    );
    response
}

/// Current screen toggles
pub async fn screens_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config.read().await;
    Json(json!(config.screens))
}

#[derive(Debug, Deserialize)]
pub struct ScreenToggle {
    pub name: String,
    pub enabled: bool,
}

/// Toggle a screen on or off; admin only. The change is persisted to the
/// overlay file.
pub async fn set_screen_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Json(toggle): Json<ScreenToggle>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Admin)?;
    let mut config = state.config.write().await;
    config.set_screen_enabled(&toggle.name, toggle.enabled)?;
    info!("Screen '{}' set to {}", toggle.name, toggle.enabled);
    Ok(StatusCode::NO_CONTENT)
}

// --- admin: events ---

pub async fn admin_events_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<Vec<admin::EventView>>> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "events").await?;
    let views = admin::upcoming_events(state.store.as_ref(), query.filter()).await?;
    Ok(Json(views))
}

pub async fn book_event_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Json(input): Json<admin::BookEventInput>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "events").await?;
    let (_, session) = session_for(&state, &auth).await?;
    let today = Utc::now().date_naive();
    let event_id = admin::book_event(state.store.as_ref(), input, session.user_id, today).await?;
    Ok(Json(json!({ "event_id": event_id })))
}

pub async fn event_editor_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
) -> ApiResult<Json<admin::EventEditor>> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "events").await?;
    Ok(Json(admin::event_editor(state.store.as_ref(), id).await?))
}

#[derive(Debug, Deserialize)]
pub struct EventUpdate {
    pub name: String,
    pub location: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

pub async fn update_event_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
    Json(update): Json<EventUpdate>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "events").await?;
    admin::update_event(
        state.store.as_ref(),
        id,
        &update.name,
        &update.location,
        update.start,
        update.end,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_event_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "events").await?;
    admin::delete_event(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- admin: reservations and tables ---

pub async fn reservations_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<Vec<admin::ReservationRow>>> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "reservations").await?;
    let rows = admin::list_reservations(state.store.as_ref(), query.filter()).await?;
    Ok(Json(rows))
}

pub async fn reservation_editor_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
) -> ApiResult<Json<admin::ReservationEditor>> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "reservations").await?;
    Ok(Json(
        admin::reservation_editor(state.store.as_ref(), id).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct ReservationUpdate {
    pub reservation_date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub guest_count: u32,
}

pub async fn update_reservation_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
    Json(update): Json<ReservationUpdate>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "reservations").await?;
    admin::update_reservation(
        state.store.as_ref(),
        id,
        update.reservation_date,
        update.start,
        update.end,
        update.guest_count,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cancel_reservation_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "reservations").await?;
    admin::cancel_reservation(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Slot tokens offered by the table reservation form
pub async fn standard_slots_handler(
    Extension(auth): Extension<JwtAuth>,
) -> ApiResult<Json<Vec<&'static str>>> {
    auth.require_role(Role::Admin)?;
    Ok(Json(crate::utils::time::STANDARD_SLOTS.to_vec()))
}

pub async fn available_tables_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
) -> ApiResult<Json<Vec<DiningTable>>> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "tables").await?;
    Ok(Json(admin::available_tables(state.store.as_ref()).await?))
}

pub async fn reserve_table_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Json(input): Json<admin::ReserveTableInput>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "tables").await?;
    let reservation_id = admin::reserve_table(state.store.as_ref(), input).await?;
    Ok(Json(json!({ "reservation_id": reservation_id })))
}

// --- admin: ordering ---

pub async fn menu_categories_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
) -> ApiResult<Json<Vec<MenuCategory>>> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "orders").await?;
    Ok(Json(state.store.list_menu_categories().await?))
}

pub async fn category_menu_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(category_id): Path<Id>,
) -> ApiResult<Json<Vec<MenuItem>>> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "orders").await?;
    Ok(Json(
        admin::menu_for_category(state.store.as_ref(), category_id).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct CartUpdate {
    pub menu_item_id: Id,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total: f64,
}

fn cart_view(session: &Session) -> CartView {
    let mut lines: Vec<CartLine> = session.cart.values().cloned().collect();
    lines.sort_by_key(|l| l.menu_item_id);
    CartView {
        total: session.cart_total(),
        lines,
    }
}

pub async fn cart_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
) -> ApiResult<Json<CartView>> {
    auth.require_role(Role::Admin)?;
    let (_, session) = session_for(&state, &auth).await?;
    Ok(Json(cart_view(&session)))
}

/// Set a cart line to the given quantity; zero removes the line. The line is
/// priced at the item's current menu price.
pub async fn update_cart_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Json(update): Json<CartUpdate>,
) -> ApiResult<Json<CartView>> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "orders").await?;
    let item = state
        .store
        .get_menu_item(update.menu_item_id)
        .await?
        .ok_or(Error::NotFound("menu item".to_string()))?;

    let (subject, mut session) = session_for(&state, &auth).await?;
    session.set_cart_line(CartLine {
        menu_item_id: item.id,
        name: item.name,
        quantity: update.quantity,
        unit_price: item.price,
    });
    let view = cart_view(&session);
    state.sessions.put(&subject, session).await;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct OrderConfirmInput {
    pub customer_name: String,
    pub phone: String,
    #[serde(default)]
    pub discount_code: String,
}

pub async fn confirm_order_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Json(input): Json<OrderConfirmInput>,
) -> ApiResult<Json<admin::OrderConfirmation>> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "orders").await?;
    let (subject, mut session) = session_for(&state, &auth).await?;
    let confirmation = admin::confirm_order(
        state.store.as_ref(),
        &mut session,
        &input.customer_name,
        &input.phone,
        &input.discount_code,
        Utc::now().naive_utc(),
    )
    .await?;
    state.sessions.put(&subject, session).await;
    Ok(Json(confirmation))
}

pub async fn cancel_order_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "orders").await?;
    let (subject, mut session) = session_for(&state, &auth).await?;
    admin::cancel_order(state.store.as_ref(), &mut session).await?;
    state.sessions.put(&subject, session).await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct PaymentInput {
    pub method: PaymentMethod,
}

pub async fn record_payment_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Json(input): Json<PaymentInput>,
) -> ApiResult<Json<admin::InvoiceView>> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "orders").await?;
    let (subject, mut session) = session_for(&state, &auth).await?;
    let invoice_id = admin::record_payment(
        state.store.as_ref(),
        &mut session,
        input.method,
        Utc::now().naive_utc(),
    )
    .await?;
    state.sessions.put(&subject, session).await;
    Ok(Json(
        admin::invoice_view(state.store.as_ref(), invoice_id).await?,
    ))
}

pub async fn invoice_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
) -> ApiResult<Json<admin::InvoiceView>> {
    auth.require_role(Role::Admin)?;
    ensure_screen(&state, "orders").await?;
    Ok(Json(admin::invoice_view(state.store.as_ref(), id).await?))
}

// --- manager: orders and events ---

pub async fn manager_orders_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<Vec<manager::OrderSummary>>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "orders").await?;
    Ok(Json(
        manager::orders_between(state.store.as_ref(), query.filter()).await?,
    ))
}

pub async fn manager_events_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<Vec<manager::ManagerEventView>>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "events").await?;
    Ok(Json(
        manager::upcoming_events(state.store.as_ref(), query.filter()).await?,
    ))
}

// --- manager: staff ---

#[derive(Debug, Deserialize)]
pub struct StaffQuery {
    pub name: Option<String>,
    pub role: Option<String>,
}

pub async fn staff_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Query(query): Query<StaffQuery>,
) -> ApiResult<Json<Vec<Staff>>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "staff").await?;
    Ok(Json(
        manager::search_staff(
            state.store.as_ref(),
            query.name.as_deref(),
            query.role.as_deref(),
        )
        .await?,
    ))
}

pub async fn staff_roles_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
) -> ApiResult<Json<Vec<String>>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "staff").await?;
    Ok(Json(manager::staff_roles(state.store.as_ref()).await?))
}

#[derive(Debug, Deserialize)]
pub struct StaffInput {
    pub name: String,
    pub phone: String,
    pub salary: f64,
    pub role_name: String,
}

pub async fn add_staff_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Json(input): Json<StaffInput>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "staff").await?;
    let id = manager::add_staff(
        state.store.as_ref(),
        &input.name,
        &input.phone,
        input.salary,
        &input.role_name,
    )
    .await?;
    Ok(Json(json!({ "staff_id": id })))
}

#[derive(Debug, Deserialize)]
pub struct StaffUpdate {
    pub name: String,
    pub phone: String,
    pub salary: f64,
}

pub async fn update_staff_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
    Json(update): Json<StaffUpdate>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "staff").await?;
    manager::update_staff(
        state.store.as_ref(),
        id,
        &update.name,
        &update.phone,
        update.salary,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_staff_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "staff").await?;
    manager::delete_staff(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- manager: inventory ---

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

pub async fn inventory_categories_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
) -> ApiResult<Json<Vec<String>>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "inventory").await?;
    Ok(Json(
        manager::inventory_categories(state.store.as_ref()).await?,
    ))
}

pub async fn inventory_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<Json<Vec<InventoryItem>>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "inventory").await?;
    let items = match query.category.as_deref() {
        Some(category) => manager::inventory_in_category(state.store.as_ref(), category).await?,
        None => state.store.list_inventory(None).await?,
    };
    Ok(Json(items))
}

#[derive(Debug, Deserialize)]
pub struct InventoryInput {
    pub item_name: String,
    pub unit: String,
    pub quantity: f64,
    pub category: String,
}

pub async fn add_inventory_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Json(input): Json<InventoryInput>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "inventory").await?;
    let id = manager::add_inventory_item(
        state.store.as_ref(),
        &input.item_name,
        &input.unit,
        input.quantity,
        &input.category,
    )
    .await?;
    Ok(Json(json!({ "item_id": id })))
}

#[derive(Debug, Deserialize)]
pub struct InventoryUpdate {
    pub item_name: String,
    pub unit: String,
    pub quantity: f64,
}

pub async fn update_inventory_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
    Json(update): Json<InventoryUpdate>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "inventory").await?;
    manager::update_inventory_item(
        state.store.as_ref(),
        id,
        &update.item_name,
        &update.unit,
        update.quantity,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_inventory_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "inventory").await?;
    manager::delete_inventory_item(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- manager: suppliers ---

pub async fn suppliers_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
) -> ApiResult<Json<Vec<Supplier>>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "suppliers").await?;
    Ok(Json(manager::list_suppliers(state.store.as_ref()).await?))
}

#[derive(Debug, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub phone: String,
    pub category: String,
}

pub async fn add_supplier_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Json(input): Json<SupplierInput>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "suppliers").await?;
    let id = manager::add_supplier(
        state.store.as_ref(),
        &input.name,
        &input.phone,
        &input.category,
    )
    .await?;
    Ok(Json(json!({ "supplier_id": id })))
}

pub async fn update_supplier_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
    Json(update): Json<SupplierInput>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "suppliers").await?;
    manager::update_supplier(
        state.store.as_ref(),
        id,
        &update.name,
        &update.phone,
        &update.category,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- manager: purchases ---

#[derive(Debug, Deserialize)]
pub struct PurchaseInput {
    pub supplier_id: Id,
    pub staff_id: Id,
    pub purchase_date: NaiveDate,
    pub status: PurchaseStatus,
    pub items: Vec<manager::PurchaseItemInput>,
}

pub async fn record_purchase_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Json(input): Json<PurchaseInput>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "purchases").await?;
    let (purchase_id, total) = manager::record_purchase(
        state.store.as_ref(),
        input.supplier_id,
        input.staff_id,
        input.purchase_date,
        input.status,
        input.items,
    )
    .await?;
    Ok(Json(json!({ "purchase_id": purchase_id, "total": total })))
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub async fn purchases_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<Vec<manager::PurchaseView>>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "purchases").await?;
    Ok(Json(
        manager::purchases_between(state.store.as_ref(), query.start, query.end).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct PurchaseStatusUpdate {
    pub status: PurchaseStatus,
}

pub async fn update_purchase_status_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
    Json(update): Json<PurchaseStatusUpdate>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "purchases").await?;
    manager::update_purchase_status(state.store.as_ref(), id, update.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- manager: shifts ---

#[derive(Debug, Deserialize)]
pub struct ShiftQuery {
    pub on: Option<NaiveDate>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub role: Option<String>,
}

pub async fn shifts_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Query(query): Query<ShiftQuery>,
) -> ApiResult<Json<Vec<manager::ShiftView>>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "shifts").await?;
    let filter = DateQuery {
        on: query.on,
        start: query.start,
        end: query.end,
    }
    .filter();
    Ok(Json(
        manager::shifts_between(state.store.as_ref(), filter, query.role.as_deref()).await?,
    ))
}

pub async fn staff_shifts_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(staff_id): Path<Id>,
) -> ApiResult<Json<Vec<manager::ShiftView>>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "shifts").await?;
    Ok(Json(
        manager::shifts_for_staff(state.store.as_ref(), staff_id).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct ShiftInput {
    pub staff_id: Id,
    pub shift_date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

pub async fn add_shift_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Json(input): Json<ShiftInput>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "shifts").await?;
    let id = manager::add_shift(
        state.store.as_ref(),
        input.staff_id,
        input.shift_date,
        input.start,
        input.end,
    )
    .await?;
    Ok(Json(json!({ "shift_id": id })))
}

#[derive(Debug, Deserialize)]
pub struct ShiftUpdate {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

pub async fn update_shift_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
    Json(update): Json<ShiftUpdate>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "shifts").await?;
    manager::update_shift(state.store.as_ref(), id, update.start, update.end).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_shift_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "shifts").await?;
    manager::delete_shift(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- manager: menu ---

pub async fn manager_menu_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
) -> ApiResult<Json<Vec<MenuItem>>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "menu").await?;
    Ok(Json(manager::list_menu_items(state.store.as_ref()).await?))
}

#[derive(Debug, Deserialize)]
pub struct MenuItemInput {
    pub name: String,
    pub price: f64,
    pub category_id: Id,
}

pub async fn add_menu_item_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Json(input): Json<MenuItemInput>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "menu").await?;
    let id = manager::add_menu_item(
        state.store.as_ref(),
        &input.name,
        input.price,
        input.category_id,
    )
    .await?;
    Ok(Json(json!({ "menu_item_id": id })))
}

#[derive(Debug, Deserialize)]
pub struct MenuItemUpdate {
    pub name: String,
    pub price: f64,
    pub is_available: bool,
}

pub async fn update_menu_item_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
    Path(id): Path<Id>,
    Json(update): Json<MenuItemUpdate>,
) -> ApiResult<StatusCode> {
    auth.require_role(Role::Manager)?;
    ensure_screen(&state, "menu").await?;
    manager::update_menu_item(
        state.store.as_ref(),
        id,
        &update.name,
        update.price,
        update.is_available,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
