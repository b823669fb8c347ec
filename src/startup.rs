use crate::auth::{self, AuthConfig, AuthService, JwtAuth};
use crate::config::Config;
use crate::error::Error;
use crate::handlers::{self, AppState};
use crate::model::Role;
use crate::session::SessionRegistry;
use crate::store::{Datastore, MemoryStore};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Seed the login accounts named in the configuration
async fn seed_accounts(store: &dyn Datastore, config: &Config) -> miette::Result<()> {
    store
        .add_user(&config.admin_username, &config.admin_password, Role::Admin)
        .await?;
    store
        .add_user(
            &config.manager_username,
            &config.manager_password,
            Role::Manager,
        )
        .await?;
    info!(
        "Seeded accounts for {} and {}",
        config.admin_username, config.manager_username
    );
    Ok(())
}

// Authentication middleware. Unauthenticated requests to anything but the
// public routes are rejected with 401.
async fn auth_middleware(
    req: Request<Body>,
    next: Next,
    auth_service: Arc<AuthService>,
) -> Result<Response, Response> {
    let path = req.uri().path();
    if path == "/login" || path == "/health" {
        return Ok(next.run(req).await);
    }

    let (parts, body) = req.into_parts();
    match auth::extract_token(&parts) {
        Ok(token) => match auth_service.validate_token(&token) {
            Ok(claims) => {
                let auth = JwtAuth { claims };
                let mut req = Request::from_parts(parts, body);
                req.extensions_mut().insert(auth);
                Ok(next.run(req).await)
            }
            Err(err) => Err(err.into_response()),
        },
        Err(_) => Err((StatusCode::UNAUTHORIZED, "Not authenticated").into_response()),
    }
}

/// Build the back-office router
pub fn router(state: AppState) -> Router {
    let auth_service = state.auth_service.clone();
    let auth_middleware =
        move |req: Request<Body>, next: Next| auth_middleware(req, next, auth_service.clone());

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/login", post(handlers::login_handler))
        .route("/logout", post(handlers::logout_handler))
        .route(
            "/screens",
            get(handlers::screens_handler).put(handlers::set_screen_handler),
        )
        // Admin screens
        .route(
            "/admin/events",
            get(handlers::admin_events_handler).post(handlers::book_event_handler),
        )
        .route(
            "/admin/events/{id}",
            put(handlers::update_event_handler).delete(handlers::delete_event_handler),
        )
        .route("/admin/events/{id}/edit", get(handlers::event_editor_handler))
        .route(
            "/admin/reservations",
            get(handlers::reservations_handler).post(handlers::reserve_table_handler),
        )
        .route(
            "/admin/reservations/{id}",
            put(handlers::update_reservation_handler),
        )
        .route(
            "/admin/reservations/{id}/edit",
            get(handlers::reservation_editor_handler),
        )
        .route(
            "/admin/reservations/{id}/cancel",
            post(handlers::cancel_reservation_handler),
        )
        .route(
            "/admin/tables/available",
            get(handlers::available_tables_handler),
        )
        .route(
            "/admin/tables/slots",
            get(handlers::standard_slots_handler),
        )
        .route(
            "/admin/menu/categories",
            get(handlers::menu_categories_handler),
        )
        .route(
            "/admin/menu/categories/{id}/items",
            get(handlers::category_menu_handler),
        )
        .route(
            "/admin/cart",
            get(handlers::cart_handler).put(handlers::update_cart_handler),
        )
        .route(
            "/admin/orders/confirm",
            post(handlers::confirm_order_handler),
        )
        .route("/admin/orders/cancel", post(handlers::cancel_order_handler))
        .route("/admin/orders/pay", post(handlers::record_payment_handler))
        .route("/admin/invoices/{id}", get(handlers::invoice_handler))
        // Manager screens
        .route("/manager/orders", get(handlers::manager_orders_handler))
        .route("/manager/events", get(handlers::manager_events_handler))
        .route(
            "/manager/staff",
            get(handlers::staff_handler).post(handlers::add_staff_handler),
        )
        .route("/manager/staff/roles", get(handlers::staff_roles_handler))
        .route(
            "/manager/staff/{id}",
            put(handlers::update_staff_handler).delete(handlers::delete_staff_handler),
        )
        .route(
            "/manager/staff/{id}/shifts",
            get(handlers::staff_shifts_handler),
        )
        .route(
            "/manager/inventory",
            get(handlers::inventory_handler).post(handlers::add_inventory_handler),
        )
        .route(
            "/manager/inventory/categories",
            get(handlers::inventory_categories_handler),
        )
        .route(
            "/manager/inventory/{id}",
            put(handlers::update_inventory_handler).delete(handlers::delete_inventory_handler),
        )
        .route(
            "/manager/suppliers",
            get(handlers::suppliers_handler).post(handlers::add_supplier_handler),
        )
        .route(
            "/manager/suppliers/{id}",
            put(handlers::update_supplier_handler),
        )
        .route(
            "/manager/purchases",
            get(handlers::purchases_handler).post(handlers::record_purchase_handler),
        )
        .route(
            "/manager/purchases/{id}/status",
            put(handlers::update_purchase_status_handler),
        )
        .route(
            "/manager/shifts",
            get(handlers::shifts_handler).post(handlers::add_shift_handler),
        )
        .route(
            "/manager/shifts/{id}",
            put(handlers::update_shift_handler).delete(handlers::delete_shift_handler),
        )
        .route(
            "/manager/menu",
            get(handlers::manager_menu_handler).post(handlers::add_menu_item_handler),
        )
        .route("/manager/menu/{id}", put(handlers::update_menu_item_handler))
        // Apply auth middleware
        .layer(axum::middleware::from_fn(auth_middleware))
        // Other middlewares
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Initialize and start the HTTP server
pub async fn start_server(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let (port, auth_config) = {
        let config_read = config.read().await;
        (
            config_read.port,
            AuthConfig {
                jwt_secret: config_read.jwt_secret.clone(),
                token_expiration_minutes: config_read.token_expiration_minutes,
            },
        )
    };

    let store: Arc<dyn Datastore> = Arc::new(MemoryStore::new());
    {
        let config_read = config.read().await;
        seed_accounts(store.as_ref(), &config_read).await?;
    }

    let state = AppState {
        store,
        auth_service: Arc::new(AuthService::new(auth_config)),
        sessions: Arc::new(SessionRegistry::new()),
        config,
    };
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(Error::from)?;
    axum::serve(listener, app).await.map_err(Error::from)?;

    Ok(())
}
