//! Camtrack - campus security camera infrastructure tracker
//!
//! REST JSON API for the inventory of cameras and the equipment they depend on
//! (switches, recorders, UPS units, power supplies, cabinets), their locations,
//! failure tickets, maintenance, dashboards and spreadsheet migration.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::{sync::Arc, time::Duration};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;
pub mod import;
pub mod logging;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

/// Routes for one equipment kind generated by `equipment_handlers!`
macro_rules! equipment_routes {
    ($router:expr, $path:literal, $module:ident) => {
        $router
            .route($path, get(api::$module::list).post(api::$module::create))
            .route(
                concat!($path, "/:id"),
                get(api::$module::get)
                    .put(api::$module::update)
                    .delete(api::$module::delete),
            )
            .route(concat!($path, "/:id/status"), post(api::$module::change_status))
    };
}

fn login_routes(state: &AppState) -> Router<AppState> {
    let login = Router::new().route("/auth/login", post(api::auth::login));

    let auth = &state.config.auth;
    if auth.login_rate_per_second == 0 {
        return login;
    }
    match GovernorConfigBuilder::default()
        .per_second(auth.login_rate_per_second)
        .burst_size(auth.login_burst.max(1))
        .finish()
    {
        Some(config) => login.layer(GovernorLayer {
            config: Arc::new(config),
        }),
        None => {
            tracing::warn!("Invalid login rate limit settings, limiter disabled");
            login
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .merge(login_routes(&state))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/change-password", post(api::auth::change_password))
        .route("/auth/profile", put(api::auth::update_profile))
        // Users
        .route("/users", get(api::users::list_users).post(api::users::create_user))
        .route(
            "/users/:id",
            get(api::users::get_user)
                .put(api::users::update_user)
                .delete(api::users::delete_user),
        )
        // Locations
        .route(
            "/locations",
            get(api::locations::list_locations).post(api::locations::create_location),
        )
        .route(
            "/locations/:id",
            get(api::locations::get_location)
                .put(api::locations::update_location)
                .delete(api::locations::delete_location),
        )
        .route("/locations/:id/children", get(api::locations::children))
        .route("/locations/:id/equipment", get(api::locations::equipment))
        // Equipment extras
        .route("/cameras/maintenance-due", get(api::cameras::maintenance_due))
        .route("/switches/:id/usage", get(api::switches::usage))
        .route("/cabinets/:id/contents", get(api::cabinets::contents));

    // Equipment kinds
    let api_v1 = equipment_routes!(api_v1, "/cameras", cameras);
    let api_v1 = equipment_routes!(api_v1, "/switches", switches);
    let api_v1 = equipment_routes!(api_v1, "/nvrs", nvrs);
    let api_v1 = equipment_routes!(api_v1, "/ups", ups);
    let api_v1 = equipment_routes!(api_v1, "/power-supplies", power_supplies);
    let api_v1 = equipment_routes!(api_v1, "/cabinets", cabinets);

    let api_v1 = api_v1
        // Any kind
        .route("/equipment/search", get(api::equipment::search))
        .route("/equipment/by-ip/:ip", get(api::equipment::by_ip))
        .route("/equipment/:kind/:id/history", get(api::equipment::history))
        .route("/impact/:kind/:id", get(api::equipment::impact))
        .route(
            "/network-links",
            get(api::network_links::list_links).post(api::network_links::create_link),
        )
        .route(
            "/network-links/:id",
            put(api::network_links::set_link_active).delete(api::network_links::delete_link),
        )
        // Technicians
        .route(
            "/technicians",
            get(api::technicians::list_technicians).post(api::technicians::create_technician),
        )
        .route(
            "/technicians/:id",
            get(api::technicians::get_technician)
                .put(api::technicians::update_technician)
                .delete(api::technicians::delete_technician),
        )
        .route("/technicians/:id/workload", get(api::technicians::workload))
        // Failures
        .route(
            "/failures",
            get(api::failures::list_failures).post(api::failures::create_failure),
        )
        .route(
            "/failures/:id",
            get(api::failures::get_failure)
                .put(api::failures::update_failure)
                .delete(api::failures::delete_failure),
        )
        .route("/failures/:id/assign", post(api::failures::assign))
        .route("/failures/:id/start", post(api::failures::start_repair))
        .route("/failures/:id/resolve", post(api::failures::finish_repair))
        .route("/failures/:id/close", post(api::failures::close))
        .route("/failures/:id/cancel", post(api::failures::cancel))
        .route(
            "/failures/:id/comments",
            get(api::failures::list_comments).post(api::failures::add_comment),
        )
        .route("/failures/:id/impact", get(api::failures::impact))
        .route(
            "/failures/:id/photos",
            get(api::failures::list_photos).post(api::failures::upload_photo),
        )
        // Maintenance
        .route(
            "/maintenance",
            get(api::maintenance::list_maintenance).post(api::maintenance::create_maintenance),
        )
        .route("/maintenance/upcoming", get(api::maintenance::upcoming))
        .route("/maintenance/overdue", get(api::maintenance::overdue))
        .route(
            "/maintenance/:id",
            get(api::maintenance::get_maintenance)
                .put(api::maintenance::update_maintenance)
                .delete(api::maintenance::delete_maintenance),
        )
        .route("/maintenance/:id/start", post(api::maintenance::start))
        .route("/maintenance/:id/complete", post(api::maintenance::complete))
        .route("/maintenance/:id/cancel", post(api::maintenance::cancel))
        .route(
            "/maintenance/:id/photos",
            get(api::maintenance::list_photos).post(api::maintenance::upload_photo),
        )
        .route("/photos/:id", axum::routing::delete(api::photos::delete_photo))
        // Dashboard & reports
        .route("/dashboard/stats", get(api::dashboard::stats))
        .route("/dashboard/alerts", get(api::dashboard::alerts))
        .route("/dashboard/recent", get(api::dashboard::recent))
        .route("/reports/summary", get(api::reports::summary))
        .route("/reports/failures", get(api::reports::failures))
        .route("/reports/equipment-status", get(api::reports::equipment_status))
        // Map
        .route("/map/cameras", get(api::map::cameras))
        .route("/map/buildings", get(api::map::buildings))
        .route("/map/locations", get(api::map::locations))
        .route("/map/stats", get(api::map::stats))
        // Import
        .route("/imports/:kind", post(api::imports::import_sheet))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes()))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    // Dashboard page and uploaded photos
    let static_dir = &state.config.server.static_dir;
    let static_files = ServeDir::new(static_dir)
        .not_found_service(ServeFile::new(format!("{}/index.html", static_dir)));
    let uploads = ServeDir::new(&state.config.uploads.folder);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .nest_service("/uploads", uploads)
        .fallback_service(static_files)
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.server.request_timeout_secs.max(1),
        )))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(api::request_id))
        .layer(cors)
}
