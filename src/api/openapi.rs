//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    auth, cabinets, cameras, dashboard, equipment, failures, health, imports, locations,
    maintenance, map, network_links, nvrs, photos, power_supplies, reports, switches,
    technicians, ups, users,
};
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Camtrack API",
        version = "1.0.0",
        description = "Campus security camera infrastructure REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::logout,
        auth::me,
        auth::change_password,
        auth::update_profile,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Locations
        locations::list_locations,
        locations::get_location,
        locations::create_location,
        locations::update_location,
        locations::delete_location,
        locations::children,
        locations::equipment,
        // Cameras
        cameras::list,
        cameras::get,
        cameras::create,
        cameras::update,
        cameras::delete,
        cameras::change_status,
        cameras::maintenance_due,
        // Switches
        switches::list,
        switches::get,
        switches::create,
        switches::update,
        switches::delete,
        switches::change_status,
        switches::usage,
        // NVR/DVR
        nvrs::list,
        nvrs::get,
        nvrs::create,
        nvrs::update,
        nvrs::delete,
        nvrs::change_status,
        // UPS
        ups::list,
        ups::get,
        ups::create,
        ups::update,
        ups::delete,
        ups::change_status,
        // Power supplies
        power_supplies::list,
        power_supplies::get,
        power_supplies::create,
        power_supplies::update,
        power_supplies::delete,
        power_supplies::change_status,
        // Cabinets
        cabinets::list,
        cabinets::get,
        cabinets::create,
        cabinets::update,
        cabinets::delete,
        cabinets::change_status,
        cabinets::contents,
        // Any kind
        equipment::search,
        equipment::by_ip,
        equipment::history,
        equipment::impact,
        network_links::list_links,
        network_links::create_link,
        network_links::set_link_active,
        network_links::delete_link,
        // Technicians
        technicians::list_technicians,
        technicians::get_technician,
        technicians::create_technician,
        technicians::update_technician,
        technicians::delete_technician,
        technicians::workload,
        // Failures
        failures::list_failures,
        failures::get_failure,
        failures::create_failure,
        failures::update_failure,
        failures::delete_failure,
        failures::assign,
        failures::start_repair,
        failures::finish_repair,
        failures::close,
        failures::cancel,
        failures::list_comments,
        failures::add_comment,
        failures::impact,
        failures::list_photos,
        failures::upload_photo,
        // Maintenance
        maintenance::list_maintenance,
        maintenance::get_maintenance,
        maintenance::create_maintenance,
        maintenance::update_maintenance,
        maintenance::delete_maintenance,
        maintenance::start,
        maintenance::complete,
        maintenance::cancel,
        maintenance::upcoming,
        maintenance::overdue,
        maintenance::list_photos,
        maintenance::upload_photo,
        photos::delete_photo,
        // Dashboard & reports
        dashboard::stats,
        dashboard::alerts,
        dashboard::recent,
        reports::summary,
        reports::failures,
        reports::equipment_status,
        // Map
        map::cameras,
        map::buildings,
        map::locations,
        map::stats,
        // Import
        imports::import_sheet,
    ),
    components(
        schemas(
            // Auth & users
            auth::LoginRequest,
            auth::LoginResponse,
            auth::MeResponse,
            models::user::User,
            models::user::UserQuery,
            models::user::CreateUser,
            models::user::UpdateUser,
            models::user::UpdateProfile,
            models::user::ChangePassword,
            models::user::Rights,
            models::user::Resource,
            models::enums::UserRole,
            // Enumerations
            models::enums::EquipmentKind,
            models::enums::EquipmentStatus,
            models::enums::CameraType,
            models::enums::RecorderType,
            models::enums::CabinetType,
            models::enums::LocationKind,
            models::enums::TechnicianStatus,
            models::enums::FailurePriority,
            models::enums::FailureStatus,
            models::enums::MaintenanceKind,
            models::enums::MaintenanceStatus,
            models::enums::LinkType,
            models::enums::PhotoOwner,
            // Locations
            models::location::Location,
            models::location::CreateLocation,
            models::location::UpdateLocation,
            models::location::LocationEquipment,
            // Equipment
            models::equipment::EquipmentCore,
            models::equipment::EquipmentFields,
            models::equipment::EquipmentPatch,
            models::equipment::StatusChange,
            models::equipment::StatusHistoryEntry,
            models::equipment::EquipmentSummary,
            models::equipment::StatusCounts,
            models::camera::Camera,
            models::camera::CreateCamera,
            models::camera::UpdateCamera,
            models::switch::Switch,
            models::switch::CreateSwitch,
            models::switch::UpdateSwitch,
            models::switch::SwitchUsage,
            models::nvr::Nvr,
            models::nvr::CreateNvr,
            models::nvr::UpdateNvr,
            models::ups::Ups,
            models::ups::CreateUps,
            models::ups::UpdateUps,
            models::power_supply::PowerSupply,
            models::power_supply::CreatePowerSupply,
            models::power_supply::UpdatePowerSupply,
            models::cabinet::Cabinet,
            models::cabinet::CreateCabinet,
            models::cabinet::UpdateCabinet,
            models::cabinet::CabinetContents,
            models::network_link::NetworkLink,
            models::network_link::CreateNetworkLink,
            network_links::LinkActivation,
            // Impact
            models::impact::EquipmentRef,
            models::impact::ImpactReason,
            models::impact::ImpactedDevice,
            models::impact::ImpactAnalysis,
            // Technicians
            models::technician::Technician,
            models::technician::CreateTechnician,
            models::technician::UpdateTechnician,
            models::technician::TechnicianWorkload,
            // Failures
            models::failure::Failure,
            models::failure::FailureDetails,
            models::failure::CreateFailure,
            models::failure::UpdateFailure,
            models::failure::AssignFailure,
            models::failure::FinishRepair,
            models::failure::CloseFailure,
            models::failure::CancelFailure,
            models::failure::FailureComment,
            models::failure::CreateComment,
            crate::services::failures::ClosedFailure,
            // Maintenance
            models::maintenance::Maintenance,
            models::maintenance::CreateMaintenance,
            models::maintenance::UpdateMaintenance,
            models::maintenance::CompleteMaintenance,
            // Photos
            models::photo::Photo,
            models::photo::PhotoResponse,
            photos::PhotoForm,
            // Dashboard & reports
            models::report::DashboardTotals,
            models::report::DashboardPercentages,
            models::report::DashboardStats,
            models::report::AlertLevel,
            models::report::Alert,
            models::report::RecentActivity,
            models::report::OverallStatus,
            models::report::ExecutiveSummary,
            models::report::DailyCount,
            models::report::TopEquipment,
            models::report::FailureReport,
            models::report::EquipmentStatusReport,
            // Map
            models::map::MarkerClass,
            models::map::CameraMarker,
            models::map::MapCamerasResponse,
            models::map::AppliedFilters,
            models::map::BuildingsResponse,
            models::map::MapLocation,
            models::map::MapLocationsResponse,
            models::map::BuildingStats,
            models::map::MapStatsResponse,
            // Import
            models::import_report::ImportKind,
            models::import_report::ImportAction,
            models::import_report::RowWarning,
            models::import_report::ImportReport,
            imports::ImportForm,
            // Common
            crate::api::ActionResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Login, logout and own account"),
        (name = "users", description = "User administration"),
        (name = "locations", description = "Campus, buildings and rooms"),
        (name = "cameras", description = "Cameras"),
        (name = "switches", description = "Network switches"),
        (name = "nvrs", description = "NVR/DVR recorders"),
        (name = "ups", description = "UPS units"),
        (name = "power-supplies", description = "Power supplies"),
        (name = "cabinets", description = "Cabinets"),
        (name = "equipment", description = "Search, history and impact across kinds"),
        (name = "network-links", description = "Network dependencies"),
        (name = "technicians", description = "Technicians"),
        (name = "failures", description = "Failure tickets"),
        (name = "maintenance", description = "Maintenance records"),
        (name = "photos", description = "Photo attachments"),
        (name = "dashboard", description = "Dashboard"),
        (name = "reports", description = "Reports"),
        (name = "map", description = "Map UI"),
        (name = "imports", description = "Spreadsheet migration")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(crate::api::SESSION_COOKIE))),
        );
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/cameras/{id}"));
        assert!(doc.paths.paths.contains_key("/failures/{id}/close"));
        assert!(doc.paths.paths.contains_key("/imports/{kind}"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
