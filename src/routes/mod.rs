pub mod photos;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::auth::auth_middleware;
use crate::services::photos::{PhotoService, MAX_FILE_SIZE};

/// Must stay above `MAX_FILE_SIZE`; oversized photos are rejected by the service.
const UPLOAD_BODY_LIMIT: usize = MAX_FILE_SIZE * 2;

#[derive(Clone)]
pub struct AppState {
    pub photos: PhotoService,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(photos: PhotoService, jwt_secret: &str) -> Self {
        Self {
            photos,
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        photos::upload_photo,
        photos::list_photos,
        photos::delete_photo,
        photos::set_main_photo,
        photos::photo_url,
    ),
    components(
        schemas(
            crate::models::photo::PhotoResponse,
            photos::PhotoUrlResponse,
        )
    ),
    tags(
        (name = "Photos", description = "Spot photo upload, listing and main photo selection")
    ),
    info(
        title = "SpotPhotoKit API",
        version = "0.1.0",
        description = "Photo lifecycle service for spots: variant generation, storage and main photo bookkeeping",
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(
                utoipa::openapi::security::Http::new(
                    utoipa::openapi::security::HttpAuthScheme::Bearer
                )
            ),
        );
    }
}

pub fn create_routes(state: AppState) -> Router {
    let swagger_router: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into();

    let photo_routes = Router::new()
        .route(
            "/spots/{spot_id}/photos",
            post(photos::upload_photo).get(photos::list_photos),
        )
        .route("/photos/{photo_id}", delete(photos::delete_photo))
        .route("/photos/{photo_id}/main", put(photos::set_main_photo))
        .route("/photos/{photo_id}/url", get(photos::photo_url))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let app_routes = Router::new().merge(photo_routes).with_state(state);

    // Swagger UI carries no state
    Router::new()
        .merge(swagger_router)
        .merge(app_routes)
        .layer(TraceLayer::new_for_http())
}
