//! Application state and factory
//!
//! [`AppState`] is resolved once from the environment's container;
//! [`create_app`] wires it into an Actix-web application.

use actix_web::{error, web, App, HttpResponse};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use qz_core::container::Container;
use qz_core::persistence::{DatabaseContext, DATABASE_CONTEXT};
use qz_core::errors::DomainError;
use qz_core::services::{Clock, IdGenerator, CLOCK, ID_GENERATOR};
use qz_infra::database::DatabaseProvider;
use qz_infra::DATABASE_PROVIDER;
use qz_shared::{error_codes, ErrorResponse};

use crate::routes::{health, users};

/// Services shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<DatabaseContext>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    /// Connection cache, absent when the environment runs in memory
    pub database: Option<Arc<DatabaseProvider>>,
}

impl AppState {
    /// Resolve the request-facing services from a configured container
    pub async fn from_container(container: &Container) -> Result<Self, DomainError> {
        let database = if container.has(&DATABASE_PROVIDER) {
            Some(container.resolve(&DATABASE_PROVIDER).await?)
        } else {
            None
        };

        Ok(Self {
            context: container.resolve(&DATABASE_CONTEXT).await?,
            clock: container.resolve(&CLOCK).await?,
            ids: container.resolve(&ID_GENERATOR).await?,
            database,
        })
    }
}

/// Create and configure the application
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let body = ErrorResponse::new(error_codes::BAD_REQUEST, err.to_string());
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    });

    App::new()
        .app_data(state)
        .app_data(json_config)
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/v1").service(
                web::scope("/users")
                    .route("", web::post().to(users::create_user))
                    .route("/{id}", web::get().to(users::get_user)),
            ),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
