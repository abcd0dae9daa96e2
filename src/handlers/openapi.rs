//! OpenAPI specification generation and app factory.

use crate::{
    config::{AnalyzerConfig, ServerConfig},
    handlers::{get_metrics, health, reconcile_endpoints, reconcile_opens, version},
    services::{AnalyzerState, AppMetrics},
};
use actix_web::App;
use paperclip::actix::{OpenApiExt, web};
use paperclip::v2::models::{DefaultApiRaw, Info};

/// Creates the shared OpenAPI specification for the API
pub fn create_openapi_spec() -> DefaultApiRaw {
    DefaultApiRaw {
        info: Info {
            title: "Path Generalizer".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: Some(
                "Learns which segments of observed paths are dynamic and rewrites them into generalized patterns.\n\n\
                ## Wildcard marker\n\
                Dynamic segments are replaced by `\u{22ef}` (U+22EF). Submitting an already generalized \
                path keeps it generalized.\n\
                \n\
                ## Batches\n\
                - `POST /api/endpoints/reconcile`: HTTP endpoints in `host:port/path` form\n\
                - `POST /api/opens/reconcile`: paths passed to `open()`, with optional exclusions\n\
                \n\
                Analyzers keep their history for the lifetime of the process, so the same batch can be \
                generalized differently once more traffic has been observed.\n\
                \n\
                **Configuration:**\n\
                - `GENERALIZER_ENDPOINT_THRESHOLD` / `GENERALIZER_OPEN_THRESHOLD`: distinct literals allowed per position (default 100)\n\
                - `GENERALIZER_EXCLUDED_OPENS`: comma-separated paths never generalized"
                    .into(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Creates an app around existing shared state
///
/// `HttpServer::new` calls its factory once per worker; the analyzers must be
/// built once outside of it and handed in so every worker learns into the
/// same tries.
pub fn create_app(
    state: actix_web::web::Data<AnalyzerState>,
    metrics: actix_web::web::Data<AppMetrics>,
    analyzer_config: AnalyzerConfig,
    server_config: ServerConfig,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap_api_with_spec(create_openapi_spec())
        .app_data(state)
        .app_data(metrics)
        .app_data(web::Data::new(analyzer_config))
        .app_data(web::Data::new(server_config))
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/version").route(web::get().to(version)))
        .service(web::resource("/api/metrics").route(web::get().to(get_metrics)))
        .service(web::resource("/api/endpoints/reconcile").route(web::post().to(reconcile_endpoints)))
        .service(web::resource("/api/opens/reconcile").route(web::post().to(reconcile_opens)))
        .with_json_spec_at("/api/spec/v2")
        .build()
}

/// Creates an app with fresh state loaded from the environment
///
/// Intended for tests and single-worker setups.
pub fn create_base_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let analyzer_config = AnalyzerConfig::from_env();
    let server_config = ServerConfig::from_env();
    let state = web::Data::new(AnalyzerState::new(&analyzer_config));
    let metrics = web::Data::new(AppMetrics::new().expect("Failed to create metrics"));

    create_app(state, metrics, analyzer_config, server_config)
}
