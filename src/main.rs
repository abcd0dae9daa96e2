use actix_web::{HttpServer, web};
use path_generalizer::{AnalyzerConfig, AnalyzerState, AppMetrics, LogFormat, ServerConfig, create_app};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    // RUST_LOG wins when set, e.g. RUST_LOG=path_generalizer=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let server_config = ServerConfig::from_env();
    let analyzer_config = AnalyzerConfig::from_env();

    init_tracing(server_config.log_format);

    // Built once so every worker shares the same analyzers
    let state = web::Data::new(AnalyzerState::new(&analyzer_config));
    let metrics = web::Data::new(AppMetrics::new().map_err(std::io::Error::other)?);

    info!(
        bind_addr = %server_config.bind_addr,
        endpoint_threshold = analyzer_config.endpoint_threshold,
        open_threshold = analyzer_config.open_threshold,
        excluded_opens = analyzer_config.excluded_opens.len(),
        "Starting path generalizer"
    );

    let bind_addr = server_config.bind_addr.clone();
    HttpServer::new(move || {
        create_app(
            state.clone(),
            metrics.clone(),
            analyzer_config.clone(),
            server_config.clone(),
        )
    })
    .bind(bind_addr)?
    .run()
    .await
}
