//! RouteLink backend entry point.
//!
//! Loads configuration, initialises structured logging, runs the schema
//! migrations (failing loudly rather than continuing against a stale
//! schema), and serves the HTTP API.

use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use routelink::inbound::http::health::{self, HealthState};
use routelink::outbound::persistence::{run_migrations, DbPool, PoolConfig};
use routelink::server::{api_services, build_http_state, session_middleware, AppConfig};
use routelink::Trace;

#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %err, "tracing init failed");
    }

    let config = AppConfig::parse();
    let key = config.session_key()?;
    let cookie_secure = config.cookie_secure;

    let pool = DbPool::new(PoolConfig::new(&config.database))?;
    run_migrations(&pool)?;

    let state = web::Data::new(build_http_state(&pool, config.email_domain.clone()));
    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(state.clone())
            .app_data(server_health_state.clone())
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(session_middleware(key.clone(), cookie_secure))
                    .configure(api_services),
            )
            .service(health::ready)
            .service(health::live);

        #[cfg(debug_assertions)]
        let app = {
            use utoipa::OpenApi;
            app.route(
                "/api-docs/openapi.json",
                web::get().to(|| async {
                    actix_web::HttpResponse::Ok().json(routelink::doc::ApiDoc::openapi())
                }),
            )
        };

        app
    })
    .bind(config.bind)?;

    health_state.mark_ready();
    info!(bind = %config.bind, database = %config.database, "routelink backend listening");
    server.run().await?;
    Ok(())
}
