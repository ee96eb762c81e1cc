use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinicflow::config::{AppConfig, Config};
use clinicflow::middleware::{ErrorLogger, RequestId};
use clinicflow::modules::appointments::repositories::MySqlAppointmentRepository;
use clinicflow::modules::reports::controllers;
use clinicflow::modules::reports::repositories::MySqlCostAnalysisRepository;
use clinicflow::modules::reports::{ProfitabilityDashboard, ReportService};

fn init_tracing(app: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("clinicflow={},actix_web=info", app.log_level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if app.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config.app);
    config.validate().context("Configuration validation failed")?;

    tracing::info!("Starting clinicflow reporting service");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!(
        "Reports rendered in {} ({})",
        config.reports.currency,
        config.reports.locale
    );

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .context("Failed to create database pool")?;

    tracing::info!(
        "Database pool initialized ({} max connections)",
        config.database.max_connections
    );

    if config.database.run_migrations {
        config.database.migrate(&db_pool).await?;
        tracing::info!("Database migrations applied");
    }

    let report_service = Arc::new(ReportService::new(
        Arc::new(MySqlAppointmentRepository::new(db_pool.clone())),
        Arc::new(MySqlCostAnalysisRepository::new(db_pool)),
    ));
    let dashboard = web::Data::new(ProfitabilityDashboard::new(
        report_service.clone(),
        config.reports.default_period,
    ));
    let service_data = web::Data::from(report_service);
    let format_data = web::Data::new(config.reports.display_format());
    let reports_data = web::Data::new(config.reports.clone());

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(ErrorLogger)
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .wrap(Cors::default().allow_any_origin().allowed_methods(vec!["GET"]))
            .app_data(dashboard.clone())
            .app_data(service_data.clone())
            .app_data(format_data.clone())
            .app_data(reports_data.clone())
            .route("/health", web::get().to(health_check))
            .configure(controllers::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await.context("HTTP server error")
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "clinicflow"
    }))
}
