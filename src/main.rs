use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ypg_backend::{auth, db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if it exists
    dotenvy::dotenv().ok();

    // Ensure critical environment variables are set
    env::var("JWT_SECRET").expect("JWT_SECRET must be set");

    // Initialize Tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "ypg_backend=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting YPG backend...");

    // Database Setup
    tracing::info!("Initializing database connection pool...");
    let db_pool = db::init_pool().await?;
    tracing::info!("Database connection pool initialized successfully");

    let state = AppState { db: db_pool };

    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(
                env::var("RATE_LIMIT_PER_SECOND")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1200),
            )
            .burst_size(
                env::var("RATE_LIMIT_BURST")
                    .ok()
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(2400),
            )
            .finish()
            .expect("governor config"),
    );

    // CORS configuration (no permissive mode)
    let cors = {
        let env_mode = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let origins = env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|v| {
                v.split(',')
                    .filter_map(|s| {
                        let trimmed = s.trim();
                        if trimmed.is_empty() {
                            return None;
                        }
                        match trimmed.parse::<HeaderValue>() {
                            Ok(value) => Some(value),
                            Err(_) => {
                                tracing::warn!(
                                    "Ignoring invalid ALLOWED_ORIGINS entry: {}",
                                    trimmed
                                );
                                None
                            }
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| {
                if env_mode == "production" {
                    panic!("ALLOWED_ORIGINS must contain at least one valid origin in production")
                }
                vec![
                    HeaderValue::from_static("http://localhost:3000"),
                    HeaderValue::from_static("http://127.0.0.1:3000"),
                ]
            });

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .allow_credentials(true)
    };

    // Router Setup
    let app = Router::new()
        .route("/health", get(health_check))
        // Auth Routes
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/status", get(auth::status))
        // Events
        .route(
            "/api/events",
            get(routes::events::list_events).post(routes::events::create_event),
        )
        .route(
            "/api/events/{id}",
            put(routes::events::update_event).delete(routes::events::delete_event),
        )
        .route("/api/events/{id}/restore", post(routes::events::restore_event))
        // Team
        .route(
            "/api/team",
            get(routes::team::list_team_members).post(routes::team::create_team_member),
        )
        .route(
            "/api/team/{id}",
            put(routes::team::update_team_member).delete(routes::team::delete_team_member),
        )
        .route("/api/team/{id}/restore", post(routes::team::restore_team_member))
        // Testimonials
        .route(
            "/api/testimonials",
            get(routes::testimonials::list_testimonials)
                .post(routes::testimonials::create_testimonial),
        )
        .route(
            "/api/testimonials/{id}",
            put(routes::testimonials::update_testimonial)
                .delete(routes::testimonials::delete_testimonial),
        )
        .route(
            "/api/testimonials/{id}/restore",
            post(routes::testimonials::restore_testimonial),
        )
        // Ministry registrations
        .route("/api/ministries", get(routes::ministries::list_registrations))
        .route("/api/ministries/register", post(routes::ministries::register))
        .route(
            "/api/ministries/{id}",
            delete(routes::ministries::delete_registration),
        )
        .route(
            "/api/ministries/{id}/approve",
            post(routes::ministries::approve_registration),
        )
        .route(
            "/api/ministries/{id}/restore",
            post(routes::ministries::restore_registration),
        )
        // Donations
        .route(
            "/api/donations",
            get(routes::donations::list_donations).post(routes::donations::submit_donation),
        )
        .route("/api/donations/export", get(routes::donations::export_csv))
        .route(
            "/api/donations/{id}",
            put(routes::donations::update_donation).delete(routes::donations::delete_donation),
        )
        .route(
            "/api/donations/{id}/verify",
            post(routes::donations::verify_donation),
        )
        .route(
            "/api/donations/{id}/reject",
            post(routes::donations::reject_donation),
        )
        // Quizzes
        .route(
            "/api/quizzes",
            get(routes::quizzes::list_quizzes).post(routes::quizzes::create_quiz),
        )
        .route("/api/quizzes/active", get(routes::quizzes::active_quiz))
        .route(
            "/api/quizzes/verify-password",
            post(routes::quizzes::verify_password),
        )
        .route("/api/quizzes/submit", post(routes::quizzes::submit))
        .route("/api/quizzes/results", get(routes::quizzes::results))
        .route(
            "/api/quizzes/congregation-stats",
            get(routes::quizzes::congregation_stats),
        )
        .route("/api/quizzes/{id}", delete(routes::quizzes::delete_quiz))
        .route("/api/quizzes/{id}/end", post(routes::quizzes::end_quiz))
        .layer(cors)
        .layer(GovernorLayer::new(governor_config))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
}

async fn health_check() -> &'static str {
    "OK"
}
