use crate::middleware::cors::cors_layer;
use axum::{middleware, Router};

mod auth;
mod gallery;
mod players;
mod results;
mod schedule;
mod stats;

/// Function for creating the router with all the application routes
pub fn router() -> Router {
    Router::new().nest("/api", api_router())
}

/// Creates a router for the routes that reside under /api
fn api_router() -> Router {
    Router::new()
        // Authentication routes
        .nest("/auth", auth::router())
        // Roster routing
        .nest("/players", players::router())
        // Match schedule routing
        .nest("/schedule", schedule::router())
        // Match results routing
        .nest("/results", results::router())
        // Statistics routing
        .nest("/stats", stats::router())
        // Media gallery routing
        .nest("/gallery", gallery::router())
        // CORS middleware is applied to all API routes to allow browser access
        .layer(middleware::from_fn(cors_layer))
}
