use axum::Router;

pub mod orders;
pub mod restocks;
pub mod system;
pub mod warehouse;

/// Router for the stock endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/magazzino", warehouse::router())
        .nest("/ordini", orders::router())
        .nest("/riordini", restocks::router())
}
