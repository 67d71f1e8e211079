use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod customers;
pub mod doc;
pub mod health;
pub mod params;
pub mod repairs;
pub mod reports;
pub mod spare_parts;
pub mod transactions;
pub mod vehicles;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/customers", customers::router())
        .nest("/vehicles", vehicles::router())
        .nest("/repairs", repairs::router())
        .nest("/spare-parts", spare_parts::router())
        .nest("/transactions", transactions::router())
        .nest("/reports", reports::router())
}
