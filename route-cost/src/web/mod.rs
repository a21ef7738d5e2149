//! Web layer for the route cost estimator.
//!
//! Provides HTTP endpoints for pricing routes and trips and for
//! classifying points.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, DEFAULT_REQUEST_DEADLINE};
