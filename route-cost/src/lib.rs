//! Route cost estimation server.
//!
//! Answers: "what will fuel and tolls cost me along this route?", splitting
//! the route by country and degrading to estimates when price data is
//! missing.

pub mod cache;
pub mod cost;
pub mod domain;
pub mod geo;
pub mod pricing;
pub mod route_provider;
pub mod web;
