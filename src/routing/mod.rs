//! Routing Module
//!
//! Provides the routing decision surface:
//! - Candidate filtering pipeline
//! - Geo, latency, and priority selection strategies
//! - The region router façade

pub mod router;
pub mod strategy;

pub use router::RegionRouter;
pub use strategy::{RouteRequest, StrategyEngine};
