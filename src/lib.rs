//! # meshroute - Region Routing & Failover Engine
//!
//! Decides which regional backend deployment should serve each request,
//! while tracking per-region health and latency and cutting failing
//! regions out of rotation:
//! - **config**: validated region catalog and routing policy
//! - **health**: periodic endpoint probing with hysteresis and p95 latency
//! - **breaker**: CLOSED / OPEN / HALF_OPEN per-region circuit breakers
//! - **routing**: geo, latency, and priority selection strategies
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meshroute::{RegionRouter, RouteRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = RegionRouter::from_config_file("regions.json").unwrap();
//!     router.start_health_checks();
//!
//!     let request = RouteRequest::new().with_source_country("DE");
//!     match router.route(&request) {
//!         Some(region) => println!("serving from {}", region.id),
//!         None => println!("no region available"),
//!     }
//! }
//! ```

pub mod breaker;
pub mod config;
pub mod core;
pub mod health;
pub mod routing;

pub use config::{RegionCatalog, RegionConfig};
pub use core::error::{Error, Result};
pub use routing::{RegionRouter, RouteRequest};
