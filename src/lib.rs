//! # Battery Monitor
//!
//! Samples the host battery's charge state into an embedded SQLite database
//! and serves a small web UI for browsing the history one day at a time.
//!
//! ## Modules
//!
//! - [`battery`]: reading raw battery attributes from sysfs
//! - [`store`]: the persistent sample log (schema, inserts, day queries)
//! - [`monitor`]: the background sampling loop with start/stop lifecycle
//! - [`query`]: pagination and downsampling over the store
//! - [`api`]: the Axum HTTP server and embedded front-end
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use battery_monitor::battery::SysfsBattery;
//! use battery_monitor::monitor::Sampler;
//! use battery_monitor::store::SampleStore;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SampleStore::open("battery-monitor.db".as_ref())?);
//!     store.migrate()?;
//!
//!     let sampler = Sampler::new(
//!         Arc::new(SysfsBattery::new()),
//!         store,
//!         Duration::from_secs(1),
//!     );
//!     let handle = sampler.handle();
//!
//!     // handle.stop() ends the loop at the next cycle boundary
//!     sampler.run().await;
//!     # drop(handle);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod battery;
pub mod config;
pub mod monitor;
pub mod query;
pub mod store;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, ApiResult, AppState};
pub use battery::{PowerSource, ReadError, Sample, Status, SysfsBattery};
pub use config::{Config, ConfigError};
pub use monitor::{Sampler, SamplerHandle, SamplingError};
pub use query::{DayListing, QueryError, QueryService};
pub use store::{DayPage, SampleStore, StoreError, StoreResult};
