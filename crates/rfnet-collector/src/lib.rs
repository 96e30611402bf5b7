//! rfnet-collector - ingest, persistence and live fan-out of sensor readings.
//!
//! # Architecture
//!
//! ```text
//!  base station ──POST /api/v1/readings──▶ ingest ──▶ ReadingStore (SQLite)
//!                                             │
//!                                             ▼ verbatim body
//!                                      SubscriberRegistry ──▶ per-subscriber queue ──▶ WebSocket
//!
//!  viewers ──GET /api/v1/readings[/latest], /api/v1/sensors──▶ query ──▶ ReadingStore
//! ```
//!
//! # Routes
//!
//! | method | path | |
//! |--------|------|-|
//! | POST | `/api/v1/readings` | persist one reading, then broadcast it |
//! | GET | `/api/v1/readings?start=&end=` | readings in `[start, end)`, ascending |
//! | GET | `/api/v1/readings/latest` | most recent reading per sensor |
//! | GET | `/api/v1/ws` | live stream of ingested bodies |
//! | GET/POST | `/api/v1/sensors` | sensor directory list / upsert |
//! | GET | `/api/v1/health` | liveness and subscriber count |
//! | GET | `/metrics` | Prometheus text exposition |

pub mod config;
pub mod error;
pub mod ingest;
pub mod query;
pub mod registry;
pub mod server;
pub mod state;
pub mod ws;

pub use config::CollectorConfig;
pub use error::{ApiError, CollectorError, CollectorResult};
pub use registry::{BroadcastReport, SubscriberRegistry, Subscription};
pub use server::{create_router, run_server, serve};
pub use state::AppState;
