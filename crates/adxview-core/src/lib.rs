//! Client-side data layer for ad exchange reporting.
//!
//! [`ReportService`] owns the connection to one reporting backend and a
//! per-query cache with in-flight deduplication, generation-based
//! supersession and periodic background refresh. The [`metrics`],
//! [`derive`] and [`export`] modules turn fetched rows into summaries,
//! chart series and CSV files, all driven by one set of column
//! descriptors per report kind.

pub mod cache;
pub mod config;
pub mod derive;
pub mod error;
pub mod export;
pub mod metrics;
pub mod presets;
pub mod query;
pub mod service;

/// Wire-level report and auth types, shared with the HTTP client.
pub use adxview_api::models;

pub use config::{AuthCredentials, BackendConfig, TlsVerification};
pub use error::CoreError;
pub use metrics::{table_columns, Aggregation, FieldValue, MetricColumn, ReportRow};
pub use presets::{DateRange, RangePreset};
pub use query::{Platform, ReportKind, ReportQuery};
pub use service::{ConnectionState, ReportCollection, ReportService, Session};
