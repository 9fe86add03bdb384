// Wire types for the reporting backend.
//
// Field names mirror the backend's JSON exactly (camelCase for report
// payloads, snake_case for the token fields the auth service emits).
// Report rows are immutable once fetched -- nothing here is mutated
// client-side.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Report rows ─────────────────────────────────────────────────────

/// One day of exchange-wide traffic counters and rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub date: NaiveDate,
    pub total_requests: i64,
    pub multi_impression: i64,
    pub big_guidance: i64,
    pub addressable: i64,
    pub compliance_strings: i64,
    pub deals: i64,
    pub tmax: i64,
    pub invalid_requests: i64,
    /// Percentage (0-100), not a fraction.
    pub timeout_rate: f64,
    /// Percentage (0-100), not a fraction.
    pub bid_rate: f64,
    pub created_at: DateTime<Utc>,
}

/// Per-platform counts of populated OpenRTB content-object fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentHealth {
    pub date: NaiveDate,
    pub platform: String,
    pub total_requests: i64,
    pub album: i64,
    pub artist: i64,
    pub cat: i64,
    pub context: i64,
    pub data: i64,
    pub embeddable: i64,
    pub episode: i64,
    pub genre: i64,
    pub id: i64,
    pub kwarray: i64,
    pub keywords: i64,
    pub length: i64,
    pub language: i64,
    pub livestream: i64,
    pub season: i64,
    pub series: i64,
    pub title: i64,
    pub url: i64,
    pub videoquality: i64,
    pub created_at: DateTime<Utc>,
}

/// Per-platform counts of populated OpenRTB video-object fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoHealth {
    pub date: NaiveDate,
    pub platform: String,
    /// Share of requests from Connected TV devices, as a percentage.
    pub percent_ctv: f64,
    pub api: i64,
    pub boxing_allowed: i64,
    pub delivery: i64,
    pub h: i64,
    pub linearity: i64,
    pub max_bitrate: i64,
    pub max_duration: i64,
    pub mimes: i64,
    pub min_bitrate: i64,
    pub min_cpm_per_sec: i64,
    pub min_duration: i64,
    pub placement: i64,
    pub play_backend: i64,
    pub pod_dur: i64,
    pub pod_id: i64,
    pub pos: i64,
    pub protocols: i64,
    pub rqd_durs: i64,
    pub skip: i64,
    pub skip_after: i64,
    pub skip_min: i64,
    pub slot_in_pod: i64,
    pub start_delay: i64,
    pub w: i64,
    pub max_seq: i64,
    pub companion_ad: i64,
    pub companion_type: i64,
    pub protocol: i64,
    pub placement_type: i64,
    pub created_at: DateTime<Utc>,
}

// ── Response envelopes ──────────────────────────────────────────────

/// The query parameters echoed back by the report endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoedQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// Envelope for the report list endpoints: rows, count, echoed query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsResponse<T> {
    pub data: Vec<T>,
    pub count: usize,
    pub query: EchoedQuery,
}

/// Pre-aggregated dashboard payload: the latest platform-stats row plus
/// per-platform aggregates (content-request totals, video CTV averages).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub latest_stats: PlatformStats,
    pub content_summary: BTreeMap<String, f64>,
    pub video_summary: BTreeMap<String, f64>,
    pub last_updated: DateTime<Utc>,
}

// ── Auth ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Viewer,
    Analyst,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

/// Token fields use snake_case on the wire, unlike the report payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}
