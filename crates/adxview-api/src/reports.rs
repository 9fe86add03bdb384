// Report endpoints.
//
// All four endpoints are plain GETs; dates travel as `YYYY-MM-DD`
// query parameters, exactly as the browser dashboard sent them.

use chrono::NaiveDate;
use tracing::debug;

use crate::client::ReportsClient;
use crate::error::Error;
use crate::models::{
    ContentHealth, DashboardSummary, PlatformStats, ReportsResponse, VideoHealth,
};

fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl ReportsClient {
    /// Fetch the pre-aggregated dashboard summary.
    ///
    /// `GET /api/reports/dashboard`
    pub async fn get_dashboard(&self) -> Result<DashboardSummary, Error> {
        debug!("fetching dashboard summary");
        self.get("api/reports/dashboard", &[]).await
    }

    /// Fetch exchange-wide platform statistics for a date range.
    ///
    /// `GET /api/reports/platform?start&end`
    pub async fn get_platform_stats(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReportsResponse<PlatformStats>, Error> {
        debug!(%start, %end, "fetching platform stats");
        self.get(
            "api/reports/platform",
            &[("start", fmt_date(start)), ("end", fmt_date(end))],
        )
        .await
    }

    /// Fetch content-object health counts for a platform and date range.
    ///
    /// `GET /api/reports/content?platform&start&end`
    pub async fn get_content_health(
        &self,
        platform: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReportsResponse<ContentHealth>, Error> {
        debug!(platform, %start, %end, "fetching content health");
        self.get(
            "api/reports/content",
            &[
                ("platform", platform.to_owned()),
                ("start", fmt_date(start)),
                ("end", fmt_date(end)),
            ],
        )
        .await
    }

    /// Fetch video-object health counts for a platform and date range.
    ///
    /// `GET /api/reports/video?platform&start&end`
    pub async fn get_video_health(
        &self,
        platform: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReportsResponse<VideoHealth>, Error> {
        debug!(platform, %start, %end, "fetching video health");
        self.get(
            "api/reports/video",
            &[
                ("platform", platform.to_owned()),
                ("start", fmt_date(start)),
                ("end", fmt_date(end)),
            ],
        )
        .await
    }
}
