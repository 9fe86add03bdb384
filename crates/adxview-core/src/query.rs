//! Report queries and their cache identity.

use chrono::NaiveDate;
use strum::{Display, EnumIter, EnumString};

use crate::error::CoreError;

/// Ad platforms the backend segments content and video reports by.
///
/// The string forms match the backend's query parameter values exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Platform {
    #[strum(serialize = "CTV")]
    Ctv,
    #[strum(serialize = "Audio")]
    Audio,
    #[strum(serialize = "Display")]
    Display,
    #[strum(serialize = "App")]
    App,
}

/// The three row-level report families served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ReportKind {
    #[strum(serialize = "platform-stats")]
    Platform,
    #[strum(serialize = "content-health")]
    Content,
    #[strum(serialize = "video-health")]
    Video,
}

impl ReportKind {
    /// Platforms a report of this kind can be filtered by. Empty means the
    /// report is not segmented by platform.
    pub fn platforms(self) -> &'static [Platform] {
        match self {
            Self::Platform => &[],
            Self::Content => &[Platform::Ctv, Platform::Audio],
            Self::Video => &[Platform::Ctv, Platform::Display, Platform::App],
        }
    }
}

/// A fully specified report request. Equal queries share one cache slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportQuery {
    pub kind: ReportKind,
    pub platform: Option<Platform>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportQuery {
    /// Build a validated query.
    ///
    /// Rejects inverted date ranges before any request is issued, requires a
    /// platform for segmented report kinds and rejects platforms the kind
    /// does not support.
    pub fn new(
        kind: ReportKind,
        platform: Option<Platform>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        match (kind.platforms(), platform) {
            ([], Some(p)) => {
                return Err(CoreError::InvalidQuery {
                    reason: format!("{kind} reports are not segmented by platform (got {p})"),
                });
            }
            ([], None) => {}
            (allowed, Some(p)) if !allowed.contains(&p) => {
                return Err(CoreError::InvalidQuery {
                    reason: format!("platform {p} is not available for {kind} reports"),
                });
            }
            (_, Some(_)) => {}
            (_, None) => {
                return Err(CoreError::InvalidQuery {
                    reason: format!("{kind} reports require a platform"),
                });
            }
        }
        Ok(Self {
            kind,
            platform,
            start,
            end,
        })
    }

    /// Stable cache key: `{kind}:{platform or -}:{start}:{end}`.
    pub fn cache_key(&self) -> String {
        let platform = self
            .platform
            .map_or_else(|| "-".to_owned(), |p| p.to_string());
        format!("{}:{}:{}:{}", self.kind, platform, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        let err = ReportQuery::new(
            ReportKind::Platform,
            None,
            date("2026-03-10"),
            date("2026-03-01"),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidDateRange { .. }));
    }

    #[test]
    fn single_day_range_is_valid() {
        let q = ReportQuery::new(
            ReportKind::Platform,
            None,
            date("2026-03-10"),
            date("2026-03-10"),
        )
        .unwrap();
        assert_eq!(q.cache_key(), "platform-stats:-:2026-03-10:2026-03-10");
    }

    #[test]
    fn segmented_kinds_require_a_supported_platform() {
        let err = ReportQuery::new(
            ReportKind::Content,
            None,
            date("2026-03-01"),
            date("2026-03-10"),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuery { .. }));

        let err = ReportQuery::new(
            ReportKind::Content,
            Some(Platform::Display),
            date("2026-03-01"),
            date("2026-03-10"),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuery { .. }));
    }

    #[test]
    fn cache_key_distinguishes_platforms() {
        let ctv = ReportQuery::new(
            ReportKind::Video,
            Some(Platform::Ctv),
            date("2026-03-01"),
            date("2026-03-10"),
        )
        .unwrap();
        let app = ReportQuery::new(
            ReportKind::Video,
            Some(Platform::App),
            date("2026-03-01"),
            date("2026-03-10"),
        )
        .unwrap();
        assert_eq!(ctv.cache_key(), "video-health:CTV:2026-03-01:2026-03-10");
        assert_ne!(ctv.cache_key(), app.cache_key());
    }

    #[test]
    fn platform_strings_round_trip() {
        for p in [Platform::Ctv, Platform::Audio, Platform::Display, Platform::App] {
            assert_eq!(p.to_string().parse::<Platform>().unwrap(), p);
        }
    }
}
