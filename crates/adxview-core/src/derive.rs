//! Views derived from fetched report rows.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::metrics::{Aggregation, MetricColumn, ReportRow};

/// One charted value for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A named series of per-day values, in row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: &'static str,
    pub points: Vec<SeriesPoint>,
}

/// Fold rows into one value per aggregating column.
///
/// Columns with no aggregation (the date) are skipped. Insertion order
/// follows the column table. An empty row set yields zero for every column,
/// means included.
pub fn summarize<R: ReportRow>(
    rows: &[R],
    columns: &[MetricColumn],
) -> IndexMap<&'static str, f64> {
    let mut summary = IndexMap::new();
    for col in columns {
        let Some(aggregate) = col.aggregate else {
            continue;
        };
        let total: f64 = rows
            .iter()
            .filter_map(|row| row.field(col.key))
            .map(|v| v.as_f64())
            .sum();
        let value = match aggregate {
            Aggregation::Sum => total,
            Aggregation::Mean => {
                if rows.is_empty() {
                    0.0
                } else {
                    total / rows.len() as f64
                }
            }
        };
        summary.insert(col.key, value);
    }
    summary
}

/// Extract one chart series per field key, dated by row.
///
/// Rows missing a key contribute no point to that series, so series lengths
/// can differ. Keys unknown to the row type produce an empty series rather
/// than an error.
pub fn chart_series<R: ReportRow>(rows: &[R], keys: &[&'static str]) -> Vec<ChartSeries> {
    keys.iter()
        .map(|&name| ChartSeries {
            name,
            points: rows
                .iter()
                .filter_map(|row| {
                    row.field(name).map(|v| SeriesPoint {
                        date: row.date(),
                        value: v.as_f64(),
                    })
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::table_columns;
    use crate::models::PlatformStats;
    use crate::query::ReportKind;

    fn row(day: &str, total_requests: i64, bid_rate: f64) -> PlatformStats {
        PlatformStats {
            date: day.parse().unwrap(),
            total_requests,
            multi_impression: total_requests / 10,
            big_guidance: 0,
            addressable: 0,
            compliance_strings: 0,
            deals: 1,
            tmax: 0,
            invalid_requests: 0,
            timeout_rate: 0.05,
            bid_rate,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn summary_sums_counters_and_averages_rates() {
        let rows = [
            row("2026-03-01", 100, 0.6),
            row("2026-03-02", 300, 0.8),
        ];
        let summary = summarize(&rows, table_columns(ReportKind::Platform));

        assert_eq!(summary["totalRequests"], 400.0);
        assert_eq!(summary["multiImpression"], 40.0);
        assert!((summary["bidRate"] - 0.7).abs() < f64::EPSILON);
        assert!((summary["timeoutRate"] - 0.05).abs() < f64::EPSILON);
        assert!(!summary.contains_key("date"));
    }

    #[test]
    fn empty_rows_summarize_to_zeros() {
        let rows: [PlatformStats; 0] = [];
        let summary = summarize(&rows, table_columns(ReportKind::Platform));

        assert_eq!(summary["totalRequests"], 0.0);
        assert_eq!(summary["bidRate"], 0.0);
        assert_eq!(summary.len(), 6);
    }

    #[test]
    fn summary_preserves_column_order() {
        let rows = [row("2026-03-01", 10, 0.5)];
        let summary = summarize(&rows, table_columns(ReportKind::Platform));
        let keys: Vec<_> = summary.keys().copied().collect();
        assert_eq!(
            keys,
            [
                "totalRequests",
                "multiImpression",
                "bidRate",
                "timeoutRate",
                "deals",
                "invalidRequests"
            ]
        );
    }

    #[test]
    fn chart_series_follow_row_order() {
        let rows = [
            row("2026-03-01", 100, 0.6),
            row("2026-03-02", 300, 0.8),
        ];
        let series = chart_series(&rows, &["totalRequests", "bidRate"]);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "totalRequests");
        assert_eq!(series[0].points.len(), 2);
        assert_eq!(series[0].points[0].date, "2026-03-01".parse().unwrap());
        assert_eq!(series[0].points[1].value, 300.0);
        assert_eq!(series[1].points[1].value, 0.8);
    }

    #[test]
    fn unknown_chart_keys_yield_empty_series() {
        let rows = [row("2026-03-01", 100, 0.6)];
        let series = chart_series(&rows, &["noSuchField"]);
        assert_eq!(series.len(), 1);
        assert!(series[0].points.is_empty());
    }
}
