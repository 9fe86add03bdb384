//! CSV export of report rows.

use std::borrow::Cow;

use chrono::NaiveDate;

use crate::metrics::{MetricColumn, ReportRow};
use crate::query::{Platform, ReportKind};

/// Render rows as CSV with a header of column labels.
///
/// Fields containing a comma, double quote or newline are quoted, with inner
/// quotes doubled, so a standard CSV reader recovers the original values.
/// Output uses `\n` line endings and ends with a trailing newline.
pub fn to_csv<R: ReportRow>(rows: &[R], columns: &[MetricColumn]) -> String {
    let mut out = String::new();
    write_record(&mut out, columns.iter().map(|c| Cow::Borrowed(c.label)));
    for row in rows {
        write_record(
            &mut out,
            columns.iter().map(|c| {
                row.field(c.key)
                    .map_or(Cow::Borrowed(""), |v| Cow::Owned(v.to_string()))
            }),
        );
    }
    out
}

/// Suggested file name for an export, e.g.
/// `content-health-CTV-2026-03-01-to-2026-03-07.csv`.
pub fn export_filename(
    kind: ReportKind,
    platform: Option<Platform>,
    start: NaiveDate,
    end: NaiveDate,
) -> String {
    match platform {
        Some(p) => format!("{kind}-{p}-{start}-to-{end}.csv"),
        None => format!("{kind}-{start}-to-{end}.csv"),
    }
}

fn write_record<'a>(out: &mut String, fields: impl Iterator<Item = Cow<'a, str>>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&escape(&field));
    }
    out.push('\n');
}

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains(['"', ',', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{table_columns, FieldValue};

    struct FakeRow {
        date: NaiveDate,
        name: String,
        total: i64,
    }

    impl ReportRow for FakeRow {
        fn date(&self) -> NaiveDate {
            self.date
        }

        fn field(&self, key: &str) -> Option<FieldValue> {
            Some(match key {
                "date" => FieldValue::Text(self.date.to_string()),
                "name" => FieldValue::Text(self.name.clone()),
                "total" => FieldValue::Int(self.total),
                _ => return None,
            })
        }
    }

    const COLUMNS: [MetricColumn; 3] = [
        MetricColumn {
            key: "date",
            label: "Date",
            aggregate: None,
        },
        MetricColumn {
            key: "name",
            label: "Name",
            aggregate: None,
        },
        MetricColumn {
            key: "total",
            label: "Total",
            aggregate: None,
        },
    ];

    fn fake(name: &str, total: i64) -> FakeRow {
        FakeRow {
            date: "2026-03-01".parse().unwrap(),
            name: name.to_owned(),
            total,
        }
    }

    #[test]
    fn header_row_uses_column_labels() {
        let csv = to_csv(&[] as &[FakeRow], &COLUMNS);
        assert_eq!(csv, "Date,Name,Total\n");
    }

    #[test]
    fn plain_fields_are_unquoted() {
        let csv = to_csv(&[fake("drama", 42)], &COLUMNS);
        assert_eq!(csv, "Date,Name,Total\n2026-03-01,drama,42\n");
    }

    #[test]
    fn commas_quotes_and_newlines_are_escaped() {
        let csv = to_csv(&[fake("a,b", 1), fake("say \"hi\"", 2), fake("two\nlines", 3)], &COLUMNS);
        let lines: Vec<&str> = csv.splitn(2, '\n').collect();
        assert_eq!(lines[0], "Date,Name,Total");
        assert!(csv.contains("\"a,b\""));
        assert!(csv.contains("\"say \"\"hi\"\"\""));
        assert!(csv.contains("\"two\nlines\""));
    }

    #[test]
    fn platform_export_carries_every_table_column() {
        let columns = table_columns(ReportKind::Platform);
        let csv = to_csv(&[] as &[crate::models::PlatformStats], columns);
        assert_eq!(
            csv,
            "Date,Total Requests,Multi Impression,Bid Rate,Timeout Rate,Deals,Invalid Requests\n"
        );
    }

    #[test]
    fn filenames_embed_kind_platform_and_range() {
        let start: NaiveDate = "2026-03-01".parse().unwrap();
        let end: NaiveDate = "2026-03-07".parse().unwrap();
        assert_eq!(
            export_filename(ReportKind::Platform, None, start, end),
            "platform-stats-2026-03-01-to-2026-03-07.csv"
        );
        assert_eq!(
            export_filename(ReportKind::Content, Some(Platform::Ctv), start, end),
            "content-health-CTV-2026-03-01-to-2026-03-07.csv"
        );
    }
}
