//! Report command handlers: platform, content, video.
//!
//! All three share one pipeline: resolve the date range, build a validated
//! query, fetch through the service cache, then emit rows, a summary, chart
//! series or a CSV export. With `--watch`, the handler stays subscribed to
//! the cache slot and re-renders as the background refresh updates it.

use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::watch;

use adxview_core::cache::FetchState;
use adxview_core::derive::{chart_series, summarize, ChartSeries};
use adxview_core::export::{export_filename, to_csv};
use adxview_core::metrics::chart_keys;
use adxview_core::{
    table_columns, MetricColumn, ReportCollection, ReportKind, ReportQuery, ReportRow,
    ReportService,
};

use crate::cli::{GlobalOpts, OutputFormat, PlatformArgs, ReportViewArgs, SegmentedArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn platform(
    service: &ReportService,
    args: PlatformArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (start, end) = util::resolve_range(&args.range);
    let query = ReportQuery::new(ReportKind::Platform, None, start, end)?;
    let collection = service.platform_stats(&query).await?;
    emit_view(global, &args.view, &collection, table_columns(query.kind))?;
    if args.view.watch {
        watch_rows(
            service.subscribe_platform(&query),
            global,
            &args.view,
            table_columns(query.kind),
        )
        .await;
    }
    Ok(())
}

pub async fn content(
    service: &ReportService,
    args: SegmentedArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (start, end) = util::resolve_range(&args.range);
    let query = ReportQuery::new(ReportKind::Content, Some(args.platform), start, end)?;
    let collection = service.content_health(&query).await?;
    emit_view(global, &args.view, &collection, table_columns(query.kind))?;
    if args.view.watch {
        watch_rows(
            service.subscribe_content(&query),
            global,
            &args.view,
            table_columns(query.kind),
        )
        .await;
    }
    Ok(())
}

pub async fn video(
    service: &ReportService,
    args: SegmentedArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (start, end) = util::resolve_range(&args.range);
    let query = ReportQuery::new(ReportKind::Video, Some(args.platform), start, end)?;
    let collection = service.video_health(&query).await?;
    emit_view(global, &args.view, &collection, table_columns(query.kind))?;
    if args.view.watch {
        watch_rows(
            service.subscribe_video(&query),
            global,
            &args.view,
            table_columns(query.kind),
        )
        .await;
    }
    Ok(())
}

// ── Shared emit pipeline ─────────────────────────────────────────────

fn emit_view<R>(
    global: &GlobalOpts,
    view: &ReportViewArgs,
    collection: &ReportCollection<R>,
    columns: &[MetricColumn],
) -> Result<(), CliError>
where
    R: ReportRow + Serialize,
{
    let query = &collection.query;
    let rows = &collection.rows;

    if let Some(ref path) = view.export {
        let path = if path.as_os_str().is_empty() {
            PathBuf::from(export_filename(
                query.kind,
                query.platform,
                query.start,
                query.end,
            ))
        } else {
            path.clone()
        };
        std::fs::write(&path, to_csv(rows, columns))?;
        if !global.quiet {
            eprintln!("Exported {} rows to {}", rows.len(), path.display());
        }
        return Ok(());
    }

    let rendered = if view.summary {
        let summary = summarize(rows, columns);
        output::render_summary(&global.output, &summary, columns)
    } else if view.chart {
        render_chart(&global.output, rows, query.kind)
    } else {
        output::render_rows(&global.output, rows, columns)
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}

/// Chart series are inherently structured, so table/plain formats fall back
/// to pretty JSON.
fn render_chart<R: ReportRow>(format: &OutputFormat, rows: &[R], kind: ReportKind) -> String {
    let (bar_keys, line_keys) = chart_keys(kind);
    let mut series: Vec<ChartSeries> = chart_series(rows, bar_keys);
    series.extend(chart_series(rows, line_keys));
    match format {
        OutputFormat::JsonCompact => output::render_json(&series, true),
        OutputFormat::Yaml => output::render_yaml(&series),
        _ => output::render_json(&series, false),
    }
}

// ── Watch mode ───────────────────────────────────────────────────────

/// Re-render on every cache update until Ctrl-C or disconnect.
async fn watch_rows<R>(
    rx: Option<watch::Receiver<FetchState<ReportCollection<R>>>>,
    global: &GlobalOpts,
    view: &ReportViewArgs,
    columns: &[MetricColumn],
) where
    R: ReportRow + Serialize,
{
    let Some(mut rx) = rx else { return };
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return,
            changed = rx.changed() => {
                if changed.is_err() {
                    // Cache slot dropped, the service is shutting down.
                    return;
                }
                let state = rx.borrow_and_update().clone();
                match state {
                    FetchState::Ready { value, fetched_at } => {
                        if !global.quiet {
                            let local = fetched_at.with_timezone(&chrono::Local);
                            eprintln!("── refreshed at {} ──", local.format("%H:%M:%S"));
                        }
                        if let Err(e) = emit_view(global, view, &value, columns) {
                            eprintln!("render failed: {e}");
                        }
                    }
                    FetchState::Failed(e) => eprintln!("refresh failed: {e}"),
                    FetchState::Pending => {}
                }
            }
        }
    }
}
