//! Dashboard command handler.

use std::fmt::Write as _;

use owo_colors::OwoColorize;

use adxview_core::cache::FetchState;
use adxview_core::models::DashboardSummary;
use adxview_core::ReportService;

use crate::cli::{DashboardArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    service: &ReportService,
    args: DashboardArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let summary = service.dashboard(false).await?;
    render(global, &summary);

    if args.watch {
        let Some(mut rx) = service.subscribe_dashboard() else {
            return Ok(());
        };
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => return Ok(()),
                changed = rx.changed() => {
                    if changed.is_err() {
                        return Ok(());
                    }
                    let state = rx.borrow_and_update().clone();
                    match state {
                        FetchState::Ready { value, .. } => render(global, &value),
                        FetchState::Failed(e) => eprintln!("refresh failed: {e}"),
                        FetchState::Pending => {}
                    }
                }
            }
        }
    }
    Ok(())
}

fn render(global: &GlobalOpts, summary: &DashboardSummary) {
    let color = output::should_color(&global.color);
    let rendered = output::render_single(
        &global.output,
        summary,
        |s| detail(s, color),
        |s| s.last_updated.to_rfc3339(),
    );
    output::print_output(&rendered, global.quiet);
}

/// Multi-section text view: latest platform stats, then the per-platform
/// content and video aggregates.
fn detail(summary: &DashboardSummary, color: bool) -> String {
    let mut out = String::new();
    let heading = |text: &str| {
        if color {
            text.bold().to_string()
        } else {
            text.to_owned()
        }
    };

    let stats = &summary.latest_stats;
    let _ = writeln!(out, "{}", heading(&format!("Latest stats ({})", stats.date)));
    let _ = writeln!(out, "  Total requests:   {}", stats.total_requests);
    let _ = writeln!(out, "  Multi impression: {}", stats.multi_impression);
    let _ = writeln!(out, "  Bid rate:         {:.2}", stats.bid_rate);
    let _ = writeln!(out, "  Timeout rate:     {:.2}", stats.timeout_rate);
    let _ = writeln!(out, "  Deals:            {}", stats.deals);
    let _ = writeln!(out, "  Invalid requests: {}", stats.invalid_requests);

    let _ = writeln!(out, "\n{}", heading("Content requests by platform"));
    for (platform, value) in &summary.content_summary {
        let _ = writeln!(out, "  {platform:<10} {}", output::format_metric(*value));
    }

    let _ = writeln!(out, "\n{}", heading("Video CTV share by platform"));
    for (platform, value) in &summary.video_summary {
        let _ = writeln!(out, "  {platform:<10} {}", output::format_metric(*value));
    }

    let _ = write!(
        out,
        "\nLast updated: {}",
        summary.last_updated.with_timezone(&chrono::Local)
    );
    out
}
