use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use colored::*;
use indicatif::ProgressStyle;
use sweepr_common::network::host::ProbeResult;
use sweepr_core::sweep::ProgressFn;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];
const TIP: &str = "press 'q' to finish early";

pub fn sweep_style() -> anyhow::Result<ProgressStyle> {
    let style = ProgressStyle::with_template(
        "{spinner:.blue} [{bar:24.green/bright_black}] {pos}/{len} {msg}",
    )?
    .progress_chars("█▓░")
    .tick_strings(TICKS);
    Ok(style)
}

/// Prepares `span` to display a sweep over `total` addresses.
pub fn attach_progress(span: &Span, total: u64, show_tip: bool) -> anyhow::Result<()> {
    span.pb_set_style(&sweep_style()?);
    span.pb_set_length(total);
    if show_tip {
        span.pb_set_message(&format!("{}", TIP.italic().white()));
    }
    Ok(())
}

/// Progress callback advancing the bar of `span` and counting live hosts.
pub fn discovery_progress(span: Span) -> ProgressFn {
    let live: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));

    Arc::new(move |result: &ProbeResult| {
        span.pb_inc(1);
        if result.reachable {
            let count: usize = live.fetch_add(1, Ordering::Relaxed) + 1;
            span.pb_set_message(&report_discovery_progress(count));
        }
    })
}

fn report_discovery_progress(count: usize) -> String {
    format!(
        "Identified {} so far...",
        format!("{} hosts", count).green().bold()
    )
    .color(colors::TEXT_DEFAULT)
    .to_string()
}
