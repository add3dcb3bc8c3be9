//! Chart writer: transaction totals per counterparty as `bar_chart.png`.

use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::statement::Statement;

const TOP_N: usize = 30;

/// Total 交易金额 per 对手信息 in major units, sorted descending by
/// absolute value, biggest movers first, capped at `limit` entries.
pub fn counterparty_totals(statement: &Statement, limit: usize) -> Vec<(String, f64)> {
    let mut cents = vec![0i64; statement.counterparties.len()];
    for rec in &statement.records {
        cents[rec.counterparty as usize] += rec.amount_cents;
    }
    let mut totals: Vec<(String, f64)> = statement
        .counterparties
        .iter()
        .zip(&cents)
        .map(|(name, &c)| (name.to_string(), c as f64 / 100.0))
        .collect();
    totals.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    totals.truncate(limit);
    totals
}

/// Abbreviate a bar label with a `k` suffix once it reaches four digits.
pub fn format_k(value: f64) -> String {
    if value.abs() >= 1000.0 {
        format!("{:.1}k", value / 1000.0)
    } else {
        format!("{value:.1}")
    }
}

/// Render the top-30 counterparty bar chart. Labels sit above each bar,
/// below it for negative values.
pub fn write_chart(statement: &Statement, out_dir: &Path) -> Result<PathBuf> {
    let entries = counterparty_totals(statement, TOP_N);
    let path = out_dir.join("bar_chart.png");

    let root = BitMapBackend::new(&path, (1600, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let (mut y_min, mut y_max) = (0.0f64, 0.0f64);
    for (_, v) in &entries {
        y_min = y_min.min(*v);
        y_max = y_max.max(*v);
    }
    let pad = ((y_max - y_min) * 0.1).max(1.0);
    let n = entries.len().max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("对手信息 - 交易金额 （金额前30）", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(140)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..n as f64, (y_min - pad)..(y_max + pad))?;

    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| {
            names
                .get(*x as usize)
                .map(|s| s.to_string())
                .unwrap_or_default()
        })
        .x_desc("对手信息")
        .y_desc("交易金额")
        .draw()?;

    chart.draw_series(entries.iter().enumerate().map(|(i, (_, v))| {
        Rectangle::new([(i as f64 + 0.15, 0.0), (i as f64 + 0.85, *v)], BLUE.filled())
    }))?;
    chart.draw_series(entries.iter().enumerate().map(|(i, (_, v))| {
        let vpos = if *v < 0.0 { VPos::Top } else { VPos::Bottom };
        let style = ("sans-serif", 16)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, vpos));
        Text::new(format_k(*v), (i as f64 + 0.5, *v), style)
    }))?;

    root.present()
        .with_context(|| format!("failed to save {}", path.display()))?;
    info!(path = %path.display(), bars = entries.len(), "chart written");
    Ok(path.clone())
}
