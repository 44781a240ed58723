use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::io::{self, Write};

use super::Presenter;
use crate::models::{AlertKind, ComparisonRow, RunEvent};
use crate::parsers::format_price;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Terminal rendering of a run: banner, progress, results table, alerts.
pub struct ConsoleView {
    precision: u32,
    color: bool,
}

impl ConsoleView {
    pub fn new(precision: u32) -> Self {
        Self {
            precision,
            color: true,
        }
    }

    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn render_banner(
        run: u32,
        first_run_at: DateTime<Local>,
        started_at: DateTime<Local>,
        total: usize,
    ) -> String {
        format!(
            "Run #{} | first run {} | this run {} | {} rows",
            run,
            first_run_at.format(TIME_FORMAT),
            started_at.format(TIME_FORMAT),
            total
        )
    }

    pub fn render_progress(percent: u8) -> String {
        format!("{:>3}%", percent)
    }

    pub fn render_table(rows: &[ComparisonRow], precision: u32) -> String {
        let header = ["#", "A price", "A SKU", "B price", "B SKU"];
        let body: Vec<[String; 5]> = rows
            .iter()
            .map(|row| {
                [
                    row.sequence.to_string(),
                    format_price(row.a_price, precision),
                    ComparisonRow::sku_display(&row.a_sku).to_string(),
                    format_price(row.b_price, precision),
                    ComparisonRow::sku_display(&row.b_sku).to_string(),
                ]
            })
            .collect();

        let mut widths = header.map(|h| h.chars().count());
        for cells in &body {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_line(&mut out, header.iter().map(|h| h.to_string()), &widths);
        push_line(
            &mut out,
            widths.iter().map(|w| "-".repeat(*w)),
            &widths,
        );
        for cells in body {
            push_line(&mut out, cells.into_iter(), &widths);
        }
        out
    }

    pub fn render_row(row: &ComparisonRow, precision: u32) -> String {
        format!(
            "#{} A {} [{}] / B {} [{}]",
            row.sequence,
            format_price(row.a_price, precision),
            ComparisonRow::sku_display(&row.a_sku),
            format_price(row.b_price, precision),
            ComparisonRow::sku_display(&row.b_sku)
        )
    }

    pub fn render_alert(&self, kind: AlertKind, row: &ComparisonRow) -> String {
        let label = format!("[{}]", kind.label());
        let label = if self.color {
            let color = kind.color();
            format!(
                "\x1b[1;38;2;{};{};{}m{}\x1b[0m",
                (color >> 16) & 0xFF,
                (color >> 8) & 0xFF,
                color & 0xFF,
                label
            )
        } else {
            label
        };
        format!("{} Row {}: {}", label, row.sequence, kind.message())
    }
}

fn push_line(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    let _ = writeln!(out, "{}", line.trim_end());
}

#[async_trait]
impl Presenter for ConsoleView {
    async fn present(&mut self, event: &RunEvent) {
        let text = match event {
            RunEvent::Started {
                run,
                first_run_at,
                started_at,
                total,
            } => Self::render_banner(*run, *first_run_at, *started_at, *total),
            RunEvent::Progress(percent) => Self::render_progress(*percent),
            RunEvent::Row(row) => Self::render_row(row, self.precision),
            RunEvent::Alert { kind, row, .. } => self.render_alert(*kind, row),
            RunEvent::Completed { rows } => Self::render_table(rows, self.precision),
            RunEvent::Failed(reason) => format!("Run failed: {}", reason),
        };

        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", text.trim_end());
    }
}
