use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::browser::PageSession;
use crate::compare::Comparator;
use crate::config::Config;
use crate::models::{ComparisonRow, LinkPair, RunEvent};
use crate::scrapers::{PriceScraper, SkuScraper};
use crate::sheet;

/// Identifies one run for the presentation side.
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    pub run: u32,
    pub first_run_at: DateTime<Local>,
    pub started_at: DateTime<Local>,
}

/// Scrapes and compares every link pair of a sheet, one row at a time.
pub struct Runner {
    config: Arc<Config>,
    prices: PriceScraper,
    skus: SkuScraper,
    comparator: Comparator,
}

impl Runner {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            prices: PriceScraper::new(config.clone()),
            skus: SkuScraper::new(config.clone()),
            comparator: Comparator::new(config.compare.price_precision),
            config,
        }
    }

    /// Read `sheet_path`, compare every pair and close the browser session.
    ///
    /// The session is closed whether or not the sheet could be read.
    pub async fn run(
        &self,
        session: &mut dyn PageSession,
        sheet_path: &Path,
        context: RunContext,
        events: &UnboundedSender<RunEvent>,
    ) -> Result<Vec<ComparisonRow>> {
        let result = self.run_sheet(session, sheet_path, context, events).await;

        if let Err(e) = session.close().await {
            error!("Failed to close browser: {}", e);
        }

        match &result {
            Ok(rows) => {
                info!("Run {} finished with {} rows", context.run, rows.len());
                emit(events, RunEvent::Completed { rows: rows.clone() });
            }
            Err(e) => {
                error!("Run {} failed: {:#}", context.run, e);
                emit(events, RunEvent::Failed(format!("{:#}", e)));
            }
        }
        result
    }

    async fn run_sheet(
        &self,
        session: &mut dyn PageSession,
        sheet_path: &Path,
        context: RunContext,
        events: &UnboundedSender<RunEvent>,
    ) -> Result<Vec<ComparisonRow>> {
        let pairs = sheet::read_link_pairs(sheet_path, &self.config.sheet)?;
        if !pairs.is_empty() {
            session
                .start()
                .await
                .context("Failed to start browser session")?;
        }

        emit(
            events,
            RunEvent::Started {
                run: context.run,
                first_run_at: context.first_run_at,
                started_at: context.started_at,
                total: pairs.len(),
            },
        );

        Ok(self.compare_pairs(session, &pairs, events).await)
    }

    /// Compare pairs in order, emitting progress, alerts and rows as they land.
    pub async fn compare_pairs(
        &self,
        session: &mut dyn PageSession,
        pairs: &[LinkPair],
        events: &UnboundedSender<RunEvent>,
    ) -> Vec<ComparisonRow> {
        let total = pairs.len();
        let mut rows = Vec::with_capacity(total);

        for (index, pair) in pairs.iter().enumerate() {
            let sequence = index + 1;
            emit(events, RunEvent::Progress(progress_percent(sequence, total)));

            let row = self.compare_pair(session, sequence, pair).await;
            for kind in self.comparator.alerts_for(&row, pair) {
                warn!("Row {}: {}", sequence, kind);
                emit(
                    events,
                    RunEvent::Alert {
                        kind,
                        row: row.clone(),
                        pair: pair.clone(),
                    },
                );
            }
            emit(events, RunEvent::Row(row.clone()));
            rows.push(row);

            if sequence < total {
                sleep(self.config.request_delay()).await;
            }
        }

        rows
    }

    async fn compare_pair(
        &self,
        session: &mut dyn PageSession,
        sequence: usize,
        pair: &LinkPair,
    ) -> ComparisonRow {
        let a_price = self.prices.fetch(session, &pair.link_a).await;
        let b_price = self.prices.fetch(session, &pair.link_b).await;
        let a_sku = self.skus.fetch_with_retry(session, &pair.link_a).await;
        let b_sku = self.skus.fetch_with_retry(session, &pair.link_b).await;

        ComparisonRow {
            sequence,
            a_price,
            b_price,
            a_sku,
            b_sku,
        }
    }
}

/// Percentage reached when starting row `sequence` (1-based) of `total`.
pub fn progress_percent(sequence: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (sequence.min(total) * 100 / total) as u8
}

fn emit(events: &UnboundedSender<RunEvent>, event: RunEvent) {
    if events.send(event).is_err() {
        warn!("Presentation channel closed, dropping run event");
    }
}
