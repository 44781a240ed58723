use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::browser::PageSession;
use crate::config::Config;
use crate::models::{ComparisonRow, RunEvent, RunState};
use crate::runner::{RunContext, Runner};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("No spreadsheet selected")]
    NoInput,

    #[error("A run is already in progress")]
    AlreadyRunning,
}

/// Bookkeeping shown alongside the results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Status {
    pub state: RunState,
    pub input: Option<PathBuf>,
    pub run_count: u32,
    pub first_run_at: Option<DateTime<Local>>,
    pub last_run_at: Option<DateTime<Local>>,
}

/// Owns the shared browser session and runs comparisons on a background task.
pub struct Checker {
    config: Arc<Config>,
    runner: Arc<Runner>,
    session: Arc<Mutex<Box<dyn PageSession>>>,
    status: Arc<Mutex<Status>>,
    events: UnboundedSender<RunEvent>,
}

pub type RunHandle = JoinHandle<Result<Vec<ComparisonRow>>>;

impl Checker {
    pub fn new(
        config: Arc<Config>,
        session: Box<dyn PageSession>,
        events: UnboundedSender<RunEvent>,
    ) -> Self {
        Self {
            runner: Arc::new(Runner::new(config.clone())),
            config,
            session: Arc::new(Mutex::new(session)),
            status: Arc::new(Mutex::new(Status::default())),
            events,
        }
    }

    pub async fn set_input(&self, path: PathBuf) {
        self.status.lock().await.input = Some(path);
    }

    pub async fn status(&self) -> Status {
        self.status.lock().await.clone()
    }

    /// Move from idle to running and spawn the worker.
    ///
    /// The worker flips the state back to idle when it finishes.
    pub async fn start(&self) -> Result<RunHandle, StartError> {
        let (input, context) = {
            let mut status = self.status.lock().await;
            let input = match &status.input {
                Some(input) => input.clone(),
                None => {
                    warn!("Cannot start: no spreadsheet selected");
                    return Err(StartError::NoInput);
                }
            };
            if status.state == RunState::Running {
                warn!("Cannot start: a run is already in progress");
                return Err(StartError::AlreadyRunning);
            }

            let now = Local::now();
            status.state = RunState::Running;
            status.run_count += 1;
            let first_run_at = *status.first_run_at.get_or_insert(now);
            status.last_run_at = Some(now);

            let context = RunContext {
                run: status.run_count,
                first_run_at,
                started_at: now,
            };
            (input, context)
        };

        info!(
            "Starting run {} at {}",
            context.run,
            context.started_at.format("%Y-%m-%d %H:%M")
        );

        let runner = self.runner.clone();
        let session = self.session.clone();
        let status = self.status.clone();
        let events = self.events.clone();

        Ok(tokio::spawn(async move {
            let result = {
                let mut session = session.lock().await;
                runner.run(&mut **session, &input, context, &events).await
            };
            status.lock().await.state = RunState::Idle;
            result
        }))
    }

    /// Run, wait for completion, then wait `task.interval_minutes` and run again.
    ///
    /// Returns after the first run when `once` is set or the interval is zero.
    pub async fn run_scheduled<F>(&self, once: bool, mut on_complete: F) -> Result<()>
    where
        F: FnMut(&[ComparisonRow]),
    {
        loop {
            let handle = self.start().await.map_err(|e| anyhow!(e))?;

            match handle.await {
                Ok(Ok(rows)) => on_complete(&rows),
                Ok(Err(e)) => error!("Run failed: {:#}", e),
                Err(e) => error!("Comparison worker stopped unexpectedly: {}", e),
            }

            let interval = if once { None } else { self.config.run_interval() };
            match interval {
                Some(interval) => {
                    info!("Next run in {} minutes", interval.as_secs() / 60);
                    sleep(interval).await;
                }
                None => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakeSession;
    use std::io::Write;
    use tokio::sync::mpsc;

    fn checker() -> (Checker, mpsc::UnboundedReceiver<RunEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let checker = Checker::new(
            Arc::new(Config::default()),
            Box::new(FakeSession::default()),
            tx,
        );
        (checker, rx)
    }

    fn empty_sheet() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "链接A,链接B").unwrap();
        file
    }

    #[tokio::test]
    async fn start_requires_input() {
        let (checker, _rx) = checker();
        assert_eq!(checker.start().await.unwrap_err(), StartError::NoInput);
        assert_eq!(checker.status().await.run_count, 0);
    }

    #[tokio::test]
    async fn second_start_while_running_is_rejected() {
        let (checker, _rx) = checker();
        let sheet = empty_sheet();
        checker.set_input(sheet.path().to_path_buf()).await;

        let handle = checker.start().await.unwrap();
        assert_eq!(checker.start().await.unwrap_err(), StartError::AlreadyRunning);

        handle.await.unwrap().unwrap();
        let status = checker.status().await;
        assert_eq!(status.state, RunState::Idle);
        assert_eq!(status.run_count, 1);
    }

    #[tokio::test]
    async fn first_run_time_is_kept_across_runs() {
        let (checker, mut rx) = checker();
        let sheet = empty_sheet();
        checker.set_input(sheet.path().to_path_buf()).await;

        checker.start().await.unwrap().await.unwrap().unwrap();
        let first = checker.status().await;
        checker.start().await.unwrap().await.unwrap().unwrap();
        let second = checker.status().await;

        assert_eq!(second.run_count, 2);
        assert_eq!(second.first_run_at, first.first_run_at);
        assert!(second.last_run_at >= first.last_run_at);

        let mut runs = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let RunEvent::Started { run, total, .. } = event {
                runs.push((run, total));
            }
        }
        assert_eq!(runs, vec![(1, 0), (2, 0)]);
    }

    #[tokio::test]
    async fn run_scheduled_once_reports_rows() {
        let (checker, _rx) = checker();
        let sheet = empty_sheet();
        checker.set_input(sheet.path().to_path_buf()).await;

        let mut completed = 0;
        checker
            .run_scheduled(true, |rows| {
                assert!(rows.is_empty());
                completed += 1;
            })
            .await
            .unwrap();
        assert_eq!(completed, 1);
    }

    #[tokio::test]
    async fn failed_sheet_read_returns_to_idle() {
        let (checker, mut rx) = checker();
        checker
            .set_input(PathBuf::from("/nonexistent/links.xlsx"))
            .await;

        let result = checker.start().await.unwrap().await.unwrap();
        assert!(result.is_err());
        assert_eq!(checker.status().await.state, RunState::Idle);
        assert!(matches!(rx.recv().await, Some(RunEvent::Failed(_))));
    }
}
