mod console;

pub use console::ConsoleView;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::models::RunEvent;

/// Anything that shows run events to a person: the terminal, a webhook.
#[async_trait]
pub trait Presenter: Send {
    async fn present(&mut self, event: &RunEvent);
}

/// Feed every event to each presenter in order until all senders are dropped.
pub async fn dispatch(mut events: UnboundedReceiver<RunEvent>, mut presenters: Vec<Box<dyn Presenter>>) {
    while let Some(event) = events.recv().await {
        for presenter in presenters.iter_mut() {
            presenter.present(&event).await;
        }
    }
    debug!("Run event channel closed");
}
