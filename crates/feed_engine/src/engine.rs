use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use feed_logging::feed_debug;

use crate::fetch::PageFetcher;
use crate::{EngineError, EngineEvent, JobId, PageQuery};

enum EngineCommand {
    Fetch { job_id: JobId, query: PageQuery },
}

/// Runs page fetches on a background runtime and hands results back over a channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_time()
            .build()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let fetcher = fetcher.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(fetcher.as_ref(), command, event_tx).await;
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn enqueue(&self, job_id: JobId, query: PageQuery) {
        let _ = self.cmd_tx.send(EngineCommand::Fetch { job_id, query });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    fetcher: &dyn PageFetcher,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Fetch { job_id, query } => {
            let result = fetcher.fetch_page(&query).await;
            feed_debug!("job {} finished (ok={})", job_id, result.is_ok());
            let _ = event_tx.send(EngineEvent::FetchCompleted {
                job_id,
                query,
                result,
            });
        }
    }
}
