// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Channel-backed worker running a [`Session`] on a blocking task.
//!
//! One bounded inbound channel carries requests; one outbound channel carries
//! responses and progress. Requests are handled strictly one at a time and
//! there is no cancellation: a caller that no longer wants a result simply
//! discards it.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::WorkerConfig;
use crate::dispatch::dispatch;
use crate::error::WorkerError;
use crate::messages::{Outbound, ProgressMessage, Request, Response};
use crate::session::Session;

/// Client side of a running worker.
pub struct WorkerHandle {
    requests: mpsc::Sender<Request>,
    events: mpsc::UnboundedReceiver<Outbound>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Start a worker with its own session. Must be called inside a Tokio runtime.
    pub fn spawn(config: WorkerConfig) -> Self {
        let (request_tx, request_rx) = mpsc::channel(config.queue_depth.max(1));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let session = Session::new(config);

        let task = tokio::task::spawn_blocking(move || run(session, request_rx, event_tx));

        Self {
            requests: request_tx,
            events: event_rx,
            task,
        }
    }

    /// Queue a request without waiting for its response.
    pub async fn send(&self, request: Request) -> Result<(), WorkerError> {
        self.requests
            .send(request)
            .await
            .map_err(|_| WorkerError::Disconnected)
    }

    /// Next response or progress message; `None` once the worker has stopped.
    pub async fn next_event(&mut self) -> Option<Outbound> {
        self.events.recv().await
    }

    /// Send a request and wait for its response, forwarding progress.
    ///
    /// Responses are delivered in request order, so this assumes no earlier
    /// `send` is still awaiting collection.
    pub async fn call<F>(
        &mut self,
        request: Request,
        mut on_progress: F,
    ) -> Result<Response, WorkerError>
    where
        F: FnMut(ProgressMessage),
    {
        self.send(request).await?;
        while let Some(event) = self.events.recv().await {
            match event {
                Outbound::Progress(progress) => on_progress(progress),
                Outbound::Response(response) => return Ok(response),
            }
        }
        Err(WorkerError::Disconnected)
    }

    /// Close the request channel and wait for the worker to drain and exit.
    pub async fn shutdown(self) -> Result<(), WorkerError> {
        let WorkerHandle { requests, events, task } = self;
        drop(requests);
        task.await?;
        drop(events);
        Ok(())
    }
}

fn run(
    mut session: Session,
    mut requests: mpsc::Receiver<Request>,
    events: mpsc::UnboundedSender<Outbound>,
) {
    tracing::debug!("worker started");

    while let Some(request) = requests.blocking_recv() {
        let span = tracing::debug_span!("request", kind = request.kind());
        let _guard = span.enter();
        let start = std::time::Instant::now();

        let response = dispatch(&mut session, request, |progress| {
            let _ = events.send(Outbound::Progress(progress));
        });

        tracing::debug!(
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            success = response.is_success(),
            "request handled"
        );

        if events.send(Outbound::Response(response)).is_err() {
            tracing::debug!("event receiver dropped, stopping worker");
            break;
        }
    }

    tracing::debug!("worker stopped");
}
