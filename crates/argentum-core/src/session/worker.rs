//! Background recompute thread for native hosts.
//!
//! The session hands out [`RecomputeTicket`]s; a [`PreviewWorker`] runs them
//! off the UI thread and sends back [`RecomputeResult`]s for
//! [`EditSession::accept`](super::EditSession::accept). Tickets queued
//! behind a newer one are skipped without running.

use std::io;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::adjustments::{ColorFilter, StandardColorFilter};
use crate::pipeline::EditPipeline;

use super::{RecomputeResult, RecomputeTicket};

pub struct PreviewWorker {
    tickets: Option<mpsc::Sender<RecomputeTicket>>,
    results: mpsc::Receiver<RecomputeResult>,
    handle: Option<JoinHandle<()>>,
}

impl PreviewWorker {
    /// Start a worker with the standard color filter.
    pub fn spawn() -> io::Result<Self> {
        Self::spawn_with(EditPipeline::<StandardColorFilter>::new())
    }

    pub fn spawn_with<F>(pipeline: EditPipeline<F>) -> io::Result<Self>
    where
        F: ColorFilter + 'static,
    {
        let (ticket_tx, ticket_rx) = mpsc::channel::<RecomputeTicket>();
        let (result_tx, result_rx) = mpsc::channel::<RecomputeResult>();

        let handle = std::thread::Builder::new()
            .name("argentum-preview".into())
            .spawn(move || worker_loop(ticket_rx, result_tx, pipeline))?;

        Ok(Self {
            tickets: Some(ticket_tx),
            results: result_rx,
            handle: Some(handle),
        })
    }

    /// Queue a ticket. Returns `false` if the worker thread has exited.
    pub fn submit(&self, ticket: RecomputeTicket) -> bool {
        match &self.tickets {
            Some(tx) => tx.send(ticket).is_ok(),
            None => false,
        }
    }

    /// Next finished result, if any, without blocking.
    pub fn try_recv(&self) -> Option<RecomputeResult> {
        self.results.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<RecomputeResult> {
        self.results.recv_timeout(timeout).ok()
    }
}

impl Drop for PreviewWorker {
    fn drop(&mut self) {
        // Closing the channel ends the loop.
        self.tickets.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("preview worker panicked");
            }
        }
    }
}

fn worker_loop<F: ColorFilter>(
    tickets: mpsc::Receiver<RecomputeTicket>,
    results: mpsc::Sender<RecomputeResult>,
    pipeline: EditPipeline<F>,
) {
    while let Ok(mut ticket) = tickets.recv() {
        while let Ok(newer) = tickets.try_recv() {
            tracing::trace!(
                skipped = ticket.generation(),
                generation = newer.generation(),
                "superseded ticket skipped"
            );
            ticket = newer;
        }

        if let Some(result) = ticket.run(&pipeline) {
            if results.send(result).is_err() {
                break;
            }
        }
    }
    tracing::debug!("preview worker stopped");
}
