//! Background thread running backend calls so the terminal loop never blocks
//! on HTTP.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::{Backend, DbAction};
use crate::account::{self, AccountAction, AccountOutcome};
use crate::admin::{self, DbOutcome};
use crate::view::controller::{self, ContactOutcome, ContactRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Contacts(ContactRequest),
    Db(DbAction),
    Account(AccountAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Contacts(ContactOutcome),
    Db(DbOutcome),
    Account(AccountOutcome),
}

pub fn execute(backend: &dyn Backend, request: Request) -> Outcome {
    match request {
        Request::Contacts(request) => Outcome::Contacts(controller::perform(backend, request)),
        Request::Db(action) => Outcome::Db(admin::run(backend, action)),
        Request::Account(action) => Outcome::Account(account::run(backend, action)),
    }
}

pub struct Worker {
    requests: Option<Sender<Request>>,
    outcomes: Receiver<Outcome>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn(backend: Box<dyn Backend>) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<Request>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<Outcome>();

        let handle = thread::Builder::new()
            .name("kontakty-api".to_string())
            .spawn(move || {
                info!("api worker started");
                for request in request_rx {
                    debug!(request = ?request, "executing");
                    let outcome = execute(backend.as_ref(), request);
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
                info!("api worker stopped");
            })
            .context("failed to spawn api worker thread")?;

        Ok(Self {
            requests: Some(request_tx),
            outcomes: outcome_rx,
            handle: Some(handle),
        })
    }

    /// Queue a request. Returns false once the worker has gone away.
    pub fn submit(&self, request: Request) -> bool {
        self.requests
            .as_ref()
            .map(|tx| tx.send(request).is_ok())
            .unwrap_or(false)
    }

    pub fn submit_all<I>(&self, requests: I)
    where
        I: IntoIterator<Item = Request>,
    {
        for request in requests {
            self.submit(request);
        }
    }

    pub fn try_recv(&self) -> Option<Outcome> {
        match self.outcomes.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
