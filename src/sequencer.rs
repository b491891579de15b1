//! # Invoice Sequencer
//!
//! Hands out `INV-YYYYMMDD-NNN` numbers. One actor owns a counter per calendar date and processes
//! requests one at a time, so each call is a single increment-and-read and no two callers can see
//! the same number for a date.
//!
//! The counter is written to the [`Store`](actor_framework::Store) before the number is returned.
//! If that write fails the counter is not advanced and the caller gets
//! [`SequencerError::Unavailable`]. A number that was issued but never used by an order is not
//! handed out again, so gaps are possible and duplicates are not.
//!
//! At startup, [`SequencerActor::reconcile`] raises each counter to at least the highest sequence
//! already present on persisted orders, so a lost or stale counter store cannot cause reuse.

use crate::model::InvoiceNumber;
use actor_framework::{MemoryStore, SharedStore};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SequencerError {
    #[error("Invoice sequencer unavailable: {0}")]
    Unavailable(String),
}

/// Durable `date -> last issued sequence` records.
pub type CounterStore = SharedStore<NaiveDate, u32>;

struct NextNumber {
    date: NaiveDate,
    respond_to: oneshot::Sender<Result<InvoiceNumber, SequencerError>>,
}

/// Owns the per-date counters. Spawn [`run`](Self::run) once; talk to it through
/// [`SequencerClient`].
pub struct SequencerActor {
    receiver: mpsc::Receiver<NextNumber>,
    counters: HashMap<NaiveDate, u32>,
    store: CounterStore,
}

impl SequencerActor {
    /// A sequencer with fresh in-memory counters.
    pub fn new(capacity: usize) -> (Self, SequencerClient) {
        let (sender, receiver) = mpsc::channel(capacity);
        let actor = Self {
            receiver,
            counters: HashMap::new(),
            store: Arc::new(MemoryStore::<NaiveDate, u32>::new()),
        };
        (actor, SequencerClient { sender })
    }

    /// A sequencer whose counters are loaded from `store`.
    pub async fn with_store(
        capacity: usize,
        store: CounterStore,
    ) -> Result<(Self, SequencerClient), SequencerError> {
        let counters = store
            .load()
            .await
            .map_err(|e| SequencerError::Unavailable(e.to_string()))?
            .into_iter()
            .collect();

        let (sender, receiver) = mpsc::channel(capacity);
        let actor = Self {
            receiver,
            counters,
            store,
        };
        Ok((actor, SequencerClient { sender }))
    }

    /// Raises counters so the next number for each date is past every number in `issued`.
    pub async fn reconcile(
        &mut self,
        issued: impl IntoIterator<Item = InvoiceNumber>,
    ) -> Result<(), SequencerError> {
        let mut highest: HashMap<NaiveDate, u32> = HashMap::new();
        for number in issued {
            let entry = highest.entry(number.date()).or_default();
            *entry = (*entry).max(number.sequence());
        }

        let behind: Vec<(NaiveDate, u32)> = highest
            .into_iter()
            .filter(|(date, seen)| self.counters.get(date).copied().unwrap_or(0) < *seen)
            .collect();
        if behind.is_empty() {
            return Ok(());
        }

        warn!(dates = behind.len(), "Counter store behind persisted orders, reconciling");
        self.store
            .put(behind.clone())
            .await
            .map_err(|e| SequencerError::Unavailable(e.to_string()))?;
        self.counters.extend(behind);
        Ok(())
    }

    pub async fn run(mut self) {
        info!(dates = self.counters.len(), "Sequencer started");

        while let Some(NextNumber { date, respond_to }) = self.receiver.recv().await {
            let result = self.next(date).await;
            match &result {
                Ok(number) => debug!(invoice = %number, "Issued"),
                Err(e) => warn!(%date, error = %e, "Could not issue invoice number"),
            }
            let _ = respond_to.send(result);
        }

        info!(dates = self.counters.len(), "Sequencer shutdown");
    }

    async fn next(&mut self, date: NaiveDate) -> Result<InvoiceNumber, SequencerError> {
        let current = self.counters.get(&date).copied().unwrap_or(0);
        let next = current.checked_add(1).ok_or_else(|| {
            SequencerError::Unavailable(format!("sequence exhausted for {date}"))
        })?;

        self.store
            .put(vec![(date, next)])
            .await
            .map_err(|e| SequencerError::Unavailable(e.to_string()))?;
        self.counters.insert(date, next);

        Ok(InvoiceNumber::new(date, next))
    }
}

/// Sending half of the [`SequencerActor`].
#[derive(Clone)]
pub struct SequencerClient {
    sender: mpsc::Sender<NextNumber>,
}

impl SequencerClient {
    /// The next invoice number for `date`.
    #[instrument(skip(self))]
    pub async fn next_invoice_number(
        &self,
        date: NaiveDate,
    ) -> Result<InvoiceNumber, SequencerError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(NextNumber { date, respond_to })
            .await
            .map_err(|_| SequencerError::Unavailable("sequencer stopped".into()))?;
        response
            .await
            .map_err(|_| SequencerError::Unavailable("sequencer dropped the request".into()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actor_framework::mock::FlakyStore;
    use actor_framework::Store;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[tokio::test]
    async fn test_each_date_starts_at_one() {
        let (actor, client) = SequencerActor::new(8);
        tokio::spawn(actor.run());

        let a = client.next_invoice_number(day(19)).await.unwrap();
        let b = client.next_invoice_number(day(19)).await.unwrap();
        let c = client.next_invoice_number(day(20)).await.unwrap();

        assert_eq!(a.to_string(), "INV-20261019-001");
        assert_eq!(b.to_string(), "INV-20261019-002");
        assert_eq!(c.to_string(), "INV-20261020-001");
    }

    #[tokio::test]
    async fn test_failed_write_does_not_advance_counter() {
        let store = FlakyStore::<NaiveDate, u32>::new();
        let (actor, client) = SequencerActor::with_store(8, Arc::new(store.clone()))
            .await
            .unwrap();
        tokio::spawn(actor.run());

        client.next_invoice_number(day(19)).await.unwrap();

        store.fail_writes(true);
        assert!(matches!(
            client.next_invoice_number(day(19)).await,
            Err(SequencerError::Unavailable(_))
        ));

        store.fail_writes(false);
        let next = client.next_invoice_number(day(19)).await.unwrap();
        assert_eq!(next.sequence(), 2);
    }

    #[tokio::test]
    async fn test_counters_survive_restart() {
        let store = MemoryStore::<NaiveDate, u32>::new();
        store.put(vec![(day(19), 41)]).await.unwrap();

        let (actor, client) = SequencerActor::with_store(8, Arc::new(store.clone()))
            .await
            .unwrap();
        tokio::spawn(actor.run());

        let next = client.next_invoice_number(day(19)).await.unwrap();
        assert_eq!(next.sequence(), 42);
        assert_eq!(store.records()[&day(19)], 42);
    }

    #[tokio::test]
    async fn test_reconcile_only_moves_counters_forward() {
        let store = MemoryStore::<NaiveDate, u32>::new();
        store.put(vec![(day(19), 10)]).await.unwrap();

        let (mut actor, client) = SequencerActor::with_store(8, Arc::new(store.clone()))
            .await
            .unwrap();
        actor
            .reconcile(vec![
                InvoiceNumber::new(day(19), 4),
                InvoiceNumber::new(day(20), 7),
                InvoiceNumber::new(day(20), 3),
            ])
            .await
            .unwrap();
        tokio::spawn(actor.run());

        assert_eq!(client.next_invoice_number(day(19)).await.unwrap().sequence(), 11);
        assert_eq!(client.next_invoice_number(day(20)).await.unwrap().sequence(), 8);
        assert_eq!(store.records()[&day(20)], 8);
    }

    #[tokio::test]
    async fn test_stopped_sequencer_is_unavailable() {
        let (actor, client) = SequencerActor::new(8);
        drop(actor);

        assert!(matches!(
            client.next_invoice_number(day(19)).await,
            Err(SequencerError::Unavailable(_))
        ));
    }
}
