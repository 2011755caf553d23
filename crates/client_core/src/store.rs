//! Local cache of one resource collection with change subscriptions.
//!
//! Every successful fetch or mutation updates the cache and publishes a
//! [`StoreEvent`]. Views hold a [`Subscription`] for the records they show and
//! drop it on teardown.

use std::{collections::BTreeMap, sync::Arc};

use tokio::sync::{
    broadcast::{self, error::RecvError, error::TryRecvError},
    RwLock,
};
use tracing::warn;

use crate::{
    error::Result,
    repository::{Repository, Resource},
};

const STORE_EVENT_CAPACITY: usize = 256;

#[derive(Debug)]
pub enum StoreEvent<T: Resource> {
    Changed(T),
    Removed(T::Id),
}

impl<T: Resource> Clone for StoreEvent<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Changed(record) => Self::Changed(record.clone()),
            Self::Removed(id) => Self::Removed(*id),
        }
    }
}

impl<T: Resource> StoreEvent<T> {
    pub fn id(&self) -> T::Id {
        match self {
            Self::Changed(record) => record.id(),
            Self::Removed(id) => *id,
        }
    }
}

pub struct Subscription<T: Resource> {
    rx: broadcast::Receiver<StoreEvent<T>>,
    only: Option<T::Id>,
}

impl<T: Resource> Subscription<T> {
    /// Waits for the next matching event. Returns `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<StoreEvent<T>> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(resource = T::NAME, skipped, "store subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next matching event if one is already queued.
    pub fn try_recv(&mut self) -> Option<StoreEvent<T>> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if self.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(resource = T::NAME, skipped, "store subscriber lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}

    fn matches(&self, event: &StoreEvent<T>) -> bool {
        self.only.map_or(true, |id| event.id() == id)
    }
}

pub struct ResourceStore<T: Resource> {
    repo: Arc<dyn Repository<T>>,
    cache: RwLock<BTreeMap<T::Id, T>>,
    events: broadcast::Sender<StoreEvent<T>>,
}

impl<T: Resource> ResourceStore<T> {
    pub fn new(repo: Arc<dyn Repository<T>>) -> Self {
        let (events, _) = broadcast::channel(STORE_EVENT_CAPACITY);
        Self {
            repo,
            cache: RwLock::new(BTreeMap::new()),
            events,
        }
    }

    pub fn repository(&self) -> &Arc<dyn Repository<T>> {
        &self.repo
    }

    pub fn subscribe(&self, id: T::Id) -> Subscription<T> {
        Subscription {
            rx: self.events.subscribe(),
            only: Some(id),
        }
    }

    pub fn subscribe_all(&self) -> Subscription<T> {
        Subscription {
            rx: self.events.subscribe(),
            only: None,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub async fn get(&self, id: T::Id) -> Option<T> {
        self.cache.read().await.get(&id).cloned()
    }

    /// Cached records ordered by id.
    pub async fn all(&self) -> Vec<T> {
        self.cache.read().await.values().cloned().collect()
    }

    /// Fetches the whole collection and replaces the cache with it.
    pub async fn find_all(&self) -> Result<Vec<T>> {
        let records = self.repo.find_all().await?;
        let removed: Vec<T::Id> = {
            let mut cache = self.cache.write().await;
            let fresh: BTreeMap<T::Id, T> = records
                .iter()
                .map(|record| (record.id(), record.clone()))
                .collect();
            let removed = cache
                .keys()
                .filter(|id| !fresh.contains_key(id))
                .copied()
                .collect();
            *cache = fresh;
            removed
        };

        for id in removed {
            self.publish(StoreEvent::Removed(id));
        }
        for record in &records {
            self.publish(StoreEvent::Changed(record.clone()));
        }
        Ok(records)
    }

    pub async fn find(&self, id: T::Id) -> Result<T> {
        let record = self.repo.find(id).await?;
        self.inject(record.clone()).await;
        Ok(record)
    }

    pub async fn create(&self, draft: &T::Draft) -> Result<T> {
        let record = self.repo.create(draft).await?;
        self.inject(record.clone()).await;
        Ok(record)
    }

    pub async fn save(&self, record: &T) -> Result<T> {
        let saved = self.repo.save(record).await?;
        self.inject(saved.clone()).await;
        Ok(saved)
    }

    pub async fn destroy(&self, id: T::Id) -> Result<()> {
        self.repo.destroy(id).await?;
        self.eject(id).await;
        Ok(())
    }

    /// Stores a record received outside of a request (e.g. a pushed update).
    pub async fn inject(&self, record: T) {
        self.cache.write().await.insert(record.id(), record.clone());
        self.publish(StoreEvent::Changed(record));
    }

    pub async fn eject(&self, id: T::Id) {
        if self.cache.write().await.remove(&id).is_some() {
            self.publish(StoreEvent::Removed(id));
        }
    }

    fn publish(&self, event: StoreEvent<T>) {
        // Fails only when nobody is subscribed.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
