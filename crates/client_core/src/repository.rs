use std::{fmt::Debug, hash::Hash, marker::PhantomData};

use async_trait::async_trait;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{AgendaItem, ItemId, Projector, ProjectorId, Tag, TagId, User, UserId},
    protocol::ItemDraft,
};

use crate::{error::Result, transport::RestTransport};

/// A server-side collection reachable at `/rest/{NAME}/`.
pub trait Resource: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const NAME: &'static str;
    type Id: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static;
    type Draft: Serialize + Send + Sync;

    fn id(&self) -> Self::Id;
    fn raw_id(id: Self::Id) -> i64;

    fn collection_path() -> String {
        format!("rest/{}/", Self::NAME)
    }

    fn member_path(id: Self::Id) -> String {
        format!("rest/{}/{}/", Self::NAME, Self::raw_id(id))
    }
}

impl Resource for AgendaItem {
    const NAME: &'static str = "agenda/item";
    type Id = ItemId;
    type Draft = ItemDraft;

    fn id(&self) -> ItemId {
        self.id
    }

    fn raw_id(id: ItemId) -> i64 {
        id.0
    }
}

impl Resource for Tag {
    const NAME: &'static str = "core/tag";
    type Id = TagId;
    type Draft = Tag;

    fn id(&self) -> TagId {
        self.id
    }

    fn raw_id(id: TagId) -> i64 {
        id.0
    }
}

impl Resource for User {
    const NAME: &'static str = "users/user";
    type Id = UserId;
    type Draft = User;

    fn id(&self) -> UserId {
        self.id
    }

    fn raw_id(id: UserId) -> i64 {
        id.0
    }
}

impl Resource for Projector {
    const NAME: &'static str = "core/projector";
    type Id = ProjectorId;
    type Draft = Projector;

    fn id(&self) -> ProjectorId {
        self.id
    }

    fn raw_id(id: ProjectorId) -> i64 {
        id.0
    }
}

#[async_trait]
pub trait Repository<T: Resource>: Send + Sync {
    async fn find_all(&self) -> Result<Vec<T>>;
    async fn find(&self, id: T::Id) -> Result<T>;
    async fn create(&self, draft: &T::Draft) -> Result<T>;
    /// Replaces the full record on the server.
    async fn save(&self, record: &T) -> Result<T>;
    async fn destroy(&self, id: T::Id) -> Result<()>;
}

pub struct RestRepository<T> {
    transport: RestTransport,
    _resource: PhantomData<fn() -> T>,
}

impl<T> Clone for RestRepository<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            _resource: PhantomData,
        }
    }
}

impl<T: Resource> RestRepository<T> {
    pub fn new(transport: RestTransport) -> Self {
        Self {
            transport,
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Resource> Repository<T> for RestRepository<T> {
    async fn find_all(&self) -> Result<Vec<T>> {
        self.transport.get(&T::collection_path()).await
    }

    async fn find(&self, id: T::Id) -> Result<T> {
        self.transport.get(&T::member_path(id)).await
    }

    async fn create(&self, draft: &T::Draft) -> Result<T> {
        self.transport
            .send(Method::POST, &T::collection_path(), draft)
            .await
    }

    async fn save(&self, record: &T) -> Result<T> {
        self.transport
            .send(Method::PUT, &T::member_path(record.id()), record)
            .await
    }

    async fn destroy(&self, id: T::Id) -> Result<()> {
        self.transport
            .call(Method::DELETE, &T::member_path(id), None::<&()>)
            .await
    }
}
