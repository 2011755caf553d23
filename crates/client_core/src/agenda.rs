use std::sync::Arc;

use reqwest::Method;
use shared::{
    domain::{AgendaItem, ItemId, Projector, ProjectorElement, ProjectorId, SpeakerId, Tag, User, UserId},
    protocol::{
        AddSpeakerRequest, BeginSpeechRequest, ItemOptionsResponse, ItemTypeChoice,
        RemoveSpeakerRequest, TreeUpdateRequest,
    },
    tree::TreeNode,
};
use tracing::{info, warn};

use crate::{
    error::Result,
    repository::{Resource, RestRepository},
    store::ResourceStore,
    transport::RestTransport,
};

pub const DEFAULT_PROJECTOR_ID: ProjectorId = ProjectorId(1);

const TREE_PATH: &str = "rest/agenda/item/tree/";

/// Entry point to the agenda REST API. Record CRUD goes through the stores;
/// tree, speaker and projector actions are methods here.
pub struct AgendaClient {
    transport: RestTransport,
    projector_id: ProjectorId,
    pub items: ResourceStore<AgendaItem>,
    pub tags: ResourceStore<Tag>,
    pub users: ResourceStore<User>,
    pub projectors: ResourceStore<Projector>,
}

impl AgendaClient {
    pub fn new(server_url: &str) -> Result<Self> {
        Ok(Self::from_transport(RestTransport::new(server_url)?))
    }

    pub fn from_transport(transport: RestTransport) -> Self {
        Self {
            items: ResourceStore::new(Arc::new(RestRepository::new(transport.clone()))),
            tags: ResourceStore::new(Arc::new(RestRepository::new(transport.clone()))),
            users: ResourceStore::new(Arc::new(RestRepository::new(transport.clone()))),
            projectors: ResourceStore::new(Arc::new(RestRepository::new(transport.clone()))),
            transport,
            projector_id: DEFAULT_PROJECTOR_ID,
        }
    }

    pub fn with_projector(mut self, projector_id: ProjectorId) -> Self {
        self.projector_id = projector_id;
        self
    }

    pub fn projector_id(&self) -> ProjectorId {
        self.projector_id
    }

    pub fn transport(&self) -> &RestTransport {
        &self.transport
    }

    pub async fn tree(&self) -> Result<Vec<TreeNode>> {
        self.transport.get(TREE_PATH).await
    }

    pub async fn save_tree(&self, tree: &[TreeNode]) -> Result<()> {
        let body = TreeUpdateRequest {
            tree: tree.to_vec(),
        };
        self.transport.call(Method::PUT, TREE_PATH, Some(&body)).await
    }

    pub async fn item_types(&self) -> Result<Vec<ItemTypeChoice>> {
        let options: ItemOptionsResponse = self
            .transport
            .options(&AgendaItem::collection_path())
            .await?;
        Ok(options.into_type_choices())
    }

    /// Opens or closes the list of speakers by saving the full item.
    pub async fn set_speaker_list_closed(
        &self,
        item: &AgendaItem,
        closed: bool,
    ) -> Result<AgendaItem> {
        let mut item = item.clone();
        item.speaker_list_closed = closed;
        self.items.save(&item).await
    }

    pub async fn add_speaker(&self, item_id: ItemId, user_id: UserId) -> Result<()> {
        self.transport
            .call(
                Method::POST,
                &manage_speaker_path(item_id),
                Some(&AddSpeakerRequest { user: user_id }),
            )
            .await?;
        self.refresh_item(item_id).await;
        Ok(())
    }

    pub async fn remove_speaker(&self, item_id: ItemId, speaker_id: SpeakerId) -> Result<()> {
        self.transport
            .call(
                Method::DELETE,
                &manage_speaker_path(item_id),
                Some(&RemoveSpeakerRequest {
                    speaker: speaker_id,
                }),
            )
            .await?;
        self.refresh_item(item_id).await;
        Ok(())
    }

    /// Starts the speech of `speaker_id`, or of the next waiting speaker.
    pub async fn begin_speech(&self, item_id: ItemId, speaker_id: Option<SpeakerId>) -> Result<()> {
        self.transport
            .call(
                Method::PUT,
                &speak_path(item_id),
                Some(&BeginSpeechRequest {
                    speaker: speaker_id,
                }),
            )
            .await?;
        self.refresh_item(item_id).await;
        Ok(())
    }

    pub async fn end_speech(&self, item_id: ItemId) -> Result<()> {
        self.transport
            .call(Method::DELETE, &speak_path(item_id), None::<&()>)
            .await?;
        self.refresh_item(item_id).await;
        Ok(())
    }

    /// Replaces the projector's content with `elements`.
    pub async fn project(&self, elements: &[ProjectorElement]) -> Result<()> {
        let path = format!("rest/core/projector/{}/prune_elements/", self.projector_id.0);
        self.transport
            .call(Method::POST, &path, Some(elements))
            .await?;
        info!(
            projector_id = self.projector_id.0,
            elements = elements.len(),
            "projector content replaced"
        );
        Ok(())
    }

    pub async fn projector(&self) -> Result<Projector> {
        self.projectors.find(self.projector_id).await
    }

    async fn refresh_item(&self, item_id: ItemId) {
        if let Err(err) = self.items.find(item_id).await {
            warn!(item_id = item_id.0, %err, "failed to refresh agenda item");
        }
    }
}

fn manage_speaker_path(item_id: ItemId) -> String {
    format!("rest/agenda/item/{}/manage_speaker/", item_id.0)
}

fn speak_path(item_id: ItemId) -> String {
    format!("rest/agenda/item/{}/speak/", item_id.0)
}
