use shared::{
    domain::{AgendaItem, ItemId, ProjectorElement, SpeakerId, UserId, SLIDE_ITEM_LIST},
    protocol::ItemDraft,
    tree::TreeNode,
};

use crate::{
    agenda::AgendaClient,
    error::{ClientError, Result},
    import::BulkImporter,
    views::Route,
};

/// Transient message shown above a view after an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Alert {
    #[default]
    Hidden,
    Danger(String),
}

impl Alert {
    pub fn from_result<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Hidden,
            Err(err) => Self::from_error(err),
        }
    }

    pub fn from_error(err: &ClientError) -> Self {
        Self::Danger(err.detail())
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Danger(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Hidden => None,
            Self::Danger(message) => Some(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Saved {
    pub item: AgendaItem,
    pub next: Route,
}

/// User actions of the agenda screens.
pub struct AgendaController {
    client: AgendaClient,
}

impl AgendaController {
    pub fn new(client: AgendaClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AgendaClient {
        &self.client
    }

    pub async fn save(&self, item: &AgendaItem) -> Result<AgendaItem> {
        self.client.items.save(item).await
    }

    pub async fn delete(&self, item_id: ItemId) -> Result<()> {
        self.client.items.destroy(item_id).await
    }

    pub async fn project_agenda(&self) -> Result<()> {
        self.client
            .project(&[ProjectorElement::agenda_list()])
            .await
    }

    /// Whether the cached projector currently shows the agenda list. An
    /// unknown projector counts as not projected.
    pub async fn is_agenda_projected(&self) -> bool {
        self.client
            .projectors
            .get(self.client.projector_id())
            .await
            .is_some_and(|projector| projector.shows(SLIDE_ITEM_LIST))
    }

    pub async fn close_list(&self, item: &AgendaItem, closed: bool) -> Result<AgendaItem> {
        self.client.set_speaker_list_closed(item, closed).await
    }

    pub async fn add_speaker(&self, item_id: ItemId, user_id: UserId) -> Alert {
        Alert::from_result(&self.client.add_speaker(item_id, user_id).await)
    }

    pub async fn remove_speaker(&self, item_id: ItemId, speaker_id: SpeakerId) -> Alert {
        Alert::from_result(&self.client.remove_speaker(item_id, speaker_id).await)
    }

    pub async fn begin_speech(&self, item_id: ItemId, speaker_id: Option<SpeakerId>) -> Alert {
        Alert::from_result(&self.client.begin_speech(item_id, speaker_id).await)
    }

    pub async fn end_speech(&self, item_id: ItemId) -> Alert {
        Alert::from_result(&self.client.end_speech(item_id).await)
    }

    pub async fn project_list_of_speakers(&self, item_id: ItemId) -> Result<()> {
        self.client
            .project(&[ProjectorElement::list_of_speakers(item_id)])
            .await
    }

    pub async fn create(&self, draft: &ItemDraft) -> Result<Saved> {
        let item = self.client.items.create(draft).await?;
        Ok(Saved {
            item,
            next: Route::ItemList,
        })
    }

    pub async fn update(&self, item: &AgendaItem) -> Result<Saved> {
        let item = self.client.items.save(item).await?;
        Ok(Saved {
            item,
            next: Route::ItemList,
        })
    }

    /// Persists the tree after a drag-and-drop reorder.
    pub async fn sort_dropped(&self, tree: &[TreeNode]) -> Result<()> {
        self.client.save_tree(tree).await
    }

    pub fn importer(&self) -> BulkImporter<'_> {
        BulkImporter::new(&self.client.items)
    }
}
