//! Immutable view models for the agenda screens and the resolvers that fetch
//! their data.

use std::collections::HashMap;

use shared::{
    domain::{
        AgendaItem, ItemId, Projector, ProjectorElement, SpeakerId, SpeakerStatus, Tag, User,
        UserId, SLIDE_ITEM, SLIDE_ITEM_LIST,
    },
    protocol::ItemTypeChoice,
    tree::{flatten, top_level_ids, TreeNode},
};
use tracing::warn;

use crate::{
    agenda::AgendaClient,
    error::{ClientError, Result},
    import::{ImportProgress, ImportReport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub target: &'static str,
    pub icon: &'static str,
    pub title: &'static str,
    pub weight: u32,
    pub permission: &'static str,
}

pub const AGENDA_MENU_ENTRY: MenuEntry = MenuEntry {
    target: "agenda.item.list",
    icon: "calendar-o",
    title: "Agenda",
    weight: 200,
    permission: "agenda.can_see",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ItemList,
    ItemCreate,
    ItemDetail(ItemId),
    ItemUpdate(ItemId),
    ItemSort,
    ItemImport,
}

impl Route {
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::ItemList => "agenda.item.list",
            Self::ItemCreate => "agenda.item.create",
            Self::ItemDetail(_) => "agenda.item.detail",
            Self::ItemUpdate(_) => "agenda.item.detail.update",
            Self::ItemSort => "agenda.item.sort",
            Self::ItemImport => "agenda.item.import",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaRow {
    pub id: ItemId,
    pub depth: usize,
    /// `None` when the tree references an item that was not loaded.
    pub title: Option<String>,
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemListView {
    pub items: Vec<AgendaItem>,
    pub rows: Vec<AgendaRow>,
    pub agenda_projected: bool,
}

impl ItemListView {
    pub fn build(items: Vec<AgendaItem>, tree: &[TreeNode], projector: Option<&Projector>) -> Self {
        let by_id: HashMap<ItemId, &AgendaItem> = items.iter().map(|i| (i.id, i)).collect();
        let rows = flatten(tree)
            .into_iter()
            .map(|node| {
                let item = by_id.get(&node.id);
                AgendaRow {
                    id: node.id,
                    depth: node.depth,
                    title: item.map(|i| i.title.clone()),
                    closed: item.is_some_and(|i| i.closed),
                }
            })
            .collect();
        Self {
            rows,
            agenda_projected: projector.is_some_and(|p| p.shows(SLIDE_ITEM_LIST)),
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerRow {
    pub speaker_id: SpeakerId,
    pub user_id: UserId,
    pub name: String,
    pub status: SpeakerStatus,
}

pub fn speaker_rows(item: &AgendaItem, users: &[User]) -> Vec<SpeakerRow> {
    let names: HashMap<UserId, String> = users.iter().map(|u| (u.id, u.display_name())).collect();
    item.speakers
        .iter()
        .map(|speaker| SpeakerRow {
            speaker_id: speaker.id,
            user_id: speaker.user_id,
            name: names
                .get(&speaker.user_id)
                .cloned()
                .unwrap_or_else(|| format!("#{}", speaker.user_id.0)),
            status: speaker.status(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemDetailView {
    pub item: AgendaItem,
    pub speakers: Vec<SpeakerRow>,
    pub users: Vec<User>,
    pub tags: Vec<Tag>,
}

impl ItemDetailView {
    pub fn build(item: AgendaItem, users: Vec<User>, tags: Vec<Tag>) -> Self {
        Self {
            speakers: speaker_rows(&item, &users),
            item,
            users,
            tags,
        }
    }

    pub fn item_tags(&self) -> Vec<&Tag> {
        self.tags
            .iter()
            .filter(|tag| self.item.tags_id.contains(&tag.id))
            .collect()
    }
}

/// Data for the create and update forms.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFormView {
    pub types: Vec<ItemTypeChoice>,
    pub tags: Vec<Tag>,
    pub item: Option<AgendaItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortView {
    pub items: Vec<AgendaItem>,
    pub tree: Vec<TreeNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportView {
    pub progress: ImportProgress,
    pub report: Option<ImportReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    ItemList(ItemListView),
    ItemCreate(ItemFormView),
    ItemDetail(ItemDetailView),
    ItemUpdate(ItemFormView),
    ItemSort(SortView),
    ItemImport(ImportView),
}

/// Fetches everything the screen for `route` needs.
pub async fn resolve(client: &AgendaClient, route: Route) -> Result<View> {
    match route {
        Route::ItemList => {
            let (items, tree) = futures::try_join!(client.items.find_all(), client.tree())?;
            let projector = match client.projector().await {
                Ok(projector) => Some(projector),
                Err(err) => {
                    warn!(%err, "projector unavailable; agenda shown as not projected");
                    None
                }
            };
            Ok(View::ItemList(ItemListView::build(
                items,
                &tree,
                projector.as_ref(),
            )))
        }
        Route::ItemCreate => {
            let (types, tags) = futures::try_join!(client.item_types(), client.tags.find_all())?;
            Ok(View::ItemCreate(ItemFormView {
                types,
                tags,
                item: None,
            }))
        }
        Route::ItemDetail(id) => {
            let (item, users, tags) = futures::try_join!(
                client.items.find(id),
                client.users.find_all(),
                client.tags.find_all()
            )?;
            Ok(View::ItemDetail(ItemDetailView::build(item, users, tags)))
        }
        Route::ItemUpdate(id) => {
            let (item, types, tags) = futures::try_join!(
                client.items.find(id),
                client.item_types(),
                client.tags.find_all()
            )?;
            Ok(View::ItemUpdate(ItemFormView {
                types,
                tags,
                item: Some(item),
            }))
        }
        Route::ItemSort => {
            let (items, tree) = futures::try_join!(client.items.find_all(), client.tree())?;
            Ok(View::ItemSort(SortView { items, tree }))
        }
        Route::ItemImport => Ok(View::ItemImport(ImportView::default())),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideItemDetail {
    pub item: AgendaItem,
    pub is_list_of_speakers: bool,
    pub speakers: Vec<SpeakerRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideItemList {
    pub items: Vec<AgendaItem>,
    /// Root-level items, in agenda order.
    pub ids: Vec<ItemId>,
}

impl SlideItemList {
    pub fn titles(&self) -> Vec<&str> {
        self.ids
            .iter()
            .filter_map(|id| self.items.iter().find(|item| item.id == *id))
            .map(|item| item.title.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Slide {
    Item(SlideItemDetail),
    ItemList(SlideItemList),
}

/// Fetches the data for a projector element's slide.
pub async fn resolve_slide(client: &AgendaClient, element: &ProjectorElement) -> Result<Slide> {
    match element.name.as_str() {
        SLIDE_ITEM => {
            let id = element.id.ok_or_else(|| {
                ClientError::Validation(format!("slide '{SLIDE_ITEM}' requires an item id"))
            })?;
            let (item, users) =
                futures::try_join!(client.items.find(id), client.users.find_all())?;
            Ok(Slide::Item(SlideItemDetail {
                speakers: speaker_rows(&item, &users),
                item,
                is_list_of_speakers: element.list_of_speakers.unwrap_or(false),
            }))
        }
        SLIDE_ITEM_LIST => {
            let (items, tree) = futures::try_join!(client.items.find_all(), client.tree())?;
            Ok(Slide::ItemList(SlideItemList {
                items,
                ids: top_level_ids(&tree),
            }))
        }
        other => Err(ClientError::Validation(format!("unknown agenda slide '{other}'"))),
    }
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
