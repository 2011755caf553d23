use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ItemId);
id_newtype!(SpeakerId);
id_newtype!(UserId);
id_newtype!(TagId);
id_newtype!(ProjectorId);

/// Slide name for a single agenda item (optionally its list of speakers).
pub const SLIDE_ITEM: &str = "agenda/item";
/// Slide name for the whole agenda.
pub const SLIDE_ITEM_LIST: &str = "agenda/item-list";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<i64>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ItemId>,
    #[serde(default)]
    pub speaker_list_closed: bool,
    #[serde(default)]
    pub tags_id: Vec<TagId>,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
}

impl AgendaItem {
    /// The speaker currently holding the floor, if any.
    pub fn current_speaker(&self) -> Option<&Speaker> {
        self.speakers
            .iter()
            .find(|speaker| speaker.status() == SpeakerStatus::Speaking)
    }

    /// Speakers still waiting, in queue order.
    pub fn waiting_speakers(&self) -> impl Iterator<Item = &Speaker> {
        self.speakers
            .iter()
            .filter(|speaker| speaker.status() == SpeakerStatus::Waiting)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerStatus {
    Waiting,
    Speaking,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    pub id: SpeakerId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl Speaker {
    pub fn status(&self) -> SpeakerStatus {
        match (self.begin_time, self.end_time) {
            (None, _) => SpeakerStatus::Waiting,
            (Some(_), None) => SpeakerStatus::Speaking,
            (Some(_), Some(_)) => SpeakerStatus::Finished,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            self.username.clone()
        } else {
            parts.join(" ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectorElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_of_speakers: Option<bool>,
}

impl ProjectorElement {
    pub fn agenda_list() -> Self {
        Self {
            name: SLIDE_ITEM_LIST.to_string(),
            id: None,
            list_of_speakers: None,
        }
    }

    pub fn list_of_speakers(item_id: ItemId) -> Self {
        Self {
            name: SLIDE_ITEM.to_string(),
            id: Some(item_id),
            list_of_speakers: Some(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projector {
    pub id: ProjectorId,
    #[serde(default)]
    pub elements: Vec<ProjectorElement>,
}

impl Projector {
    pub fn shows(&self, slide_name: &str) -> bool {
        self.elements.iter().any(|element| element.name == slide_name)
    }
}
