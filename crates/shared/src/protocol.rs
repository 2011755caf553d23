use serde::{Deserialize, Serialize};

use crate::{
    domain::{ItemId, SpeakerId, TagId, UserId},
    tree::TreeNode,
};

/// Payload for creating an agenda item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags_id: Vec<TagId>,
}

impl ItemDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeUpdateRequest {
    pub tree: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSpeakerRequest {
    pub user: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveSpeakerRequest {
    pub speaker: SpeakerId,
}

/// Body of `PUT .../speak/`. Without a speaker the server picks the next one
/// in the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginSpeechRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<SpeakerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTypeChoice {
    pub value: i64,
    pub display_name: String,
}

/// The subset of an `OPTIONS /rest/agenda/item/` response that carries the
/// item type choices (`actions.POST.type.choices`).
#[derive(Debug, Clone, Deserialize)]
pub struct ItemOptionsResponse {
    pub actions: ItemOptionsActions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemOptionsActions {
    #[serde(rename = "POST")]
    pub post: ItemOptionsFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemOptionsFields {
    #[serde(rename = "type")]
    pub item_type: ChoiceField,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceField {
    #[serde(default)]
    pub choices: Vec<ItemTypeChoice>,
}

impl ItemOptionsResponse {
    pub fn into_type_choices(self) -> Vec<ItemTypeChoice> {
        self.actions.post.item_type.choices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_type_choices_are_read_from_post_action_metadata() {
        let raw = json!({
            "name": "Item List",
            "actions": {
                "POST": {
                    "title": {"type": "string", "required": true},
                    "type": {
                        "type": "choice",
                        "choices": [
                            {"value": 1, "display_name": "Agenda item"},
                            {"value": 2, "display_name": "Hidden item"}
                        ]
                    }
                }
            }
        });
        let parsed: ItemOptionsResponse = serde_json::from_value(raw).expect("options");
        let choices = parsed.into_type_choices();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[1].value, 2);
        assert_eq!(choices[1].display_name, "Hidden item");
    }

    #[test]
    fn draft_omits_unset_optional_fields() {
        let value = serde_json::to_value(ItemDraft::titled("Welcome")).expect("json");
        assert_eq!(value, json!({"title": "Welcome"}));
    }

    #[test]
    fn begin_speech_without_speaker_is_empty_object() {
        let value = serde_json::to_value(BeginSpeechRequest::default()).expect("json");
        assert_eq!(value, json!({}));
    }
}
