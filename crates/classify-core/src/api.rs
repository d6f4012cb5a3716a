//! Backend API
//!
//! Form-encoded POST with an `action` field, answered by a JSON envelope
//! `{ success, data, error }`. The HTTP client itself sits behind
//! [`Transport`] so the front-end can plug reqwest in and tests can script
//! replies.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::classification::ClassificationResult;
use crate::error::{ClassifyError, ClassifyResult};
use crate::groups::GroupLookup;
use crate::model::{Group, GroupId, ItemId, TagId, Template, TemplateId};
use crate::tags::TagOption;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("HTTP {status}")]
    Http { status: u16, body: String },

    #[error("{0}")]
    Rejected(String),

    #[error("Could not reach the server")]
    Transport(String),

    #[error("Invalid server response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TagList,
    TagAdd,
    TagUpdate,
    TagDelete,
    TagGetItemTags,
    ListGroups,
    GetGroupItems,
    SaveGroup,
    DeleteGroup,
    SavePlantilla,
    ListPlantillas,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::TagList => "tagList",
            Action::TagAdd => "tagAdd",
            Action::TagUpdate => "tagUpdate",
            Action::TagDelete => "tagDelete",
            Action::TagGetItemTags => "tagGetItemTags",
            Action::ListGroups => "listGroups",
            Action::GetGroupItems => "getGroupItems",
            Action::SaveGroup => "saveGroup",
            Action::DeleteGroup => "deleteGroup",
            Action::SavePlantilla => "savePlantilla",
            Action::ListPlantillas => "listPlantillas",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        const ALL: [Action; 11] = [
            Action::TagList,
            Action::TagAdd,
            Action::TagUpdate,
            Action::TagDelete,
            Action::TagGetItemTags,
            Action::ListGroups,
            Action::GetGroupItems,
            Action::SaveGroup,
            Action::DeleteGroup,
            Action::SavePlantilla,
            Action::ListPlantillas,
        ];
        ALL.into_iter().find(|a| a.as_str() == name)
    }
}

/// `success` is a boolean on most backends and the string "ok" on some
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Success {
    Bool(bool),
    Text(String),
}

impl Default for Success {
    fn default() -> Self {
        Success::Bool(false)
    }
}

impl Success {
    pub fn is_ok(&self) -> bool {
        match self {
            Success::Bool(b) => *b,
            Success::Text(s) => s == "ok",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T = Value> {
    #[serde(default)]
    pub success: Success,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: Success::Bool(true),
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: Success::Bool(false),
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    /// Error text to show: `error`, then `message`, then a generic one
    pub fn error_message(&self) -> String {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
            .unwrap_or("Unknown error")
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

#[async_trait(?Send)]
pub trait Transport {
    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<RawReply, ApiError>;
}

/// A tag as the catalog endpoint lists it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: TagId,
    pub text: String,
}

#[derive(Deserialize)]
struct Created<I> {
    id: Option<I>,
}

#[derive(Deserialize)]
struct Member {
    id: ItemId,
}

#[derive(Deserialize)]
struct ItemTags {
    #[serde(default)]
    tags: Vec<TagOption>,
}

/// Some backends echo the classification back as the JSON string they received
#[derive(Deserialize)]
struct WireTemplate {
    id: TemplateId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    classification: Value,
}

impl TryFrom<WireTemplate> for Template {
    type Error = ApiError;

    fn try_from(wire: WireTemplate) -> Result<Self, ApiError> {
        let classification = match wire.classification {
            Value::String(text) => serde_json::from_str(&text),
            Value::Null => Ok(ClassificationResult::default()),
            other => serde_json::from_value(other),
        }
        .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(Template {
            id: wire.id,
            name: wire.name,
            description: wire.description,
            classification,
        })
    }
}

fn field(name: &str, value: impl Into<String>) -> (String, String) {
    (name.to_string(), value.into())
}

#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    transport: T,
    url: String,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Post an action and return the `data` of a successful envelope
    pub async fn call(&self, action: Action, params: Vec<(String, String)>) -> Result<Value, ApiError> {
        let mut fields = Vec::with_capacity(params.len() + 1);
        fields.push(field("action", action.as_str()));
        fields.extend(params);

        let reply = self.transport.post_form(&self.url, &fields).await?;
        if reply.status != 200 {
            return Err(ApiError::Http {
                status: reply.status,
                body: reply.body,
            });
        }
        let envelope: ApiEnvelope = serde_json::from_str(&reply.body).map_err(|e| ApiError::Decode(e.to_string()))?;
        if !envelope.success.is_ok() {
            let message = envelope.error_message();
            log::debug!("{} rejected: {}", action.as_str(), message);
            return Err(ApiError::Rejected(message));
        }
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    async fn call_as<R: DeserializeOwned>(&self, action: Action, params: Vec<(String, String)>) -> Result<R, ApiError> {
        let data = self.call(action, params).await?;
        serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))
    }

    // ========================
    // Tags
    // ========================

    pub async fn list_tags(&self, catalog: &str) -> Result<Vec<TagRecord>, ApiError> {
        self.call_as(Action::TagList, vec![field("catalog_id", catalog)]).await
    }

    /// Returns the id the backend assigned, or a time-based one if it sent none
    pub async fn add_tag(&self, catalog: &str, text: &str) -> Result<TagId, ApiError> {
        let data = self
            .call(Action::TagAdd, vec![field("catalog_id", catalog), field("text", text)])
            .await?;
        let created: Option<Created<TagId>> = serde_json::from_value(data).ok();
        Ok(created
            .and_then(|c| c.id)
            .unwrap_or_else(|| TagId::new(chrono::Utc::now().timestamp_millis().to_string())))
    }

    pub async fn update_tag(&self, catalog: &str, id: &TagId, text: &str) -> Result<(), ApiError> {
        self.call(
            Action::TagUpdate,
            vec![field("catalog_id", catalog), field("id", id.as_str()), field("text", text)],
        )
        .await
        .map(drop)
    }

    pub async fn delete_tag(&self, catalog: &str, id: &TagId) -> Result<(), ApiError> {
        self.call(Action::TagDelete, vec![field("catalog_id", catalog), field("id", id.as_str())])
            .await
            .map(drop)
    }

    pub async fn item_tags(&self, catalog: &str, item_id: &str, item_table: &str) -> Result<Vec<TagOption>, ApiError> {
        let params = vec![
            field("catalog_id", catalog),
            field("item_id", item_id),
            field("item_table", item_table),
        ];
        let tags: ItemTags = self.call_as(Action::TagGetItemTags, params).await?;
        Ok(tags.tags)
    }

    // ========================
    // Groups
    // ========================

    pub async fn list_groups(&self) -> Result<Vec<Group>, ApiError> {
        self.call_as(Action::ListGroups, Vec::new()).await
    }

    pub async fn group_items(&self, group: &GroupId) -> Result<Vec<ItemId>, ApiError> {
        let members: Vec<Member> = self
            .call_as(Action::GetGroupItems, vec![field("groupId", group.as_str())])
            .await?;
        Ok(members.into_iter().map(|m| m.id).collect())
    }

    /// Create or update a group with its member items
    pub async fn save_group(&self, group: &Group, items: &[ItemId]) -> Result<GroupId, ApiError> {
        let mut params = vec![
            field("id", group.id.as_str()),
            field("name", group.name.as_str()),
            field("description", group.description.as_str()),
        ];
        params.extend(items.iter().map(|id| field("items[]", id.as_str())));
        params.extend(group.composite_of.iter().map(|id| field("baseGroupIds[]", id.as_str())));

        let data = self.call(Action::SaveGroup, params).await?;
        let created: Option<Created<GroupId>> = serde_json::from_value(data).ok();
        Ok(created.and_then(|c| c.id).unwrap_or_else(|| group.id.clone()))
    }

    pub async fn delete_group(&self, group: &GroupId) -> Result<(), ApiError> {
        self.call(Action::DeleteGroup, vec![field("id", group.as_str())])
            .await
            .map(drop)
    }

    // ========================
    // Templates
    // ========================

    pub async fn save_template(
        &self,
        name: &str,
        description: &str,
        classification: &ClassificationResult,
    ) -> Result<Template, ApiError> {
        let encoded = serde_json::to_string(classification).map_err(|e| ApiError::Decode(e.to_string()))?;
        let params = vec![
            field("name", name),
            field("description", description),
            field("classification", encoded),
        ];
        let wire: WireTemplate = self.call_as(Action::SavePlantilla, params).await?;
        wire.try_into()
    }

    pub async fn list_templates(&self) -> Result<Vec<Template>, ApiError> {
        let wire: Vec<WireTemplate> = self.call_as(Action::ListPlantillas, Vec::new()).await?;
        wire.into_iter().map(Template::try_from).collect()
    }
}

#[async_trait(?Send)]
impl<T: Transport> GroupLookup for ApiClient<T> {
    async fn group_items(&self, group: &GroupId) -> ClassifyResult<Vec<ItemId>> {
        ApiClient::group_items(self, group).await.map_err(ClassifyError::from)
    }
}
