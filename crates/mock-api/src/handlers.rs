//! `action` dispatch for the mock endpoint.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Form, Json,
};
use classify_core::{Action, ApiEnvelope, ClassificationResult, Group, GroupId, ItemId, TagId, TagRecord, Template};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::session::SessionData;
use crate::AppState;

/// Query string and form body, form values winning
pub struct Params {
    single: HashMap<String, String>,
    lists: HashMap<String, Vec<String>>,
}

impl Params {
    pub fn new(query: Vec<(String, String)>, form: Vec<(String, String)>) -> Self {
        let mut single = HashMap::new();
        let mut lists: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in query.into_iter().chain(form) {
            match key.strip_suffix("[]") {
                Some(base) => lists.entry(base.to_string()).or_default().push(value),
                None => {
                    single.insert(key, value);
                }
            }
        }
        Self { single, lists }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.single.get(key).map(String::as_str)
    }

    fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or("").trim().to_string()
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.lists.get(key).cloned().unwrap_or_default()
    }
}

type Reply = ApiEnvelope<Value>;

fn ok(data: Value) -> Reply {
    ApiEnvelope::ok(data)
}

fn fail(error: impl Into<String>) -> Reply {
    ApiEnvelope::failure(error)
}

fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

pub async fn mock(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    Form(form): Form<Vec<(String, String)>>,
) -> impl IntoResponse {
    let params = Params::new(query, form);
    let cookie = session_cookie(&headers, &state.cookie_name);
    let (sid, fresh, reply) = state.sessions.with_session(cookie.as_deref(), |data| dispatch(data, &params));

    let mut response_headers = HeaderMap::new();
    if fresh {
        info!(%sid, "new mock session");
        let cookie = format!("{}={}; Path=/; HttpOnly", state.cookie_name, sid);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response_headers.insert(header::SET_COOKIE, value);
        }
    }
    (response_headers, Json(reply))
}

pub fn dispatch(data: &mut SessionData, params: &Params) -> Reply {
    let name = params.get("action").unwrap_or("");
    debug!(action = name, "mock request");
    let Some(action) = Action::parse(name) else {
        return fail(format!("Action '{}' not recognized.", name));
    };

    match action {
        Action::TagList => ok(json!(data.tags)),
        Action::TagAdd => tag_add(data, params),
        Action::TagUpdate => tag_update(data, params),
        Action::TagDelete => tag_delete(data, params),
        Action::TagGetItemTags => item_tags(data, params),
        Action::ListGroups => list_groups(data),
        Action::GetGroupItems => group_items(data, params),
        Action::SaveGroup => save_group(data, params),
        Action::DeleteGroup => delete_group(data, params),
        Action::SavePlantilla => save_template(data, params),
        Action::ListPlantillas => ok(json!(data.templates)),
    }
}

fn unix_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}

fn tag_add(data: &mut SessionData, params: &Params) -> Reply {
    let text = params.text("text");
    if text.is_empty() {
        return fail("Tag text required");
    }
    let mut stamp = unix_seconds();
    while data.tags.iter().any(|t| t.id.as_str() == stamp.to_string()) {
        stamp += 1;
    }
    let id = TagId::new(stamp.to_string());
    data.tags.push(TagRecord { id: id.clone(), text });
    ok(json!({ "id": id }))
}

fn tag_update(data: &mut SessionData, params: &Params) -> Reply {
    let id = params.text("id");
    let text = params.text("text");
    if text.is_empty() {
        return fail("Tag text required");
    }
    match data.tags.iter_mut().find(|t| t.id.as_str() == id) {
        Some(tag) => {
            tag.text = text;
            ok(json!([]))
        }
        None => fail("Tag not found"),
    }
}

fn tag_delete(data: &mut SessionData, params: &Params) -> Reply {
    let id = TagId::new(params.text("id"));
    let used = data.tag_usage(&id);
    if used > 0 {
        return fail(format!("Cannot delete tag - it's being used in {} items", used));
    }
    data.tags.retain(|t| t.id != id);
    ok(json!([]))
}

fn item_tags(data: &SessionData, params: &Params) -> Reply {
    let item = ItemId::new(params.text("item_id"));
    let applied = data.item_tags.get(&item).cloned().unwrap_or_default();
    let tags: Vec<Value> = data
        .tags
        .iter()
        .map(|t| json!({ "value": t.id, "text": t.text, "selected": applied.contains(&t.id) }))
        .collect();
    ok(json!({ "tags": tags }))
}

fn list_groups(data: &SessionData) -> Reply {
    let groups: Vec<Group> = data
        .groups
        .iter()
        .map(|g| Group {
            item_count: data.members(&g.id).len(),
            ..g.clone()
        })
        .collect();
    ok(json!(groups))
}

fn group_items(data: &SessionData, params: &Params) -> Reply {
    let members = data.members(&GroupId::new(params.text("groupId")));
    // Full item objects, skipping members that no longer exist
    let details: Vec<_> = data
        .system_items
        .iter()
        .filter(|item| members.contains(&item.id))
        .collect();
    ok(json!(details))
}

fn save_group(data: &mut SessionData, params: &Params) -> Reply {
    let id = match params.text("id") {
        id if id.is_empty() => GroupId::new(format!("g{}", unix_seconds())),
        id => GroupId::new(id),
    };
    let name = match params.text("name") {
        name if name.is_empty() => "New Group".to_string(),
        name => name,
    };
    let description = params.text("description");
    let bases: Vec<GroupId> = params.list("baseGroupIds").into_iter().map(GroupId::new).collect();
    let items: Vec<ItemId> = params.list("items").into_iter().map(ItemId::new).collect();

    match data.groups.iter_mut().find(|g| g.id == id) {
        Some(group) => {
            group.name = name;
            group.description = description;
            group.composite_of = bases;
        }
        None => {
            let mut group = Group::new(id.as_str(), name, 0);
            group.description = description;
            group.composite_of = bases;
            data.groups.push(group);
        }
    }
    data.group_items.insert(id.clone(), items);
    ok(json!({ "id": id }))
}

fn delete_group(data: &mut SessionData, params: &Params) -> Reply {
    let id = GroupId::new(params.text("id"));
    data.groups.retain(|g| g.id != id);
    data.group_items.remove(&id);
    ok(json!([]))
}

fn save_template(data: &mut SessionData, params: &Params) -> Reply {
    let classification: ClassificationResult = match params.get("classification") {
        Some(raw) if !raw.trim().is_empty() => match serde_json::from_str(raw) {
            Ok(parsed) => parsed,
            Err(_) => return fail("Invalid classification"),
        },
        _ => ClassificationResult::default(),
    };
    let name = match params.text("name") {
        name if name.is_empty() => "Unnamed Layout".to_string(),
        name => name,
    };
    let mut millis = chrono::Utc::now().timestamp_millis();
    while data.templates.iter().any(|t| t.id.as_str() == format!("pl_{}", millis)) {
        millis += 1;
    }
    let template = Template {
        id: format!("pl_{}", millis).into(),
        name,
        description: params.text("description"),
        classification,
    };
    data.templates.push(template.clone());
    ok(json!(template))
}
