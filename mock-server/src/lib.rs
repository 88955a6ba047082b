use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const AGENT: &str = "Agent";
pub const DEFAULT_PAGE_SIZE: usize = 20;

pub type Entity = Map<String, Value>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationResult {
    pub agent_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEvent {
    pub event_type: String,
    #[serde(default)]
    pub payload: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub size: Option<usize>,
    pub sort: Option<String>,
}

/// Entities per resource name, keyed by id.
#[derive(Debug, Default)]
pub struct Store {
    entities: HashMap<String, BTreeMap<String, Entity>>,
    events: HashMap<String, Vec<AgentEvent>>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with_db(Db::default())
}

pub fn app_with_db(db: Db) -> Router {
    Router::new()
        .route("/{resource}", get(list_entities).post(create_entity))
        .route(
            "/{resource}/{id}",
            get(get_entity).put(update_entity).delete(delete_entity),
        )
        .route("/{resource}/{id}/activate", post(activate_agent))
        .route("/{resource}/{id}/event/{event_type}", post(publish_event))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Events recorded for an agent, oldest first.
pub async fn recorded_events(db: &Db, agent_id: &str) -> Vec<AgentEvent> {
    db.read()
        .await
        .events
        .get(agent_id)
        .cloned()
        .unwrap_or_default()
}

async fn list_entities(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Value>> {
    let store = db.read().await;
    let mut items: Vec<Entity> = store
        .entities
        .get(&resource)
        .map(|by_id| by_id.values().cloned().collect())
        .unwrap_or_default();
    if let Some(sort) = query.sort.as_deref().filter(|s| !s.is_empty()) {
        sort_entities(&mut items, sort);
    }
    let items = paginate(items, query.page, query.size);
    Json(items.into_iter().map(Value::Object).collect())
}

async fn create_entity(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let Value::Object(mut entity) = body else {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    };
    let id = match entity.get("id") {
        None | Some(Value::Null) => Uuid::new_v4().to_string(),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Err(StatusCode::UNPROCESSABLE_ENTITY),
    };
    entity.insert("id".to_string(), Value::String(id.clone()));

    let mut store = db.write().await;
    let by_id = store.entities.entry(resource.clone()).or_default();
    if by_id.contains_key(&id) {
        return Err(StatusCode::CONFLICT);
    }
    by_id.insert(id.clone(), entity.clone());
    tracing::info!(%resource, %id, "created entity");
    Ok((StatusCode::CREATED, Json(Value::Object(entity))))
}

async fn get_entity(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    store
        .entities
        .get(&resource)
        .and_then(|by_id| by_id.get(&id))
        .cloned()
        .map(|entity| Json(Value::Object(entity)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_entity(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let Value::Object(mut entity) = body else {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    };
    let mut store = db.write().await;
    let slot = store
        .entities
        .get_mut(&resource)
        .and_then(|by_id| by_id.get_mut(&id))
        .ok_or(StatusCode::NOT_FOUND)?;
    entity.insert("id".to_string(), Value::String(id.clone()));
    *slot = entity.clone();
    tracing::info!(%resource, %id, "replaced entity");
    Ok(Json(Value::Object(entity)))
}

async fn delete_entity(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let removed = store
        .entities
        .get_mut(&resource)
        .and_then(|by_id| by_id.remove(&id));
    match removed {
        Some(_) => {
            tracing::info!(%resource, %id, "deleted entity");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn activate_agent(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<ActivationResult>, StatusCode> {
    if resource != AGENT {
        return Err(StatusCode::NOT_FOUND);
    }
    let mut store = db.write().await;
    let agent = store
        .entities
        .get_mut(AGENT)
        .and_then(|by_id| by_id.get_mut(&id))
        .ok_or(StatusCode::NOT_FOUND)?;
    agent.insert("status".to_string(), Value::String("ACTIVE".to_string()));
    tracing::info!(%id, "activated agent");
    Ok(Json(ActivationResult {
        agent_id: id.clone(),
        status: "ACTIVE".to_string(),
        message: Some(format!("agent {id} activated")),
    }))
}

async fn publish_event(
    State(db): State<Db>,
    Path((resource, id, event_type)): Path<(String, String, String)>,
    body: Bytes,
) -> Result<StatusCode, StatusCode> {
    if resource != AGENT {
        return Err(StatusCode::NOT_FOUND);
    }
    let payload = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_slice::<Value>(&body).map_err(|_| StatusCode::BAD_REQUEST)?)
    };
    let mut store = db.write().await;
    let exists = store
        .entities
        .get(AGENT)
        .is_some_and(|by_id| by_id.contains_key(&id));
    if !exists {
        return Err(StatusCode::NOT_FOUND);
    }
    tracing::info!(%id, %event_type, "recorded agent event");
    store
        .events
        .entry(id)
        .or_default()
        .push(AgentEvent { event_type, payload });
    Ok(StatusCode::ACCEPTED)
}

/// `sort` is `field` or `field,asc|desc`.
fn sort_entities(items: &mut [Entity], sort: &str) {
    let mut parts = sort.splitn(2, ',');
    let field = parts.next().unwrap_or_default().trim();
    let descending = parts
        .next()
        .is_some_and(|dir| dir.trim().eq_ignore_ascii_case("desc"));
    items.sort_by(|a, b| {
        let ordering = compare_values(a.get(field), b.get(field));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Zero-based pages. Without either parameter the whole list is returned.
fn paginate(items: Vec<Entity>, page: Option<usize>, size: Option<usize>) -> Vec<Entity> {
    if page.is_none() && size.is_none() {
        return items;
    }
    let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
    let page = page.unwrap_or(0);
    items
        .into_iter()
        .skip(page.saturating_mul(size))
        .take(size)
        .collect()
}
