//! Full request lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then executes every builder
//! operation over real HTTP using ureq and applies each request's transform
//! to the response. Validates that URLs, bodies and transforms line up with
//! what the backend actually serves.

use resource_core::{
    Agent, ApiError, FileRecord, HttpMethod, HttpRequest, HttpResponse, ListParams, ResourceClient,
};
use serde_json::json;

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the request's
/// own `parse` handle status interpretation.
fn execute<T>(req: &HttpRequest<T>) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let url = req.full_url();
    let mut response = match (req.method, req.body.as_deref()) {
        (HttpMethod::Get, _) => agent.get(&url).call(),
        (HttpMethod::Delete, _) => agent.delete(&url).call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(&url)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&url).send_empty(),
        (HttpMethod::Put, Some(body)) => agent
            .put(&url)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Put, None) => agent.put(&url).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        body,
    }
}

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn agent(name: &str) -> Agent {
    Agent {
        name: name.to_string(),
        ..Agent::default()
    }
}

#[test]
fn agent_lifecycle() {
    let client = ResourceClient::new(&start_server());
    let agents = client.agent();

    // Step 1: list: should be empty.
    let req = agents.get_list(&ListParams::new());
    let listed = req.parse(execute(&req)).unwrap().unwrap();
    assert!(listed.is_empty(), "expected empty list");

    // Step 2: create an agent; the server assigns the id.
    let input = Agent {
        model: Some("small".to_string()),
        ..agent("scout")
    };
    let req = agents.create(Some(&input)).unwrap();
    let created = req.parse(execute(&req)).unwrap().unwrap();
    assert_eq!(created.name, "scout");
    let id = created.id.clone().expect("server assigns an id");

    // Step 3: get the created agent.
    let req = agents.get_one(Some(&id)).unwrap();
    let fetched = req.parse(execute(&req)).unwrap().unwrap();
    assert_eq!(fetched, created);

    // Step 4: replace it.
    let replacement = Agent {
        description: Some("finds things".to_string()),
        ..agent("scout-2")
    };
    let req = agents.update(Some(&id), Some(&replacement)).unwrap();
    let updated = req.parse(execute(&req)).unwrap().unwrap();
    assert_eq!(updated.name, "scout-2");
    assert_eq!(updated.description.as_deref(), Some("finds things"));
    assert!(updated.model.is_none());

    // Step 5: activate, then observe the new status.
    let req = agents.activate(Some(&id)).unwrap();
    let activation = req.parse(execute(&req)).unwrap().unwrap();
    assert_eq!(activation.agent_id, id);
    assert_eq!(activation.status, "ACTIVE");

    let req = agents.get_one(Some(&id)).unwrap();
    let fetched = req.parse(execute(&req)).unwrap().unwrap();
    assert_eq!(fetched.status.as_deref(), Some("ACTIVE"));

    // Step 6: publish an event; no transform is attached.
    let payload = json!({"progress": 100});
    let req = agents
        .publish_event(Some(&id), Some("task.done"), Some(&payload))
        .unwrap();
    assert!(req.parse(execute(&req)).unwrap().is_none());

    // Step 7: delete.
    let req = agents.delete(Some(&id)).unwrap();
    assert!(req.parse(execute(&req)).unwrap().is_none());

    // Step 8: get after delete: should be NotFound.
    let req = agents.get_one(Some(&id)).unwrap();
    let err = req.parse(execute(&req)).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Step 9: delete again: should be NotFound.
    let req = agents.delete(Some(&id)).unwrap();
    let err = req.parse(execute(&req)).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[test]
fn list_pagination_passes_through() {
    let client = ResourceClient::new(&start_server());
    let agents = client.agent();

    for name in ["delta", "alpha", "charlie", "bravo"] {
        let req = agents.create(Some(&agent(name))).unwrap();
        req.parse(execute(&req)).unwrap();
    }

    let req = agents.get_list(&ListParams::new().page(1).size(2).sort("name"));
    let page = req.parse(execute(&req)).unwrap().unwrap();
    let names: Vec<_> = page.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["charlie", "delta"]);

    // empty sort is dropped, so the whole first page comes back unsorted
    let req = agents.get_list(&ListParams::new().size(10).sort(""));
    assert_eq!(req.full_url(), format!("{}/Agent?size=10", client.base_url()));
    let all = req.parse(execute(&req)).unwrap().unwrap();
    assert_eq!(all.len(), 4);
}

#[test]
fn ids_are_url_encoded() {
    let client = ResourceClient::new(&start_server());
    let files = client.file_records();

    let record = FileRecord {
        id: Some("reports/q1 2024.pdf".to_string()),
        file_name: "q1.pdf".to_string(),
        ..FileRecord::default()
    };
    let req = files.create(Some(&record)).unwrap();
    req.parse(execute(&req)).unwrap();

    let req = files.get_one(Some("reports/q1 2024.pdf")).unwrap();
    let fetched = req.parse(execute(&req)).unwrap().unwrap();
    assert_eq!(fetched, record);
}

#[test]
fn untyped_builder_round_trip() {
    let client = ResourceClient::new(&start_server());
    let resources = client.by_name("McpResource").unwrap();

    let req = resources
        .create(Some(&json!({"uri": "file:///docs", "name": "Docs"})))
        .unwrap();
    let created = req.parse(execute(&req)).unwrap().unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let req = resources.get_list(&ListParams::new());
    let listed = req.parse(execute(&req)).unwrap().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], id.as_str());
}

#[test]
fn missing_parameters_fail_before_any_request() {
    let client = ResourceClient::new("http://127.0.0.1:9");
    let err = client.agent().get_one(None).unwrap_err();
    assert_eq!(err.missing_parameter(), Some("id"));
    assert_eq!(err.operation(), Some("getOneAgent"));
}
