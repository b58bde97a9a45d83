use reqwest::StatusCode;
use serde_json::{json, Value};

use scenario_api::config::ApiConfig;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let (app, _jobs) = scenario_api::app::build_app(&ApiConfig::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn status_eventually(client: &reqwest::Client, srv: &TestServer, id: &str, wanted: &str) -> Value {
    // Jobs run in the background; poll until the worker has written the transition.
    for _ in 0..100 {
        let res = client
            .get(srv.url(&format!("/analyze/{id}/status")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        if body["status"] == wanted {
            return body;
        }

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    panic!("analysis {id} did not reach {wanted} within timeout");
}

async fn create(client: &reqwest::Client, srv: &TestServer, body: Value) -> String {
    let res = client.post(srv.url("/analyze")).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["status"], "queued");
    created["analysis_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_healthy() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["active_analyses"], 0);
}

#[tokio::test]
async fn async_analysis_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let id = create(
        &client,
        &srv,
        json!({
            "situation": "I'm launching a startup with my team, market conditions are uncertain",
            "context": {"industry": "Technology"},
        }),
    )
    .await;

    let status = status_eventually(&client, &srv, &id, "completed").await;
    assert!(status["completed_at"].is_string());
    assert!(status["error"].is_null());

    let res = client.get(srv.url(&format!("/analyze/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let analysis: Value = res.json().await.unwrap();
    assert_eq!(analysis["analysis_id"], id.as_str());
    assert_eq!(analysis["outcome_source"], "rule_based");
    assert_eq!(analysis["outcomes"].as_array().unwrap().len(), 4);
    assert_eq!(analysis["outcomes"][1]["probability"], 0.45);
    assert_eq!(analysis["outcomes"][0]["impact_level"], "High");
    let factors: Vec<&str> = analysis["context_factors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(factors.contains(&"Business/Commercial context"));
    assert!(factors.contains(&"Technology factors"));
    assert!(factors.contains(&"industry: Technology"));
    let recs = analysis["recommendations"].as_array().unwrap();
    assert_eq!(recs[recs.len() - 1], "Maintain flexibility for scenario pivots");

    // Deleted records are gone for good.
    let res = client.delete(srv.url(&format!("/analyze/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = client
        .get(srv.url(&format!("/analyze/{id}/status")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn blank_situation_job_fails() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let id = create(&client, &srv, json!({"situation": "   "})).await;
    let status = status_eventually(&client, &srv, &id, "failed").await;
    assert!(status["error"].as_str().unwrap().contains("situation"));

    let res = client.get(srv.url(&format!("/analyze/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_state");
    assert!(body["message"].as_str().unwrap().contains("failed"));
}

#[tokio::test]
async fn list_filters_by_status_and_limit() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for i in 0..3 {
        let id = create(&client, &srv, json!({"situation": format!("Decision number {i}")})).await;
        status_eventually(&client, &srv, &id, "completed").await;
        ids.push(id);
    }
    let failed = create(&client, &srv, json!({"situation": ""})).await;
    status_eventually(&client, &srv, &failed, "failed").await;

    let res = client
        .get(srv.url("/analyze?status=completed&limit=2"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let items: Vec<Value> = res.json().await.unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|j| j["status"] == "completed"));
    assert_eq!(items[0]["analysis_id"], ids[2].as_str());
    assert_eq!(items[1]["analysis_id"], ids[1].as_str());

    let items: Vec<Value> = client
        .get(srv.url("/analyze"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0]["analysis_id"], failed.as_str());
}

#[tokio::test]
async fn sync_analysis_returns_result_inline() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/analyze/sync"))
        .json(&json!({
            "situation": "Should we hire for the team before the deadline?",
            "api_key": "sk-not-used",
            "model": "rule-based",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let analysis: Value = res.json().await.unwrap();
    assert_eq!(analysis["outcome_source"], "rule_based");
    assert!(analysis["analysis_timestamp"].is_string());

    // Nothing was recorded.
    let items: Vec<Value> = client
        .get(srv.url("/analyze"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(items.is_empty());
}
