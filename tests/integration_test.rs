use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use rootcause::api::build_app;
use rootcause::api::handlers::AppState;
use rootcause::embeddings::Embedder;
use rootcause::llm::ChatMessage;
use rootcause::llm::ChatModel;
use rootcause::models::IssueType;
use rootcause::models::Severity;
use rootcause::rag::bootstrap;
use rootcause::rag::AnalysisPipeline;
use rootcause::rag::SimilarityIndex;
use rootcause::RcaError;
use rootcause::Result;
use serde_json::json;
use serde_json::Value;
use tower::ServiceExt;

const TOP_K: usize = 4;

/// Word-count embedder over a fixed vocabulary
struct KeywordEmbedder;

const VOCABULARY: [&str; 12] = [
    "payment", "payments", "checkout", "login", "log", "password", "upload", "picture",
    "dashboard", "slow", "email", "notifications",
];

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model(&self) -> &str {
        "keyword-test"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = VOCABULARY
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect();
        // Keep every vector non-zero so ranking is always defined
        vector.push(0.1);
        Ok(vector)
    }
}

struct DownEmbedder;

#[async_trait]
impl Embedder for DownEmbedder {
    fn model(&self) -> &str {
        "down"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RcaError::EmbeddingError("connection refused".to_string()))
    }
}

/// Model with a canned reply that remembers the last user prompt
struct CannedModel {
    reply: std::result::Result<String, String>,
    last_prompt: Mutex<Option<String>>,
}

impl CannedModel {
    fn new(reply: std::result::Result<String, String>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            last_prompt: Mutex::new(None),
        })
    }

    fn last_prompt(&self) -> String {
        self.last_prompt.lock().unwrap().clone().unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for CannedModel {
    fn model(&self) -> &str {
        "canned-model"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        *self.last_prompt.lock().unwrap() = messages.last().map(|m| m.content.clone());
        self.reply.clone().map_err(RcaError::InferenceFailure)
    }
}

fn payment_reply() -> String {
    json!({
        "summary": "EU customers cannot complete checkout.",
        "category": "Payment Failure",
        "root_cause": "Payment gateway timeout in the EU region",
        "issue_type": "bug",
        "severity": "HIGH",
        "confidence": 0.9,
        "engineering_actions": ["Add gateway failover"],
        "product_actions": ["Show a clear payment error"],
        "support_reply_suggestion": "Apologise and share the incident ETA.",
        "similar_incidents": ["INVENTED-1", "INVENTED-2"]
    })
    .to_string()
}

fn router(index: SimilarityIndex, model: Arc<CannedModel>) -> Router {
    let pipeline = Arc::new(AnalysisPipeline::new(Arc::new(index), model, TOP_K));
    build_app(AppState::new(pipeline), false)
}

async fn app_with(embedder: Arc<dyn Embedder>, model: Arc<CannedModel>) -> Router {
    let index = SimilarityIndex::new(embedder);
    bootstrap(&index).await.unwrap();
    router(index, model)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn test_liveness() {
    let app = app_with(Arc::new(KeywordEmbedder), CannedModel::new(Ok(payment_reply()))).await;
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "AI Customer Support Root Cause Analyzer is running!"})
    );
}

#[tokio::test]
async fn test_analyze_via_query_parameter() {
    let model = CannedModel::new(Ok(payment_reply()));
    let app = app_with(Arc::new(KeywordEmbedder), model.clone()).await;

    let (status, body) = send(
        app,
        post(
            "/analyze_ticket?ticket=Payments%20failing%20at%20checkout%20again",
            Body::empty(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issue_type"], IssueType::Bug.as_str());
    assert_eq!(body["severity"], Severity::High.as_str());

    let similar = body["similar_incidents"].as_array().unwrap();
    assert_eq!(similar.len(), TOP_K);
    assert_eq!(similar[0], "INC-2024-001");
    assert!(!similar.contains(&json!("INVENTED-1")));

    let prompt = model.last_prompt();
    assert!(prompt.contains("Payments failing at checkout again"));
    assert!(prompt.contains("The checkout page just spins"));
}

#[tokio::test]
async fn test_analyze_via_json_body() {
    let model = CannedModel::new(Ok(payment_reply()));
    let app = app_with(Arc::new(KeywordEmbedder), model.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/analyze_ticket")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"ticket": "My dashboard is slow this morning"}).to_string(),
        ))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["similar_incidents"][0], "INC-2024-004");
    assert!(model
        .last_prompt()
        .contains("Support Ticket:\nMy dashboard is slow this morning\n"));
}

#[tokio::test]
async fn test_analyze_via_raw_body() {
    let model = CannedModel::new(Ok(payment_reply()));
    let app = app_with(Arc::new(KeywordEmbedder), model.clone()).await;

    let ticket = "Subject: Email notifications\n\nNo email notifications arrive.";
    let (status, body) = send(app, post("/analyze_ticket", ticket)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["similar_incidents"][0], "INC-2024-005");
    assert!(model.last_prompt().contains(ticket));
}

#[tokio::test]
async fn test_retrieval_down_degrades() {
    let model = CannedModel::new(Ok(payment_reply()));
    // Embedding service went away after startup
    let app = router(SimilarityIndex::new(Arc::new(DownEmbedder)), model.clone());

    let (status, body) = send(app, post("/analyze_ticket", "Payments failing")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["similar_incidents"], json!([]));
    assert!(model.last_prompt().contains("Similar Incidents:\nNone\n"));
}

#[tokio::test]
async fn test_seeding_requires_embedding_service() {
    let index = SimilarityIndex::new(Arc::new(DownEmbedder));
    assert!(matches!(
        bootstrap(&index).await,
        Err(RcaError::RetrievalUnavailable(_))
    ));
    assert!(index.is_empty().await);
}

#[tokio::test]
async fn test_model_failure_is_bad_gateway() {
    let model = CannedModel::new(Err("model service returned 500".to_string()));
    let app = app_with(Arc::new(KeywordEmbedder), model).await;

    let (status, body) = send(app, post("/analyze_ticket", "Payments failing")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], Value::Null);
    assert!(body["error"].as_str().unwrap().contains("Inference failed"));
}

#[tokio::test]
async fn test_unparseable_output_reports_raw_text() {
    let model = CannedModel::new(Ok("I think it's the gateway.".to_string()));
    let app = app_with(Arc::new(KeywordEmbedder), model).await;

    let (status, body) = send(app, post("/analyze_ticket", "Payments failing")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("I think it's the gateway."));
}

#[tokio::test]
async fn test_invalid_field_names_the_field() {
    let mut reply: Value = serde_json::from_str(&payment_reply()).unwrap();
    reply["severity"] = json!("Critical");
    let model = CannedModel::new(Ok(reply.to_string()));
    let app = app_with(Arc::new(KeywordEmbedder), model).await;

    let (status, body) = send(app, post("/analyze_ticket", "Payments failing")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("severity"));
    assert!(error.contains("Critical"));
}

#[tokio::test]
async fn test_empty_ticket_is_analyzed() {
    let model = CannedModel::new(Ok(payment_reply()));
    let app = app_with(Arc::new(KeywordEmbedder), model).await;

    let (status, body) = send(app, post("/analyze_ticket", Body::empty())).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["summary"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_stats() {
    let app = app_with(Arc::new(KeywordEmbedder), CannedModel::new(Ok(payment_reply()))).await;
    let request = Request::builder().uri("/stats").body(Body::empty()).unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"indexed_incidents": 5, "top_k": TOP_K, "model": "canned-model"})
    );
}
