//! HTTP quiz API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, Url};
use tracing::instrument;

use quiztime_core::model::{AttemptRecord, AttemptSubmission, Quiz};
use quiztime_core::traits::QuizApi;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Client for the quiz REST API.
pub struct HttpQuizApi {
    api_root: String,
    access_token: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpQuizApi {
    pub fn new(
        base_url: &str,
        access_token: Option<String>,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        Self::from_config(&ApiConfig {
            base_url: base_url.to_string(),
            access_token,
            timeout_secs,
            ..ApiConfig::default()
        })
    }

    pub fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

        Ok(Self {
            api_root: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                config.api_prefix
            ),
            access_token: config.access_token.clone(),
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Url::parse(&format!("{}{}", self.api_root, path))
            .map_err(|e| ApiError::Network(format!("invalid URL: {e}")))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => req.header("Authorization", format!("Bearer {token}")),
            None => req,
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Response, ApiError> {
        self.authorize(req).send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::Network(e.to_string())
            }
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Map non-success statuses to typed errors.
async fn check_status(response: Response, quiz_id: Option<u64>) -> Result<Response, ApiError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }
    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            * 1000;
        return Err(ApiError::RateLimited {
            retry_after_ms: retry_after,
        });
    }

    let body = response.text().await.unwrap_or_default();
    match (status, quiz_id) {
        (404, Some(id)) => Err(ApiError::NotFound(id)),
        (401, _) => Err(ApiError::Unauthorized(body)),
        _ => Err(ApiError::Api {
            status,
            message: body,
        }),
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn fetch_quiz(&self, id: u64) -> anyhow::Result<Quiz> {
        let url = self.url(&format!("/quiz/{id}"))?;
        let response = self.send(self.client.get(url)).await?;
        let response = check_status(response, Some(id)).await?;
        let quiz: Quiz = Self::decode(response).await?;
        tracing::debug!(questions = quiz.questions.len(), "quiz fetched");
        Ok(quiz)
    }

    #[instrument(skip(self))]
    async fn list_quizzes(&self, subject: Option<&str>) -> anyhow::Result<Vec<Quiz>> {
        let mut url = self.url("/quiz/")?;
        if let Some(subject) = subject {
            url.query_pairs_mut().append_pair("subject", subject);
        }
        let response = self.send(self.client.get(url)).await?;
        let response = check_status(response, None).await?;
        Ok(Self::decode(response).await?)
    }

    #[instrument(skip(self, attempt), fields(quiz_id = attempt.quiz_id))]
    async fn submit_attempt(&self, attempt: &AttemptSubmission) -> anyhow::Result<AttemptRecord> {
        let url = self.url(&format!("/quiz/{}/submit", attempt.quiz_id))?;
        let response = self.send(self.client.post(url).json(attempt)).await?;
        let response = check_status(response, Some(attempt.quiz_id)).await?;
        let record: AttemptRecord = Self::decode(response).await?;
        tracing::info!(attempt_id = record.id, score = record.score, "attempt persisted");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quiz_json() -> serde_json::Value {
        serde_json::json!({
            "id": 7,
            "title": "Optics",
            "description": null,
            "subject": "physics",
            "difficulty": "hard",
            "time_limit": 15,
            "questions": [
                {"question": "Speed of light?", "options": ["3e8 m/s", "3e6 m/s"], "correct_answer": 0}
            ],
            "user_id": 1,
            "is_ai_generated": true,
            "created_at": "2025-03-01T10:00:00"
        })
    }

    #[tokio::test]
    async fn fetch_quiz_with_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/quiz/7"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(quiz_json()))
            .mount(&server)
            .await;

        let api = HttpQuizApi::new(&server.uri(), Some("test-token".into()), 5).unwrap();
        let quiz = api.fetch_quiz(7).await.unwrap();
        assert_eq!(quiz.title, "Optics");
        assert_eq!(quiz.time_limit_minutes, Some(15));
        assert!(quiz.is_ai_generated);
    }

    #[tokio::test]
    async fn missing_quiz_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/quiz/99"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"detail":"Quiz not found"}"#))
            .mount(&server)
            .await;

        let api = HttpQuizApi::new(&server.uri(), None, 5).unwrap();
        let err = api.fetch_quiz(99).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn list_filters_by_subject() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/quiz/"))
            .and(query_param("subject", "physics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![quiz_json()]))
            .mount(&server)
            .await;

        let api = HttpQuizApi::new(&server.uri(), None, 5).unwrap();
        let quizzes = api.list_quizzes(Some("physics")).await.unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].subject, "physics");
    }

    #[tokio::test]
    async fn submit_sends_wire_payload() {
        let server = MockServer::start().await;

        let expected = serde_json::json!({"quiz_id": 7, "answers": [0, -1], "time_taken": 42});
        let record = serde_json::json!({
            "id": 501,
            "quiz_id": 7,
            "answers": [0, -1],
            "score": 50.0,
            "time_taken": 42,
            "completed": true,
            "created_at": "2025-03-01T10:05:00.123456"
        });

        Mock::given(method("POST"))
            .and(path("/api/v1/quiz/7/submit"))
            .and(body_json(&expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(&record))
            .mount(&server)
            .await;

        let api = HttpQuizApi::new(&server.uri(), None, 5).unwrap();
        let attempt = AttemptSubmission {
            quiz_id: 7,
            answers: vec![0, -1],
            time_taken: 42,
        };
        let record = api.submit_attempt(&attempt).await.unwrap();
        assert_eq!(record.id, 501);
        assert!((record.score - 50.0).abs() < f64::EPSILON);
        assert_eq!(
            record.created_at.map(|t| t.to_rfc3339()),
            Some("2025-03-01T10:05:00.123456+00:00".to_string())
        );
    }

    #[tokio::test]
    async fn submit_ignores_extra_record_fields() {
        let server = MockServer::start().await;

        let record = serde_json::json!({
            "id": 502,
            "quiz_id": 7,
            "user_id": 3,
            "answers": [1, 0],
            "score": 0.0,
            "time_taken": 9,
            "completed": true,
            "created_at": "2025-03-01T10:05:00",
            "updated_at": "2025-03-01T10:05:00"
        });

        Mock::given(method("POST"))
            .and(path("/api/v1/quiz/7/submit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&record))
            .mount(&server)
            .await;

        let api = HttpQuizApi::new(&server.uri(), Some("t".into()), 5).unwrap();
        let attempt = AttemptSubmission {
            quiz_id: 7,
            answers: vec![1, 0],
            time_taken: 9,
        };
        let record = api.submit_attempt(&attempt).await.unwrap();
        assert_eq!(record.id, 502);
        assert_eq!(record.answers, vec![1, 0]);
        assert!(record.created_at.is_some());
    }

    #[tokio::test]
    async fn unauthorized_and_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/quiz/1"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/quiz/2"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .mount(&server)
            .await;

        let api = HttpQuizApi::new(&server.uri(), None, 5).unwrap();

        let err = api.fetch_quiz(1).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::Unauthorized(body)) if body == "bad token"
        ));

        let err = api.fetch_quiz(2).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::RateLimited { retry_after_ms: 3000 })
        ));
    }

    #[tokio::test]
    async fn server_error_and_bad_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/quiz/3"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/quiz/4"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let api = HttpQuizApi::new(&format!("{}/", server.uri()), None, 5).unwrap();

        let err = api.fetch_quiz(3).await.unwrap_err();
        assert!(err.to_string().contains("500"));

        let err = api.fetch_quiz(4).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Decode(_))));
    }
}
