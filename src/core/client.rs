use crate::config::resolve::{Credential, ResolvedConfig, RetryPolicy};
use crate::utils::error::{ReleaseError, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

const RETRYABLE_STATUSES: [u16; 10] = [408, 413, 429, 500, 502, 503, 504, 521, 522, 524];

/// 帶認證標頭與重試策略的 GitLab API 客戶端
#[derive(Debug, Clone)]
pub struct GitlabClient {
    client: Client,
    credential: Option<Credential>,
    retry: RetryPolicy,
}

impl GitlabClient {
    pub fn new(config: &ResolvedConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(proxy) = &config.proxy {
            tracing::debug!("Using proxy {}", proxy);
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
            credential: config.credential.clone(),
            retry: config.retry,
        })
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.credential {
            Some(credential) => request.header(credential.header_name(), credential.value()),
            None => request,
        }
    }

    fn is_idempotent(method: &Method) -> bool {
        matches!(
            *method,
            Method::GET | Method::PUT | Method::HEAD | Method::DELETE | Method::OPTIONS
        )
    }

    /// 送出請求；冪等方法在網路錯誤或可重試狀態碼時依指數退避重試。
    /// `build` 每次嘗試都會重新建構請求（請求本體無法重複使用）。
    pub async fn send<F>(&self, method: Method, url: &str, build: F) -> Result<Response>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let max_retries = if Self::is_idempotent(&method) {
            self.retry.limit
        } else {
            0
        };
        let mut attempt = 0;

        loop {
            let outcome = build(self.request(method.clone(), url)).send().await;

            let retryable = match &outcome {
                Ok(response) => RETRYABLE_STATUSES.contains(&response.status().as_u16()),
                Err(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            };

            if !retryable || attempt >= max_retries {
                let response = outcome?;
                return Self::error_for_status(url, response).await;
            }

            attempt += 1;
            let delay = self.retry.base_delay * 2u32.saturating_pow(attempt - 1);
            tracing::warn!(
                "🔁 {} {} failed, retrying ({}/{}) in {:?}",
                method,
                url,
                attempt,
                max_retries,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    pub async fn send_json<T, F>(&self, method: Method, url: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let response = self.send(method, url, build).await?;
        Ok(response.json::<T>().await?)
    }

    async fn error_for_status(url: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(url, status, &body))
    }
}

/// 從 GitLab 錯誤回應擷取 `message` / `error` 欄位
fn api_error(url: &str, status: StatusCode, body: &str) -> ReleaseError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .or_else(|| json.get("error"))
                .map(|m| match m {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
        })
        .unwrap_or_else(|| body.trim().to_string());

    ReleaseError::ApiError {
        endpoint: url.to_string(),
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn client(credential: Option<Credential>, limit: u32) -> GitlabClient {
        GitlabClient::new(&ResolvedConfig {
            gitlab_url: "https://gitlab.com".to_string(),
            gitlab_api_url: "https://gitlab.com/api/v4".to_string(),
            credential,
            assets: vec![],
            milestones: vec![],
            proxy: None,
            retry: RetryPolicy {
                limit,
                base_delay: Duration::from_millis(1),
            },
        })
        .unwrap()
    }

    #[test]
    fn test_api_error_message_extraction() {
        let err = api_error(
            "https://gitlab.com/api/v4/projects/1/releases",
            StatusCode::CONFLICT,
            r#"{"message":"Release already exists"}"#,
        );
        assert!(err.to_string().contains("Release already exists"));

        let err = api_error("u", StatusCode::BAD_REQUEST, r#"{"message":{"name":["is invalid"]}}"#);
        assert!(err.to_string().contains("is invalid"));

        let err = api_error("u", StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(err.to_string().contains("bad gateway"));
    }

    #[tokio::test]
    async fn test_sends_private_token_header() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v4/projects/1")
                .header("private-token", "secret");
            then.status(200).json_body(serde_json::json!({"id": 1}));
        });

        let client = client(Some(Credential::PrivateToken("secret".to_string())), 0);
        let body: serde_json::Value = client
            .send_json(Method::GET, &server.url("/api/v4/projects/1"), |r| r)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(body["id"], 1);
    }

    #[tokio::test]
    async fn test_get_is_retried_on_server_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/flaky");
            then.status(503);
        });

        let client = client(None, 2);
        let err = client
            .send(Method::GET, &server.url("/flaky"), |r| r)
            .await
            .unwrap_err();

        mock.assert_hits(3);
        assert!(matches!(err, ReleaseError::ApiError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_post_is_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/releases");
            then.status(500).json_body(serde_json::json!({"message": "boom"}));
        });

        let client = client(None, 3);
        let err = client
            .send(Method::POST, &server.url("/releases"), |r| r)
            .await
            .unwrap_err();

        mock.assert_hits(1);
        assert!(err.to_string().contains("boom"));
    }
}
