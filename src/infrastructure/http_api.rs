use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::errors::ApiError;
use crate::domain::menu::MenuItem;
use crate::domain::order::{Order, OrderRequest, RestaurantSettings, SettingsUpdate};
use crate::domain::ports::OrderingApi;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Bearer token issued to an admin by `POST /admin/auth`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminToken(pub String);

/// reqwest-backed client for the ordering REST API.
#[derive(Clone)]
pub struct HttpOrderingApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpOrderingApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Admin routes - require a bearer token from `login`

    pub async fn login(&self, password: &str) -> Result<AdminToken, ApiError> {
        let response = self
            .client
            .post(self.url("/admin/auth"))
            .json(&LoginBody { password })
            .send()
            .await;
        let body: LoginResponse = decode(response).await?;
        Ok(AdminToken(body.token))
    }

    pub async fn logout(&self, token: &AdminToken) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/admin/logout"))
            .bearer_auth(&token.0)
            .send()
            .await;
        check(response).await.map(|_| ())
    }

    pub async fn update_settings(
        &self,
        token: &AdminToken,
        update: &SettingsUpdate,
    ) -> Result<RestaurantSettings, ApiError> {
        let response = self
            .client
            .post(self.url("/admin/settings"))
            .bearer_auth(&token.0)
            .json(update)
            .send()
            .await;
        decode(response).await
    }

    pub async fn todays_orders(&self, token: &AdminToken) -> Result<Vec<Order>, ApiError> {
        let response = self
            .client
            .get(self.url("/admin/orders/today"))
            .bearer_auth(&token.0)
            .send()
            .await;
        decode(response).await
    }

    pub async fn admin_advance_order(
        &self,
        token: &AdminToken,
        id: i64,
    ) -> Result<Order, ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/admin/orders/{id}/advance")))
            .bearer_auth(&token.0)
            .send()
            .await;
        decode(response).await
    }
}

/// Maps a raw reqwest outcome onto `ApiError`: connection failures become
/// `Transport`, 404 becomes `NotFound`, and any other non-success status
/// becomes `Rejected` with the server's `{error}` message when it sent one.
async fn check(response: Result<Response, reqwest::Error>) -> Result<Response, ApiError> {
    let response = response.map_err(|e| ApiError::Transport(e.to_string()))?;
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if !status.is_success() {
        let message = response.json::<ErrorBody>().await.ok().map(|b| b.error);
        return Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

/// Like `check`, then decodes the body; an undecodable success body is a
/// `Transport` error.
async fn decode<T: DeserializeOwned>(
    response: Result<Response, reqwest::Error>,
) -> Result<T, ApiError> {
    check(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| ApiError::Transport(format!("unable to parse response: {e}")))
}

#[async_trait]
impl OrderingApi for HttpOrderingApi {
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>, ApiError> {
        decode(self.client.get(self.url("/menu")).send().await).await
    }

    async fn fetch_settings(&self) -> Result<RestaurantSettings, ApiError> {
        decode(self.client.get(self.url("/settings")).send().await).await
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        let response = self
            .client
            .post(self.url("/orders"))
            .json(request)
            .send()
            .await;
        decode(response).await
    }

    async fn track_order(&self, token: &str) -> Result<Order, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/orders/track/{token}")))
            .send()
            .await;
        decode(response).await
    }

    async fn get_order(&self, id: i64) -> Result<Order, ApiError> {
        decode(self.client.get(self.url(&format!("/orders/{id}"))).send().await).await
    }

    async fn list_active_orders(&self) -> Result<Vec<Order>, ApiError> {
        decode(self.client.get(self.url("/orders")).send().await).await
    }

    async fn advance_order(&self, id: i64) -> Result<Order, ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/orders/{id}/advance")))
            .send()
            .await;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = HttpOrderingApi::new("http://localhost:8080/").expect("client builds");
        assert_eq!(api.url("/menu"), "http://localhost:8080/menu");
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let api = HttpOrderingApi::new("http://127.0.0.1:9").expect("client builds");
        let result = api.fetch_settings().await;
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }
}
