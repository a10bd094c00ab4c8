use crate::core::{ConfigProvider, FacilityStore, MatchService};
use crate::domain::model::{
    Facility, FacilityCreate, FacilityMatchResponse, FacilityQuery, FacilityUpdate, MatchRequest,
};
use crate::utils::error::{CareMatchError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

const MATCH_FACILITY_PATH: &str = "/facility-matching/match-facility";
const FACILITIES_PATH: &str = "/facilities";

/// 配對 API 的 HTTP 用戶端
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));

        for (key, value) in config.extra_headers() {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                CareMatchError::InvalidConfigValueError {
                    field: "api.headers".to_string(),
                    value: key.clone(),
                    reason: format!("Invalid header name: {}", e),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                CareMatchError::InvalidConfigValueError {
                    field: format!("api.headers.{}", key),
                    value: value.clone(),
                    reason: format!("Invalid header value: {}", e),
                }
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        let base_url = format!(
            "{}{}",
            config.api_base_url().trim_end_matches('/'),
            config.api_prefix().trim_end_matches('/')
        );

        tracing::debug!("API client configured for {}", base_url);
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| CareMatchError::InvalidConfigValueError {
            field: "api.base_url".to_string(),
            value: raw,
            reason: format!("Invalid URL format: {}", e),
        })
    }

    /// `/facilities/{id}`，id 會做路徑編碼
    fn facility_endpoint(&self, id: &str) -> Result<Url> {
        let mut url = self.endpoint(FACILITIES_PATH)?;
        url.path_segments_mut()
            .map_err(|_| CareMatchError::config("API base URL cannot have path segments"))?
            .push(id);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {} ({})", status, response.url());

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!("Failed to read error response body: {}", e);
                    String::new()
                }
            };
            return Err(status_error(status, &body));
        }

        Ok(response.json::<T>().await?)
    }
}

/// 有 `detail` 時用它，否則退回狀態碼的標準說明
fn status_error(status: StatusCode, body: &str) -> CareMatchError {
    CareMatchError::RemoteStatusError {
        status: status.as_u16(),
        message: error_detail(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        }),
    }
}

/// FastAPI 的錯誤格式：`{"detail": "..."}` 或 `{"detail": [{"msg": "..."}]}`
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[async_trait]
impl MatchService for ApiClient {
    async fn match_facility(&self, request: &MatchRequest) -> Result<FacilityMatchResponse> {
        let url = self.endpoint(MATCH_FACILITY_PATH)?;
        tracing::debug!("Making API request to: POST {}", url);
        self.send_json(self.client.post(url).json(request)).await
    }
}

#[async_trait]
impl FacilityStore for ApiClient {
    async fn create_facility(&self, facility: &FacilityCreate) -> Result<Facility> {
        let url = self.endpoint(FACILITIES_PATH)?;
        tracing::debug!("Making API request to: POST {}", url);
        self.send_json(self.client.post(url).json(facility)).await
    }

    async fn list_facilities(&self, query: &FacilityQuery) -> Result<Vec<Facility>> {
        let url = self.endpoint(FACILITIES_PATH)?;
        tracing::debug!("Making API request to: GET {}", url);
        self.send_json(self.client.get(url).query(&query.to_query_pairs()))
            .await
    }

    async fn get_facility(&self, id: &str) -> Result<Facility> {
        let url = self.facility_endpoint(id)?;
        tracing::debug!("Making API request to: GET {}", url);
        self.send_json(self.client.get(url)).await
    }

    async fn update_facility(&self, id: &str, update: &FacilityUpdate) -> Result<Facility> {
        let url = self.facility_endpoint(id)?;
        tracing::debug!("Making API request to: PUT {}", url);
        self.send_json(self.client.put(url).json(update)).await
    }

    async fn delete_facility(&self, id: &str) -> Result<bool> {
        let url = self.facility_endpoint(id)?;
        tracing::debug!("Making API request to: DELETE {}", url);
        self.send_json(self.client.delete(url)).await
    }
}
