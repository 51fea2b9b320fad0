use crate::models::{
    Document, Entry, Favorite, FavoriteRequest, SaveEntryRequest, Section, Template,
};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

pub(crate) const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        // Deployments inject `window.ENV = { API_URL: "..." }` before the wasm loads.
        // `api_url` is accepted too.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    for key in ["API_URL", "api_url"] {
                        if let Ok(api_url) = js_sys::Reflect::get(&env, &key.into()) {
                            if let Some(url_str) = api_url.as_string() {
                                return Self::with_api_url(&url_str);
                            }
                        }
                    }
                }
            }
        }

        Self::with_api_url(DEFAULT_API_URL)
    }

    pub fn with_api_url(api_url: &str) -> Self {
        let trimmed = api_url.trim().trim_end_matches('/');
        let api_url = if trimmed.is_empty() {
            DEFAULT_API_URL
        } else {
            trimmed
        };
        Self {
            api_url: api_url.to_string(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the roadmap backend. Cheap to clone; every call builds its own request.
#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: EnvConfig::with_api_url(&base_url).api_url,
        }
    }

    pub fn from_env() -> Self {
        Self::new(EnvConfig::new().api_url)
    }

    pub(crate) fn templates_url(&self) -> String {
        format!("{}/templates/", self.base_url)
    }

    pub(crate) fn sections_url(&self, template_id: &str) -> String {
        format!(
            "{}/templates/{}/sections/",
            self.base_url,
            urlencoding::encode(template_id)
        )
    }

    pub(crate) fn entry_url(&self, section_id: &str) -> String {
        format!(
            "{}/sections/{}/entry",
            self.base_url,
            urlencoding::encode(section_id)
        )
    }

    pub(crate) fn favorite_url(&self, entry_id: &str) -> String {
        format!(
            "{}/entries/{}/favorite",
            self.base_url,
            urlencoding::encode(entry_id)
        )
    }

    pub(crate) fn favorites_url(&self) -> String {
        format!("{}/entries/favorites/", self.base_url)
    }

    async fn send(
        &self,
        method: reqwest::Method,
        url: String,
        body: Option<&impl Serialize>,
    ) -> ApiResult<reqwest::Response> {
        let client = reqwest::Client::new();
        let mut req = client.request(method, url);

        if let Some(b) = body {
            req = req.json(b);
        }

        req.send().await.map_err(ApiError::network)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        res: reqwest::Response,
        ctx: &str,
    ) -> ApiResult<T> {
        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, ctx))
        }
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: String,
        body: Option<&impl Serialize>,
        ctx: &str,
    ) -> ApiResult<T> {
        let res = self.send(method, url, body).await?;
        Self::decode(res, ctx).await
    }

    pub async fn list_templates(&self) -> ApiResult<Vec<Template>> {
        self.request(
            reqwest::Method::GET,
            self.templates_url(),
            None::<&()>,
            "List templates failed",
        )
        .await
    }

    pub async fn list_sections(&self, template_id: &str) -> ApiResult<Vec<Section>> {
        self.request(
            reqwest::Method::GET,
            self.sections_url(template_id),
            None::<&()>,
            "List sections failed",
        )
        .await
    }

    /// `Ok(None)` when the section has no entry yet (backend answers 404).
    pub async fn get_entry(&self, section_id: &str) -> ApiResult<Option<Entry>> {
        let res = self
            .send(reqwest::Method::GET, self.entry_url(section_id), None::<&()>)
            .await?;

        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Self::decode(res, "Get entry failed").await.map(Some)
    }

    pub async fn save_entry(&self, section_id: &str, content: Document) -> ApiResult<Entry> {
        self.request(
            reqwest::Method::PUT,
            self.entry_url(section_id),
            Some(&SaveEntryRequest { content }),
            "Save entry failed",
        )
        .await
    }

    pub async fn set_favorite(&self, entry_id: &str, is_favorite: bool) -> ApiResult<Entry> {
        self.request(
            reqwest::Method::PATCH,
            self.favorite_url(entry_id),
            Some(&FavoriteRequest { is_favorite }),
            "Update favorite failed",
        )
        .await
    }

    pub async fn list_favorites(&self) -> ApiResult<Vec<Favorite>> {
        self.request(
            reqwest::Method::GET,
            self.favorites_url(),
            None::<&()>,
            "List favorites failed",
        )
        .await
    }
}
