//! HTTP content client.
//!
//! This module maps content client operations onto the management REST API.
//! The raw HTTP client is abstracted via a trait so any HTTP library (or an
//! in-process fake) can carry the requests.

use crate::config::ContentfulConfig;
use contentsync_core::{ClientError, ClientResult, ContentClient};
use contentsync_model::wire::{self, WireCollection, WireEnvironment, WireFieldsBody};
use contentsync_model::{Asset, Entry, Fields, ItemKind, NodeKey};
use std::time::Duration;
use tracing::debug;

const CONTENT_TYPE: &str = "application/vnd.contentful.management.v1+json";
const VERSION_HEADER: &str = "X-Contentful-Version";
const CONTENT_TYPE_HEADER: &str = "X-Contentful-Content-Type";

/// Request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `PUT`
    Put,
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Absolute URL.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Option<Vec<u8>>,
    /// Limit for the whole exchange; `None` leaves it to the client.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    fn new(method: HttpMethod, url: String) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    fn header(mut self, name: &str, value: impl ToString) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Looks up a header value by name, ignoring case.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual transport. Errors are
/// connection-level failures, including an exceeded
/// [`HttpRequest::timeout`]; any response, whatever its status, is `Ok`.
pub trait HttpClient: Send + Sync {
    /// Sends one request.
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, String>;
}

/// Content client backed by the management REST API.
///
/// Reads come from the source environment and writes go to the target
/// environment of the configured space.
pub struct ContentfulClient<H: HttpClient> {
    config: ContentfulConfig,
    http: H,
}

impl<H: HttpClient> ContentfulClient<H> {
    /// Creates a new client.
    pub fn new(config: ContentfulConfig, http: H) -> Self {
        Self { config, http }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ContentfulConfig {
        &self.config
    }

    /// Lists the environments of the space.
    ///
    /// Useful as a connection check before resolving anything.
    pub fn list_environments(&self) -> ClientResult<Vec<WireEnvironment>> {
        self.check_space()?;
        let url = format!("{}/environments", self.config.space_url());
        let response = self.send(HttpRequest::new(HttpMethod::Get, url))?;
        let response = expect_success(response)?;
        let collection: WireCollection<WireEnvironment> = serde_json::from_slice(&response.body)
            .map_err(|e| ClientError::Decode {
                message: e.to_string(),
            })?;
        Ok(collection.items)
    }

    fn check_space(&self) -> ClientResult<()> {
        if self.config.space_id.is_empty() {
            return Err(ClientError::NotConfigured {
                what: "space_id".into(),
            });
        }
        if self.config.access_token.is_empty() {
            return Err(ClientError::NotConfigured {
                what: "access_token".into(),
            });
        }
        path_segment(&self.config.space_id)?;
        Ok(())
    }

    fn item_url(&self, environment: &str, kind: ItemKind, id: &str) -> ClientResult<String> {
        let collection = match kind {
            ItemKind::Entry => "entries",
            ItemKind::Asset => "assets",
        };
        Ok(format!(
            "{}/{collection}/{}",
            self.config.environment_url(path_segment(environment)?),
            path_segment(id)?
        ))
    }

    fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let mut request = request
            .header("Authorization", format!("Bearer {}", self.config.access_token))
            .header("Content-Type", CONTENT_TYPE);
        request.timeout = Some(self.config.timeout);
        debug!(method = ?request.method, url = %request.url, "sending request");
        self.http.send(request).map_err(ClientError::request)
    }

    /// Reads an item from the source environment.
    fn fetch(&self, key: &NodeKey) -> ClientResult<HttpResponse> {
        self.check_space()?;
        let url = self.item_url(&self.config.source_environment, key.kind, &key.id)?;
        let response = self.send(HttpRequest::new(HttpMethod::Get, url))?;
        if response.status == 404 {
            return Err(ClientError::NotFound { key: key.clone() });
        }
        expect_success(response)
    }

    fn target_environment(&self) -> ClientResult<&str> {
        self.check_space()?;
        if self.config.target_environment.is_empty() {
            return Err(ClientError::NotConfigured {
                what: "target_environment".into(),
            });
        }
        Ok(&self.config.target_environment)
    }

    /// Current version of an item in the target environment, if it exists.
    fn target_version(&self, key: &NodeKey) -> ClientResult<Option<u64>> {
        let url = self.item_url(self.target_environment()?, key.kind, &key.id)?;
        let response = self.send(HttpRequest::new(HttpMethod::Get, url))?;
        if response.status == 404 {
            return Ok(None);
        }
        let response = expect_success(response)?;
        Ok(wire::decode_sys(&response.body)?.version)
    }

    /// Creates or updates an item in the target environment and returns the
    /// version the backend assigned.
    fn upsert(
        &self,
        key: &NodeKey,
        fields: &Fields,
        content_type: Option<&str>,
    ) -> ClientResult<Option<u64>> {
        let existing = self.target_version(key)?;
        let url = self.item_url(self.target_environment()?, key.kind, &key.id)?;
        let body = serde_json::to_vec(&WireFieldsBody { fields }).map_err(|e| {
            ClientError::Decode {
                message: e.to_string(),
            }
        })?;

        let mut request = HttpRequest::new(HttpMethod::Put, url).body(body);
        match (existing, content_type) {
            (Some(version), _) => request = request.header(VERSION_HEADER, version),
            (None, Some(content_type)) => request = request.header(CONTENT_TYPE_HEADER, content_type),
            (None, None) => {}
        }

        debug!(%key, update = existing.is_some(), "writing item");
        let response = expect_success(self.send(request)?)?;
        Ok(wire::decode_sys(&response.body).ok().and_then(|sys| sys.version))
    }
}

/// Accepts values the backend allows in a path segment: ASCII letters,
/// digits, `.`, `_` and `-`.
fn path_segment(value: &str) -> ClientResult<&str> {
    let valid = !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));
    if valid {
        Ok(value)
    } else {
        Err(ClientError::InvalidPath {
            segment: value.to_string(),
        })
    }
}

fn expect_success(response: HttpResponse) -> ClientResult<HttpResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Rejected {
            status: response.status,
            message: String::from_utf8_lossy(&response.body).into_owned(),
        })
    }
}

impl<H: HttpClient> ContentClient for ContentfulClient<H> {
    fn fetch_entry(&self, id: &str) -> ClientResult<Entry> {
        let response = self.fetch(&NodeKey::entry(id))?;
        Ok(wire::decode_entry(&response.body)?)
    }

    fn fetch_asset(&self, id: &str) -> ClientResult<Asset> {
        let response = self.fetch(&NodeKey::asset(id))?;
        Ok(wire::decode_asset(&response.body)?)
    }

    fn write_entry(&self, entry: &Entry) -> ClientResult<()> {
        self.upsert(&entry.key(), &entry.fields, Some(&entry.content_type))?;
        Ok(())
    }

    fn write_asset(&self, asset: &Asset) -> ClientResult<()> {
        let key = asset.key();
        let version = self.upsert(&key, &asset.fields, None)?;

        for locale in asset.file_locales() {
            let url = format!(
                "{}/files/{}/process",
                self.item_url(self.target_environment()?, ItemKind::Asset, &asset.id)?,
                path_segment(locale)?
            );
            let mut request = HttpRequest::new(HttpMethod::Put, url);
            if let Some(version) = version {
                request = request.header(VERSION_HEADER, version);
            }
            debug!(%key, locale, "processing asset file");
            expect_success(self.send(request)?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Answers requests from a route table; unknown routes get a 404.
    #[derive(Default)]
    struct TestClient {
        routes: Mutex<HashMap<(HttpMethod, String), HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
        offline: bool,
    }

    impl TestClient {
        fn route(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
            self.routes
                .lock()
                .insert((method, url.to_string()), HttpResponse::new(status, body));
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().clone()
        }
    }

    impl HttpClient for &TestClient {
        fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
            if self.offline {
                return Err("connection refused".into());
            }
            let response = self
                .routes
                .lock()
                .get(&(request.method, request.url.clone()))
                .cloned()
                .unwrap_or_else(|| HttpResponse::new(404, "{}"));
            self.requests.lock().push(request);
            Ok(response)
        }
    }

    const BASE: &str = "https://api.test/spaces/space1/environments";

    fn config() -> ContentfulConfig {
        ContentfulConfig::new("space1", "secret")
            .with_base_url("https://api.test")
            .with_source_environment("master")
            .with_target_environment("staging")
    }

    #[test]
    fn fetch_entry_decodes_wire_shape() {
        let http = TestClient::default();
        http.route(
            HttpMethod::Get,
            &format!("{BASE}/master/entries/e1"),
            200,
            r#"{"sys": {"id": "e1", "contentType": {"sys": {"id": "page"}}},
                "fields": {"title": {"en-US": "Home"}}}"#,
        );
        let client = ContentfulClient::new(config(), &http);

        let entry = client.fetch_entry("e1").unwrap();
        assert_eq!(entry.content_type, "page");
        assert_eq!(entry.title("en-US"), "Home");

        let sent = http.requests();
        assert_eq!(sent[0].header_value("authorization"), Some("Bearer secret"));
    }

    #[test]
    fn requests_carry_the_configured_timeout() {
        let http = TestClient::default();
        let client = ContentfulClient::new(config().with_timeout(Duration::from_secs(5)), &http);

        let _ = client.fetch_entry("e1");
        let _ = client.list_environments();

        let sent = http.requests();
        assert_eq!(sent.len(), 2);
        assert!(sent
            .iter()
            .all(|r| r.timeout == Some(Duration::from_secs(5))));
    }

    #[test]
    fn unsafe_identifiers_never_reach_the_transport() {
        let http = TestClient::default();
        let client = ContentfulClient::new(config(), &http);

        for id in ["a/b", "e1?x=1", "../assets", "", "e 1"] {
            assert_eq!(
                client.fetch_entry(id).unwrap_err(),
                ClientError::InvalidPath {
                    segment: id.to_string()
                }
            );
        }
        assert!(matches!(
            client.write_entry(&Entry::new("a/b", "page")),
            Err(ClientError::InvalidPath { .. })
        ));
        assert!(http.requests().is_empty());

        // Backend-style ids pass.
        let _ = client.fetch_entry("5KsDBWseXY6QegucYAoacS.v2_x-1");
        assert_eq!(http.requests().len(), 1);
    }

    #[test]
    fn asset_file_locales_are_checked() {
        let http = TestClient::default();
        let url = format!("{BASE}/staging/assets/a1");
        http.route(HttpMethod::Put, &url, 201, r#"{"sys": {"id": "a1", "version": 1}}"#);
        let client = ContentfulClient::new(config(), &http);

        let mut files = Fields::new();
        files.insert("en/../x", Fields::new());
        let err = client
            .write_asset(&Asset::new("a1").with_field("file", files))
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidPath { .. }));
        assert_eq!(http.requests().len(), 2);
    }

    #[test]
    fn missing_item_is_not_found() {
        let http = TestClient::default();
        let client = ContentfulClient::new(config(), &http);

        let err = client.fetch_asset("nope").unwrap_err();
        assert_eq!(
            err,
            ClientError::NotFound {
                key: NodeKey::asset("nope")
            }
        );
    }

    #[test]
    fn server_errors_are_rejections() {
        let http = TestClient::default();
        http.route(HttpMethod::Get, &format!("{BASE}/master/entries/e1"), 500, "boom");
        let client = ContentfulClient::new(config(), &http);

        assert!(matches!(
            client.fetch_entry("e1"),
            Err(ClientError::Rejected { status: 500, .. })
        ));
    }

    #[test]
    fn transport_failure_is_a_request_error() {
        let http = TestClient {
            offline: true,
            ..TestClient::default()
        };
        let client = ContentfulClient::new(config(), &http);

        assert!(matches!(
            client.fetch_entry("e1"),
            Err(ClientError::Request { .. })
        ));
    }

    #[test]
    fn creates_entry_with_content_type_header() {
        let http = TestClient::default();
        http.route(
            HttpMethod::Put,
            &format!("{BASE}/staging/entries/e1"),
            201,
            r#"{"sys": {"id": "e1", "version": 1}}"#,
        );
        let client = ContentfulClient::new(config(), &http);

        client.write_entry(&Entry::new("e1", "page")).unwrap();

        let sent = http.requests();
        let put = &sent[1];
        assert_eq!(put.method, HttpMethod::Put);
        assert_eq!(put.header_value(CONTENT_TYPE_HEADER), Some("page"));
        assert_eq!(put.header_value(VERSION_HEADER), None);
        assert_eq!(put.body.as_deref(), Some(br#"{"fields":{}}"#.as_slice()));
    }

    #[test]
    fn updates_entry_with_current_version() {
        let http = TestClient::default();
        let url = format!("{BASE}/staging/entries/e1");
        http.route(HttpMethod::Get, &url, 200, r#"{"sys": {"id": "e1", "version": 4}}"#);
        http.route(HttpMethod::Put, &url, 200, r#"{"sys": {"id": "e1", "version": 5}}"#);
        let client = ContentfulClient::new(config(), &http);

        client.write_entry(&Entry::new("e1", "page")).unwrap();

        let sent = http.requests();
        let put = &sent[1];
        assert_eq!(put.header_value(VERSION_HEADER), Some("4"));
        assert_eq!(put.header_value(CONTENT_TYPE_HEADER), None);
    }

    #[test]
    fn asset_write_processes_each_file_locale() {
        let http = TestClient::default();
        let url = format!("{BASE}/staging/assets/a1");
        http.route(HttpMethod::Put, &url, 201, r#"{"sys": {"id": "a1", "version": 1}}"#);
        http.route(HttpMethod::Put, &format!("{url}/files/en-US/process"), 204, "");
        http.route(HttpMethod::Put, &format!("{url}/files/de-DE/process"), 204, "");
        let client = ContentfulClient::new(config(), &http);

        let mut files = Fields::new();
        files.insert("en-US", Fields::new());
        files.insert("de-DE", Fields::new());
        client
            .write_asset(&Asset::new("a1").with_field("file", files))
            .unwrap();

        let sent = http.requests();
        assert_eq!(sent.len(), 4);
        assert!(sent[2].url.ends_with("/files/en-US/process"));
        assert_eq!(sent[2].header_value(VERSION_HEADER), Some("1"));
        assert!(sent[3].url.ends_with("/files/de-DE/process"));
    }

    #[test]
    fn writes_need_a_target_environment() {
        let http = TestClient::default();
        let client = ContentfulClient::new(config().with_target_environment(""), &http);

        let err = client.write_entry(&Entry::new("e1", "page")).unwrap_err();
        assert_eq!(
            err,
            ClientError::NotConfigured {
                what: "target_environment".into()
            }
        );
        assert!(http.requests().is_empty());
    }

    #[test]
    fn lists_environments() {
        let http = TestClient::default();
        http.route(
            HttpMethod::Get,
            BASE,
            200,
            r#"{"items": [{"sys": {"id": "master"}, "name": "master"},
                          {"sys": {"id": "staging"}, "name": "Staging"}], "total": 2}"#,
        );
        let client = ContentfulClient::new(config(), &http);

        let environments = client.list_environments().unwrap();
        let names: Vec<_> = environments.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["master", "Staging"]);
    }

    #[test]
    fn unconfigured_space_is_reported() {
        let http = TestClient::default();
        let client = ContentfulClient::new(ContentfulConfig::default(), &http);

        assert!(matches!(
            client.list_environments(),
            Err(ClientError::NotConfigured { .. })
        ));
    }
}
