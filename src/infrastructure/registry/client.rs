// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::{ImageReference, ImageRegistry};
use crate::domain::config::RegistrySettings;
use crate::infrastructure::constants::{
    MEDIA_TYPE_DOCKER_LIST, MEDIA_TYPE_DOCKER_MANIFEST, MEDIA_TYPE_OCI_INDEX,
    MEDIA_TYPE_OCI_MANIFEST,
};
use crate::shared::error::{MaintenanceError, Result};
use backon::{ExponentialBuilder, Retryable};
use regex::Regex;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, trace, warn};

const USER_AGENT: &str = concat!("pgext-maint/", env!("CARGO_PKG_VERSION"));
const TAGS_PAGE_SIZE: usize = 1000;
const DIGEST_HEADER: &str = "docker-content-digest";

#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: String,
}

/// Docker Registry v2 client
pub struct RegistryClient {
    client: reqwest::Client,
    insecure: bool,
    retries: usize,
    credentials: Option<Credentials>,
    /// Bearer tokens keyed by `<host> <scope>`
    tokens: RwLock<HashMap<String, String>>,
}

struct Manifest {
    media_type: String,
    digest: Option<String>,
    body: Vec<u8>,
}

enum SendError {
    Transport(reqwest::Error),
    Transient(Response),
}

impl SendError {
    fn is_retryable(&self) -> bool {
        match self {
            SendError::Transport(e) => e.is_connect() || e.is_timeout(),
            SendError::Transient(_) => true,
        }
    }
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Transport(e) => write!(f, "{}", e),
            SendError::Transient(response) => {
                write!(f, "{} answered {}", response.url(), response.status())
            }
        }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

impl RegistryClient {
    pub fn new(settings: &RegistrySettings, password: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;

        // Credentials are only used when both halves are known
        let credentials = match (settings.username.clone(), password) {
            (Some(username), Some(password)) if !password.is_empty() => Some(Credentials {
                username,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            client,
            insecure: settings.insecure,
            retries: settings.retries,
            credentials,
            tokens: RwLock::new(HashMap::new()),
        })
    }

    fn base_url(&self, image: &ImageReference) -> String {
        let scheme = if self.insecure { "http" } else { "https" };
        format!("{}://{}", scheme, image.api_host())
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_times(self.retries)
    }

    /// Send a request, retrying connection failures, timeouts, 5xx and 429 answers.
    ///
    /// When retries are exhausted on a transient status the last response is
    /// returned so callers report the registry's answer.
    async fn send_with_retry<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let build = &build;
        let result = (|| async move {
            let response = build().send().await.map_err(SendError::Transport)?;
            if is_transient_status(response.status()) {
                return Err(SendError::Transient(response));
            }
            Ok(response)
        })
        .retry(&self.backoff())
        .when(SendError::is_retryable)
        .notify(|e: &SendError, delay: Duration| {
            warn!("Registry request failed, retrying in {:?}: {}", delay, e);
        })
        .await;

        match result {
            Ok(response) => Ok(response),
            Err(SendError::Transient(response)) => {
                debug!("Registry still answering {}", response.status());
                Ok(response)
            }
            Err(SendError::Transport(e)) => Err(e.into()),
        }
    }

    /// Send a GET/HEAD, answering a 401 challenge once.
    async fn send_authorized(
        &self,
        image: &ImageReference,
        method: reqwest::Method,
        url: &str,
        accept: Option<&str>,
    ) -> Result<Response> {
        let scope = format!("repository:{}:pull", image.repository);
        let token_key = format!("{} {}", image.api_host(), scope);

        let cached = self
            .tokens
            .read()
            .map_err(|_| MaintenanceError::RegistryError("token cache poisoned".to_string()))?
            .get(&token_key)
            .cloned();

        let request = |auth: Option<&HeaderValue>| {
            let mut builder = self.client.request(method.clone(), url);
            if let Some(accept) = accept {
                builder = builder.header(ACCEPT, accept);
            }
            if let Some(auth) = auth {
                builder = builder.header(AUTHORIZATION, auth.clone());
            }
            builder
        };

        let auth = cached
            .map(|token| bearer_header(&token))
            .transpose()?;
        let response = self.send_with_retry(|| request(auth.as_ref())).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let challenge = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|h| h.to_str().ok())
            .map(Challenge::parse)
            .ok_or_else(|| {
                MaintenanceError::RegistryError(format!(
                    "{} answered 401 without an authentication challenge",
                    url
                ))
            })?;

        let auth = match challenge.scheme.to_ascii_lowercase().as_str() {
            "bearer" => {
                let token = self.fetch_token(&challenge, &scope).await?;
                self.tokens
                    .write()
                    .map_err(|_| {
                        MaintenanceError::RegistryError("token cache poisoned".to_string())
                    })?
                    .insert(token_key, token.clone());
                bearer_header(&token)?
            }
            "basic" => {
                let credentials = self.credentials.as_ref().ok_or_else(|| {
                    MaintenanceError::RegistryError(format!(
                        "{} requires credentials, set --registry-username and REGISTRY_PASSWORD",
                        url
                    ))
                })?;
                self.client
                    .get(url)
                    .basic_auth(&credentials.username, Some(&credentials.password))
                    .build()?
                    .headers()
                    .get(AUTHORIZATION)
                    .cloned()
                    .ok_or_else(|| {
                        MaintenanceError::RegistryError("cannot encode basic auth".to_string())
                    })?
            }
            other => {
                return Err(MaintenanceError::RegistryError(format!(
                    "unsupported authentication scheme '{}' for {}",
                    other, url
                )))
            }
        };

        self.send_with_retry(|| request(Some(&auth))).await
    }

    async fn fetch_token(&self, challenge: &Challenge, default_scope: &str) -> Result<String> {
        let realm = challenge.params.get("realm").ok_or_else(|| {
            MaintenanceError::RegistryError("bearer challenge without realm".to_string())
        })?;

        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(service) = challenge.params.get("service") {
            query.push(("service", service.as_str()));
        }
        query.push((
            "scope",
            challenge
                .params
                .get("scope")
                .map(|s| s.as_str())
                .unwrap_or(default_scope),
        ));

        debug!("Requesting registry token from {}", realm);

        let response = self
            .send_with_retry(|| {
                let builder = self.client.get(realm.as_str()).query(&query);
                match &self.credentials {
                    Some(c) => builder.basic_auth(&c.username, Some(&c.password)),
                    None => builder,
                }
            })
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MaintenanceError::RegistryError(format!(
                "token request to {} failed ({}): {}",
                realm, status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        token
            .token
            .or(token.access_token)
            .ok_or_else(|| MaintenanceError::RegistryError("empty token response".to_string()))
    }

    async fn get_manifest(&self, image: &ImageReference) -> Result<Manifest> {
        let url = format!(
            "{}/v2/{}/manifests/{}",
            self.base_url(image),
            image.repository,
            image.reference()
        );
        let accept = [
            MEDIA_TYPE_OCI_INDEX,
            MEDIA_TYPE_OCI_MANIFEST,
            MEDIA_TYPE_DOCKER_LIST,
            MEDIA_TYPE_DOCKER_MANIFEST,
        ]
        .join(",");

        debug!("Fetching manifest from: {}", url);
        let response = self
            .send_authorized(image, reqwest::Method::GET, &url, Some(&accept))
            .await?;
        let response = ensure_success(response, &url).await?;

        let header_media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());
        let digest = response
            .headers()
            .get(DIGEST_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(|v| v.to_string());
        let body = response.bytes().await?.to_vec();

        let media_type = match header_media_type {
            Some(media_type) if media_type != "application/json" => media_type,
            _ => serde_json::from_slice::<ManifestDocument>(&body)?
                .media_type
                .unwrap_or_default(),
        };

        Ok(Manifest {
            media_type,
            digest,
            body,
        })
    }
}

#[async_trait::async_trait]
impl ImageRegistry for RegistryClient {
    async fn list_tags(&self, image: &str) -> Result<Vec<String>> {
        let image = ImageReference::parse(image)?;
        let base = self.base_url(&image);
        let mut url = format!(
            "{}/v2/{}/tags/list?n={}",
            base, image.repository, TAGS_PAGE_SIZE
        );
        let mut all_tags = Vec::new();

        loop {
            debug!("Listing tags from: {}", url);
            let response = self
                .send_authorized(&image, reqwest::Method::GET, &url, None)
                .await?;
            let response = ensure_success(response, &url).await?;

            let next_url = response
                .headers()
                .get("link")
                .and_then(|h| h.to_str().ok())
                .and_then(|link| parse_link_header(link, &base));

            let page: TagsResponse = response.json().await?;
            all_tags.extend(page.tags.unwrap_or_default());

            match next_url {
                Some(next) => url = next,
                None => break,
            }
        }

        trace!("Found {} tags for {}", all_tags.len(), image);
        Ok(all_tags)
    }

    async fn annotations(&self, image: &str) -> Result<BTreeMap<String, String>> {
        let image = ImageReference::parse(image)?;
        let manifest = self.get_manifest(&image).await?;

        match manifest.media_type.as_str() {
            MEDIA_TYPE_OCI_INDEX | MEDIA_TYPE_OCI_MANIFEST => {
                let document: ManifestDocument = serde_json::from_slice(&manifest.body)?;
                Ok(document.annotations.unwrap_or_default())
            }
            other => Err(MaintenanceError::RegistryError(format!(
                "unsupported media type: {}",
                other
            ))),
        }
    }

    async fn digest(&self, image: &str) -> Result<String> {
        let image = ImageReference::parse(image)?;
        let manifest = self.get_manifest(&image).await?;
        Ok(match manifest.digest {
            Some(digest) => digest,
            None => {
                debug!("No {} header for {}, hashing the manifest", DIGEST_HEADER, image);
                manifest_digest(&manifest.body)
            }
        })
    }
}

async fn ensure_success(response: Response, url: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(MaintenanceError::RegistryError(format!(
        "registry returned {} for {}: {}",
        status,
        url,
        if body.is_empty() {
            "(no response body)".to_string()
        } else {
            body
        }
    )))
}

/// Content digest of a manifest as the registry would compute it.
fn manifest_digest(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    format!("sha256:{:x}", hasher.finalize())
}

fn bearer_header(token: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| MaintenanceError::RegistryError(format!("invalid registry token: {}", e)))
}

/// Parse a pagination `Link` header:
/// `</v2/repo/tags/list?n=100&last=tag>; rel="next"`
fn parse_link_header(link: &str, base_url: &str) -> Option<String> {
    for part in link.split(',') {
        let part = part.trim();
        if !part.contains("rel=\"next\"") {
            continue;
        }
        let (Some(start), Some(end)) = (part.find('<'), part.find('>')) else {
            continue;
        };
        if end <= start {
            continue;
        }
        let url = &part[start + 1..end];
        if url.starts_with('/') {
            return Some(format!("{}{}", base_url, url));
        }
        return Some(url.to_string());
    }
    None
}

/// `WWW-Authenticate` challenge
#[derive(Debug, Clone, PartialEq)]
struct Challenge {
    scheme: String,
    params: HashMap<String, String>,
}

impl Challenge {
    fn parse(header: &str) -> Self {
        let header = header.trim();
        let (scheme, rest) = header.split_once(' ').unwrap_or((header, ""));

        let mut params = HashMap::new();
        if let Ok(re) = Regex::new(r#"(\w+)="([^"]*)""#) {
            for caps in re.captures_iter(rest) {
                params.insert(caps[1].to_string(), caps[2].to_string());
            }
        }

        Self {
            scheme: scheme.to_string(),
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ManifestDocument {
    #[serde(rename = "mediaType", default)]
    media_type: Option<String>,
    #[serde(default)]
    annotations: Option<BTreeMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Request line and headers seen by the local registry.
    struct LocalRequest {
        path: String,
        host: String,
        authorization: Option<String>,
    }

    impl LocalRequest {
        fn parse(raw: &str) -> Self {
            let mut lines = raw.lines();
            let path = lines
                .next()
                .and_then(|line| line.split_whitespace().nth(1))
                .unwrap_or_default()
                .to_string();
            let mut host = String::new();
            let mut authorization = None;
            for line in lines {
                if let Some((name, value)) = line.split_once(':') {
                    match name.trim().to_ascii_lowercase().as_str() {
                        "host" => host = value.trim().to_string(),
                        "authorization" => authorization = Some(value.trim().to_string()),
                        _ => {}
                    }
                }
            }
            Self {
                path,
                host,
                authorization,
            }
        }
    }

    fn reply(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut response = format!("HTTP/1.1 {}\r\n", status);
        for (name, value) in headers {
            response.push_str(&format!("{}: {}\r\n", name, value));
        }
        response.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ));
        response
    }

    /// Serve `handler` on a random local port, one request per connection.
    async fn local_registry<H>(handler: H) -> String
    where
        H: Fn(&LocalRequest) -> String + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handler = Arc::new(handler);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let handler = handler.clone();
                tokio::spawn(async move {
                    let mut raw = Vec::new();
                    let mut chunk = [0u8; 1024];
                    loop {
                        let n = socket.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        raw.extend_from_slice(&chunk[..n]);
                        if raw.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    let request = LocalRequest::parse(&String::from_utf8_lossy(&raw));
                    let _ = socket.write_all(handler(&request).as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("127.0.0.1:{}", addr.port())
    }

    fn local_client() -> RegistryClient {
        let settings = RegistrySettings {
            insecure: true,
            retries: 2,
            ..Default::default()
        };
        RegistryClient::new(&settings, None).unwrap()
    }

    #[tokio::test]
    async fn test_bearer_challenge_and_token_cache() {
        let token_requests = Arc::new(AtomicUsize::new(0));
        let counter = token_requests.clone();
        let host = local_registry(move |req| {
            if req.path.starts_with("/token") {
                counter.fetch_add(1, Ordering::SeqCst);
                assert!(req.path.contains("service=local"));
                assert!(req.path.contains("scope=repository%3Acnpg%2Fpgvector%3Apull"));
                return reply("200 OK", &[("Content-Type", "application/json")], r#"{"token":"tok"}"#);
            }
            if req.authorization.as_deref() != Some("Bearer tok") {
                let challenge = format!(
                    r#"Bearer realm="http://{}/token",service="local""#,
                    req.host
                );
                return reply("401 Unauthorized", &[("WWW-Authenticate", challenge.as_str())], "");
            }
            reply("200 OK", &[("Content-Type", "application/json")], r#"{"tags":["0.8.1"]}"#)
        })
        .await;

        let client = local_client();
        let image = format!("{}/cnpg/pgvector", host);
        assert_eq!(client.list_tags(&image).await.unwrap(), vec!["0.8.1"]);
        assert_eq!(client.list_tags(&image).await.unwrap(), vec!["0.8.1"]);
        assert_eq!(token_requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_tags_follows_link_pages() {
        let host = local_registry(|req| {
            if req.path.contains("last=b") {
                return reply("200 OK", &[("Content-Type", "application/json")], r#"{"tags":["c"]}"#);
            }
            reply(
                "200 OK",
                &[
                    ("Content-Type", "application/json"),
                    ("Link", r#"</v2/cnpg/pgvector/tags/list?n=1000&last=b>; rel="next""#),
                ],
                r#"{"tags":["a","b"]}"#,
            )
        })
        .await;

        let tags = local_client()
            .list_tags(&format!("{}/cnpg/pgvector", host))
            .await
            .unwrap();
        assert_eq!(tags, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_retries_unavailable_registry() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let host = local_registry(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                return reply("503 Service Unavailable", &[], "");
            }
            reply("200 OK", &[("Content-Type", "application/json")], r#"{"tags":["a"]}"#)
        })
        .await;

        let tags = local_client()
            .list_tags(&format!("{}/cnpg/x", host))
            .await
            .unwrap();
        assert_eq!(tags, vec!["a"]);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let host = local_registry(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            reply("429 Too Many Requests", &[], "slow down")
        })
        .await;

        let err = local_client()
            .list_tags(&format!("{}/cnpg/x", host))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("429"), "{}", err);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_annotations_and_digest() {
        let host = local_registry(|req| {
            if req.path.ends_with("/manifests/docker") {
                return reply(
                    "200 OK",
                    &[
                        ("Content-Type", MEDIA_TYPE_DOCKER_MANIFEST),
                        ("Docker-Content-Digest", "sha256:abc"),
                    ],
                    r#"{"schemaVersion":2}"#,
                );
            }
            reply(
                "200 OK",
                &[("Content-Type", MEDIA_TYPE_OCI_INDEX)],
                r#"{"schemaVersion":2,"annotations":{"org.opencontainers.image.version":"0.8.1"}}"#,
            )
        })
        .await;
        let client = local_client();

        let annotations = client
            .annotations(&format!("{}/cnpg/pgvector:oci", host))
            .await
            .unwrap();
        assert_eq!(annotations["org.opencontainers.image.version"], "0.8.1");

        let err = client
            .annotations(&format!("{}/cnpg/pgvector:docker", host))
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains(&format!("unsupported media type: {}", MEDIA_TYPE_DOCKER_MANIFEST)));

        assert_eq!(
            client
                .digest(&format!("{}/cnpg/pgvector:docker", host))
                .await
                .unwrap(),
            "sha256:abc"
        );
    }

    #[tokio::test]
    async fn test_digest_without_header_hashes_manifest() {
        let body = r#"{"schemaVersion":2,"mediaType":"application/vnd.oci.image.manifest.v1+json"}"#;
        let host = local_registry(move |_| {
            reply("200 OK", &[("Content-Type", MEDIA_TYPE_OCI_MANIFEST)], body)
        })
        .await;

        let digest = local_client()
            .digest(&format!("{}/cnpg/pgvector:1", host))
            .await
            .unwrap();
        assert_eq!(digest, manifest_digest(body.as_bytes()));
        assert!(digest.starts_with("sha256:"));
        assert_eq!(digest.len(), "sha256:".len() + 64);
    }

    #[test]
    fn test_manifest_digest() {
        assert_eq!(
            manifest_digest(b""),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_parse_bearer_challenge() {
        let challenge = Challenge::parse(
            r#"Bearer realm="https://ghcr.io/token",service="ghcr.io",scope="repository:cloudnative-pg/pgvector:pull""#,
        );
        assert_eq!(challenge.scheme, "Bearer");
        assert_eq!(challenge.params["realm"], "https://ghcr.io/token");
        assert_eq!(challenge.params["service"], "ghcr.io");
        assert_eq!(
            challenge.params["scope"],
            "repository:cloudnative-pg/pgvector:pull"
        );
    }

    #[test]
    fn test_parse_basic_challenge() {
        let challenge = Challenge::parse(r#"Basic realm="registry""#);
        assert_eq!(challenge.scheme, "Basic");
        assert_eq!(challenge.params["realm"], "registry");
    }

    #[test]
    fn test_parse_link_header() {
        let link = r#"</v2/cloudnative-pg/pgvector/tags/list?n=1000&last=0.8.0-18-trixie>; rel="next""#;
        assert_eq!(
            parse_link_header(link, "https://ghcr.io").as_deref(),
            Some("https://ghcr.io/v2/cloudnative-pg/pgvector/tags/list?n=1000&last=0.8.0-18-trixie")
        );
        assert!(parse_link_header(r#"<https://x/y>; rel="prev""#, "https://ghcr.io").is_none());
    }

    #[test]
    fn test_parse_link_header_skips_malformed_parts() {
        let link = r#"> broken <; rel="next", <https://ghcr.io/v2/x/tags/list?last=b>; rel="next""#;
        assert_eq!(
            parse_link_header(link, "https://ghcr.io").as_deref(),
            Some("https://ghcr.io/v2/x/tags/list?last=b")
        );
        assert!(parse_link_header(r#"rel="next""#, "https://ghcr.io").is_none());
    }

    #[test]
    fn test_credentials_need_password() {
        let settings = RegistrySettings {
            username: Some("bot".to_string()),
            ..Default::default()
        };
        let client = RegistryClient::new(&settings, None).unwrap();
        assert!(client.credentials.is_none());

        let client = RegistryClient::new(&settings, Some("secret".to_string())).unwrap();
        assert_eq!(client.credentials.unwrap().username, "bot");
    }

    #[test]
    fn test_insecure_base_url() {
        let settings = RegistrySettings {
            insecure: true,
            ..Default::default()
        };
        let client = RegistryClient::new(&settings, None).unwrap();
        let image = ImageReference::parse("localhost:5000/pgvector:1").unwrap();
        assert_eq!(client.base_url(&image), "http://localhost:5000");
    }
}
