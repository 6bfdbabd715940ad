//! HTTP backend talking to a running Artifacter API server.
//!
//! The server exposes `GET /profile` (player profile as JSON) and
//! `GET /generate` (encoded card image). This backend is blocking; wrap it
//! in [`crate::Client`] for async callers.

use crate::{Character, Error, GenerateRequest, Lang, Result, Service, ServiceConfig, Uid};
use log::{debug, info, warn};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use url::Url;

/// Subset of the `/profile` payload the client cares about
#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(default)]
    from_cache: bool,
    characters: Vec<Character>,
}

struct Loaded {
    client: Client,
    base: Url,
}

/// Service backend that forwards every operation to the Artifacter HTTP API
pub struct HttpService {
    config: ServiceConfig,
    loaded: Option<Loaded>,
}

impl HttpService {
    /// Create an unloaded backend. Nothing is validated until `load`.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            loaded: None,
        }
    }

    fn loaded(&self) -> Result<&Loaded> {
        self.loaded.as_ref().ok_or(Error::NotLoaded)
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.config.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                Error::InitializationError(format!("Invalid header name {}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                Error::InitializationError(format!("Invalid header value for {}: {}", name, e))
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

impl Loaded {
    fn endpoint(&self, name: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Other(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    fn get(&self, name: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = self.endpoint(name)?;
        debug!("GET {} {:?}", url, query);
        self.client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| Error::NetworkError(format!("GET /{} failed: {}", name, e)))
    }
}

fn read_body(res: Response, name: &str) -> Result<(reqwest::StatusCode, HeaderMap, Vec<u8>)> {
    let status = res.status();
    let headers = res.headers().clone();
    let body = res
        .bytes()
        .map_err(|e| Error::NetworkError(format!("Failed to read /{} response body: {}", name, e)))?;
    Ok((status, headers, body.to_vec()))
}

fn describe_failure(name: &str, status: reqwest::StatusCode, body: &[u8]) -> String {
    format!(
        "/{} returned {}: {}",
        name,
        status,
        String::from_utf8_lossy(body).trim()
    )
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

impl Service for HttpService {
    fn load(&mut self) -> Result<()> {
        if self.loaded.is_some() {
            return Err(Error::AlreadyLoaded);
        }

        let base = Url::parse(&self.config.api_url).map_err(|e| {
            Error::InitializationError(format!("Invalid API URL {}: {}", self.config.api_url, e))
        })?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(Error::InitializationError(format!(
                "API URL must be an http(s) URL, got {}",
                base
            )));
        }

        // Generation can take a while on a cold cache; no timeout is applied.
        let client = Client::builder()
            .user_agent(self.config.user_agent.clone())
            .default_headers(self.default_headers()?)
            .timeout(None)
            .build()
            .map_err(|e| {
                Error::InitializationError(format!("Failed to build HTTP client: {}", e))
            })?;

        info!("Using Artifacter API at {}", base);
        self.loaded = Some(Loaded { client, base });
        Ok(())
    }

    fn get_characters(&mut self, uid: Uid) -> Result<Vec<Character>> {
        let loaded = self.loaded()?;
        let res = loaded.get(
            "profile",
            &[
                ("uid", uid.to_string()),
                ("lang", Lang::default().as_str().to_string()),
            ],
        )?;
        let (status, _, body) = read_body(res, "profile")?;
        if !status.is_success() {
            return Err(Error::LookupError(describe_failure("profile", status, &body)));
        }

        let profile: Profile = serde_json::from_slice(&body)
            .map_err(|e| Error::LookupError(format!("Invalid profile payload: {}", e)))?;
        debug!(
            "Profile for {}: {} characters (from cache: {})",
            uid,
            profile.characters.len(),
            profile.from_cache
        );
        Ok(profile.characters)
    }

    fn generate(&mut self, request: &GenerateRequest) -> Result<Vec<u8>> {
        let loaded = self.loaded()?;
        let res = loaded.get(
            "generate",
            &[
                ("uid", request.uid.to_string()),
                ("cid", request.character.to_string()),
                ("lang", request.lang.as_str().to_string()),
                ("image_format", request.format.as_str().to_string()),
                ("counter", request.counter.as_str().to_string()),
            ],
        )?;
        let (status, headers, body) = read_body(res, "generate")?;
        if !status.is_success() {
            return Err(Error::GenerateError(describe_failure("generate", status, &body)));
        }
        if body.is_empty() {
            return Err(Error::GenerateError("/generate returned an empty body".into()));
        }

        debug!(
            "Generated {} bytes (from cache: {}, counter: {})",
            body.len(),
            header_str(&headers, "X-From-Cache"),
            header_str(&headers, "X-Score-Counter")
        );
        let content_type = header_str(&headers, CONTENT_TYPE.as_str());
        if content_type != "-" && content_type != request.format.mime() {
            warn!(
                "Requested {} but server labelled the image {}",
                request.format.mime(),
                content_type
            );
        }
        Ok(body)
    }

    fn close(self) -> Result<()> {
        debug!("Closing HTTP backend");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CharacterId;
    use std::sync::{Arc, Mutex};

    const PROFILE: &str = r#"{"uid":827106332,"name":"Traveler","from_cache":true,
        "characters":[
            {"id":10000046,"name":"Hu Tao","level":90,"ascension":6,"element":"Fire","icon":""},
            {"id":10000002,"name":"Ayaka","level":80,"ascension":5,"element":"Ice","icon":""}
        ]}"#;

    type Recorded = Arc<Mutex<Vec<String>>>;

    /// Serve canned responses; records every request URL and the lowercase
    /// names of the headers each request carried.
    fn start_fake_api() -> (String, Recorded, Recorded) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let header_names = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let header_log = header_names.clone();

        std::thread::spawn(move || {
            for request in server.incoming_requests() {
                let url = request.url().to_string();
                log.lock().unwrap().push(url.clone());
                header_log.lock().unwrap().extend(
                    request
                        .headers()
                        .iter()
                        .map(|h| h.field.as_str().as_str().to_ascii_lowercase()),
                );
                let response = if url.starts_with("/profile?uid=1&") {
                    tiny_http::Response::from_string("Enkanetwork has invalid response")
                        .with_status_code(424)
                } else if url.starts_with("/profile?uid=2&") {
                    tiny_http::Response::from_string("<html>not json</html>")
                } else if url.starts_with("/profile") {
                    tiny_http::Response::from_string(PROFILE)
                } else if url.contains("cid=2&") {
                    tiny_http::Response::from_data(Vec::new())
                } else if url.contains("cid=1&") {
                    tiny_http::Response::from_string("Invalid character id").with_status_code(400)
                } else if url.starts_with("/generate") {
                    tiny_http::Response::from_data(b"\x89PNG\r\n\x1a\nfake".to_vec()).with_header(
                        "Content-Type: image/png".parse::<tiny_http::Header>().unwrap(),
                    )
                } else {
                    tiny_http::Response::from_string("Not Found").with_status_code(404)
                };
                let _ = request.respond(response);
            }
        });

        (format!("http://{}", addr), seen, header_names)
    }

    fn loaded_service(api_url: String) -> HttpService {
        let mut service = HttpService::new(ServiceConfig {
            api_url,
            ..Default::default()
        });
        service.load().expect("load");
        service
    }

    #[test]
    fn test_profile_characters_in_order() {
        let (url, seen, _) = start_fake_api();
        let mut service = loaded_service(url);

        let characters = service.get_characters(Uid(827106332)).unwrap();
        let ids: Vec<u32> = characters.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![10000046, 10000002]);
        assert_eq!(characters[0].name, "Hu Tao");
        assert_eq!(
            seen.lock().unwrap()[0],
            "/profile?uid=827106332&lang=ja"
        );
    }

    #[test]
    fn test_generate_sends_literal_parameters() {
        let (url, seen, _) = start_fake_api();
        let mut service = loaded_service(url);

        let bytes = service
            .generate(&GenerateRequest::new(Uid(827106332), CharacterId(10000046)))
            .unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(
            seen.lock().unwrap()[0],
            "/generate?uid=827106332&cid=10000046&lang=ja&image_format=png&counter=Normal"
        );
    }

    #[test]
    fn test_error_statuses_are_mapped() {
        let (url, _, _) = start_fake_api();
        let mut service = loaded_service(url);

        match service.get_characters(Uid(1)) {
            Err(Error::LookupError(msg)) => assert!(msg.contains("424"), "{}", msg),
            other => panic!("expected LookupError, got {:?}", other),
        }
        match service.generate(&GenerateRequest::new(Uid(827106332), CharacterId(1))) {
            Err(Error::GenerateError(msg)) => {
                assert!(msg.contains("400"), "{}", msg);
                assert!(msg.contains("Invalid character id"), "{}", msg);
            }
            other => panic!("expected GenerateError, got {:?}", other),
        }
    }

    #[test]
    fn test_undecodable_profile_is_a_lookup_error() {
        let (url, _, _) = start_fake_api();
        let mut service = loaded_service(url);

        match service.get_characters(Uid(2)) {
            Err(Error::LookupError(msg)) => {
                assert!(msg.starts_with("Invalid profile payload"), "{}", msg)
            }
            other => panic!("expected LookupError, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_image_is_a_generate_error() {
        let (url, _, _) = start_fake_api();
        let mut service = loaded_service(url);

        match service.generate(&GenerateRequest::new(Uid(827106332), CharacterId(2))) {
            Err(Error::GenerateError(msg)) => assert!(msg.contains("empty body"), "{}", msg),
            other => panic!("expected GenerateError, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_headers_are_sent() {
        let (api_url, _, header_names) = start_fake_api();
        let mut headers = std::collections::HashMap::new();
        headers.insert("X-Client-Tag".to_string(), "artifacter-tests".to_string());
        let mut service = HttpService::new(ServiceConfig {
            api_url,
            headers,
            ..Default::default()
        });
        service.load().unwrap();

        service.get_characters(Uid(827106332)).unwrap();
        let names = header_names.lock().unwrap().clone();
        assert!(names.iter().any(|n| n == "x-client-tag"), "{:?}", names);
        assert!(names.iter().any(|n| n == "user-agent"), "{:?}", names);
    }

    #[test]
    fn test_load_rejects_bad_header_names() {
        let mut headers = std::collections::HashMap::new();
        headers.insert("bad name".to_string(), "x".to_string());
        let mut service = HttpService::new(ServiceConfig {
            headers,
            ..Default::default()
        });
        match service.load() {
            Err(Error::InitializationError(msg)) => {
                assert!(msg.contains("Invalid header name"), "{}", msg)
            }
            other => panic!("expected InitializationError, got {:?}", other),
        }
    }

    #[test]
    fn test_base_path_is_preserved() {
        let (url, seen, _) = start_fake_api();
        let mut service = loaded_service(format!("{}/v1/", url));
        // The fake API only knows root paths, so this 404s; we only care about the path.
        assert!(service.get_characters(Uid(827106332)).is_err());
        assert!(seen.lock().unwrap()[0].starts_with("/v1/profile?"));
    }

    #[test]
    fn test_calls_before_load_fail() {
        let mut service = HttpService::new(ServiceConfig::default());
        assert!(matches!(
            service.get_characters(Uid(827106332)),
            Err(Error::NotLoaded)
        ));
        assert!(matches!(
            service.generate(&GenerateRequest::new(Uid(827106332), CharacterId(10000046))),
            Err(Error::NotLoaded)
        ));
    }

    #[test]
    fn test_load_twice_fails() {
        let mut service = HttpService::new(ServiceConfig::default());
        service.load().unwrap();
        assert!(matches!(service.load(), Err(Error::AlreadyLoaded)));
    }

    #[test]
    fn test_load_rejects_bad_urls() {
        for api_url in ["not a url", "ftp://example.com", "mailto:someone@example.com"] {
            let mut service = HttpService::new(ServiceConfig {
                api_url: api_url.to_string(),
                ..Default::default()
            });
            assert!(
                matches!(service.load(), Err(Error::InitializationError(_))),
                "{} should be rejected",
                api_url
            );
        }
    }
}
