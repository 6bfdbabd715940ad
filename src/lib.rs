//! Artifacter client
//!
//! A client for the Artifacter character card generator: load the service,
//! list the characters on a player's profile, and render a card for one of
//! them.
//!
//! # Features
//!
//! - **HTTP Backend** (default): Talks to a running Artifacter HTTP API
//! - **Swappable Backends**: Any [`Service`] implementation can drive the client
//! - **Async Facade**: [`Client`] runs the service on a worker thread
//!
//! # Example
//!
//! ```no_run
//! use artifacter_client::{Client, GenerateRequest, ServiceConfig, Uid};
//!
//! # async fn demo() -> artifacter_client::Result<()> {
//! let client = Client::new(ServiceConfig::default()).await?;
//! client.load().await?;
//! let characters = client.get_characters(Uid(827106332)).await?;
//! let request = GenerateRequest::new(Uid(827106332), characters[0].id);
//! let png = client.generate(request).await?;
//! std::fs::write("card.png", png)?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt::{self, Display};

use serde::Deserialize;

pub mod error;
pub use error::{Error, Result};

pub mod params;
pub use params::{ImageFormat, Lang, ScoreCounter};

// Blocking HTTP backend against the Artifacter API
#[cfg(feature = "http")]
pub mod http;

// Async-friendly facade (worker-thread backed)
pub mod async_api;
pub use async_api::Client;

// Interactive load / list / generate / save flow
pub mod session;

/// Configuration for the service backend
///
/// # Examples
///
/// ```
/// let cfg = artifacter_client::ServiceConfig::default();
/// assert_eq!(cfg.api_url, "http://localhost:3000");
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the Artifacter HTTP API
    pub api_url: String,
    /// User agent string to send with requests
    pub user_agent: String,
    /// Custom HTTP headers
    pub headers: HashMap<String, String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            user_agent: concat!("artifacter-client/", env!("CARGO_PKG_VERSION")).to_string(),
            headers: HashMap::new(),
        }
    }
}

/// Player account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uid(pub i32);

impl Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Character identifier as used by the game data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub u32);

impl Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A character shown on a player's profile
///
/// Only `id` is guaranteed; the descriptive fields are filled in when the
/// backend reports them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub ascension: u8,
    #[serde(default)]
    pub element: String,
}

impl Character {
    /// A character record carrying nothing but its id
    pub fn from_id(id: CharacterId) -> Self {
        Self {
            id,
            name: String::new(),
            level: 0,
            ascension: 0,
            element: String::new(),
        }
    }
}

/// Parameters for a single card generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub uid: Uid,
    pub character: CharacterId,
    pub lang: Lang,
    pub format: ImageFormat,
    pub counter: ScoreCounter,
}

impl GenerateRequest {
    /// A request using the fixed parameters: Japanese text, PNG output and
    /// the `Normal` score counter.
    pub fn new(uid: Uid, character: CharacterId) -> Self {
        Self {
            uid,
            character,
            lang: Lang::Ja,
            format: ImageFormat::Png,
            counter: ScoreCounter::Normal,
        }
    }
}

/// Core trait for generation service backends
///
/// Backends are synchronous; [`Client`] moves them onto a worker thread to
/// offer an async interface.
pub trait Service {
    /// Prepare the service. Must complete before any other call; a second
    /// call fails with [`Error::AlreadyLoaded`].
    fn load(&mut self) -> Result<()>;

    /// List the characters on the given player's profile, in profile order
    fn get_characters(&mut self, uid: Uid) -> Result<Vec<Character>>;

    /// Render a card and return the encoded image bytes
    fn generate(&mut self, request: &GenerateRequest) -> Result<Vec<u8>>;

    /// Tear down the service and release its resources
    fn close(self) -> Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Create a new service instance with the default backend
#[cfg(feature = "http")]
pub fn new_service(config: ServiceConfig) -> Result<impl Service> {
    Ok(http::HttpService::new(config))
}
