use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::browse::SearchScope;
use crate::realtime::ReconnectPolicy;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub storefront: StorefrontConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
}

const VERVIDA_PAGE_SIZE: NonZeroUsize = NonZeroUsize::new(12).unwrap();
const WATERLILY_PAGE_SIZE: NonZeroUsize = NonZeroUsize::new(10).unwrap();

/// Which of the two storefront flavours this process serves.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorefrontVariant {
    Vervida,
    Waterlily,
}

impl StorefrontVariant {
    pub fn display_name(&self) -> &'static str {
        match self {
            StorefrontVariant::Vervida => "Vervida",
            StorefrontVariant::Waterlily => "Waterlily",
        }
    }

    /// Products per page in the grid.
    pub fn default_page_size(&self) -> NonZeroUsize {
        match self {
            StorefrontVariant::Vervida => VERVIDA_PAGE_SIZE,
            StorefrontVariant::Waterlily => WATERLILY_PAGE_SIZE,
        }
    }

    /// Fields the free-text search looks at.
    pub fn search_scope(&self) -> SearchScope {
        match self {
            StorefrontVariant::Vervida => SearchScope::Extended,
            StorefrontVariant::Waterlily => SearchScope::TitleOnly,
        }
    }
}

/// Storefront presentation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorefrontConfig {
    pub variant: StorefrontVariant,
    /// Overrides the variant's page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    /// Overrides the variant's display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl StorefrontConfig {
    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
            .and_then(NonZeroUsize::new)
            .unwrap_or_else(|| self.variant.default_page_size())
    }

    pub fn display_name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| self.variant.display_name().to_string())
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Prebuilt frontend served as static files.
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            frontend_dir: default_frontend_dir(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    5217
}

fn default_frontend_dir() -> PathBuf {
    PathBuf::from("frontend/dist")
}

/// Upstream catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Catalog base URLs, tried in order.
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,
    /// Per-request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_endpoints() -> Vec<String> {
    vec!["https://fakestoreapi.com".to_string()]
}

fn default_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string()
}

/// CORS headers attached to every response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_allow_methods")]
    pub allow_methods: String,
    #[serde(default = "default_allow_headers")]
    pub allow_headers: String,
    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_methods: default_allow_methods(),
            allow_headers: default_allow_headers(),
            allow_credentials: default_allow_credentials(),
        }
    }
}

fn default_allow_methods() -> String {
    "GET, POST, PUT, DELETE, OPTIONS".to_string()
}

fn default_allow_headers() -> String {
    "Content-Type, Accept, Authorization, X-Requested-With".to_string()
}

fn default_allow_credentials() -> bool {
    true
}

/// Realtime client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RealtimeConfig {
    /// WebSocket endpoint (e.g., "ws://localhost:5217/ws")
    #[serde(default = "default_ws_url")]
    pub url: String,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl RealtimeConfig {
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            max_attempts: self.max_attempts,
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: default_ws_url(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_ws_url() -> String {
    "ws://localhost:5217/ws".to_string()
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    5
}
