//! Platform context - where API calls and static assets are served from.
//!
//! Inside a native host container there is no page origin, so every URL must
//! be absolute. In a browser-like host, relative paths go through the page's
//! own origin (and its dev proxy). The context is passed in explicitly by the
//! caller instead of being probed from the environment.

use serde::{Deserialize, Serialize};

/// Default API host when running inside a container.
pub const DEFAULT_API_HOST: &str = "http://192.168.0.102:4000";

/// Default static asset host when running inside a container.
pub const DEFAULT_ASSET_HOST: &str = "http://192.168.0.102:3000";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PlatformContext {
    /// Native host container: absolute URLs required.
    Container {
        #[serde(default = "default_api_host")]
        api_host: String,
        #[serde(default = "default_asset_host")]
        asset_host: String,
    },
    /// Browser-like host: relative URLs resolve against the page origin.
    #[default]
    Browser,
}

fn default_api_host() -> String {
    DEFAULT_API_HOST.to_string()
}

fn default_asset_host() -> String {
    DEFAULT_ASSET_HOST.to_string()
}

impl PlatformContext {
    /// Container context with the default hosts.
    pub fn container() -> Self {
        PlatformContext::Container {
            api_host: default_api_host(),
            asset_host: default_asset_host(),
        }
    }

    /// Base URL prepended to API paths. Empty in a browser.
    pub fn api_base(&self) -> &str {
        match self {
            PlatformContext::Container { api_host, .. } => api_host.trim_end_matches('/'),
            PlatformContext::Browser => "",
        }
    }

    /// Full URL for an API path such as `/api/deals`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base(), path)
    }

    /// Resolve an image URL for display.
    ///
    /// - `http://` and `https://` URLs are returned as-is.
    /// - `/static/` and `/assets/` paths get the asset host in a container
    ///   and stay relative in a browser.
    /// - Anything else is replaced by `fallback` when one is given.
    pub fn resolve_asset_url(&self, url: &str, fallback: Option<&str>) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }

        if url.starts_with("/static/") || url.starts_with("/assets/") {
            return match self {
                PlatformContext::Container { asset_host, .. } => {
                    format!("{}{}", asset_host.trim_end_matches('/'), url)
                }
                PlatformContext::Browser => url.to_string(),
            };
        }

        match fallback {
            Some(fallback) => fallback.to_string(),
            None => url.to_string(),
        }
    }
}
