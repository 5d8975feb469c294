// Controller origins and path routing
//
// A credential carries one server URL: the versioned API base
// (e.g. `https://unifi.example.com:8443/v2/api`). The management API
// (`/api/login`, `/api/s/{site}/...`, `/api/self/sites`) lives on the
// bare origin with the version suffix stripped. Both are derived once.

use url::Url;

use crate::error::Error;

/// Which origin a resolved request path is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Management API on the controller root origin (`/api/...` paths).
    Management,
    /// Everything else, relative to the configured versioned API base.
    Versioned,
}

/// The two request origins derived from a credential's server URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    management_origin: Url,
    api_base: Url,
}

impl Endpoints {
    /// Paths starting with this prefix belong to the management API.
    pub const MANAGEMENT_PREFIX: &'static str = "/api/";

    /// The login endpoint, relative to the management origin.
    pub const LOGIN_PATH: &'static str = "/api/login";

    /// Derive both origins from the configured server URL.
    ///
    /// A trailing `/v{N}/api` suffix is stripped to obtain the management
    /// origin. Without such a suffix both origins are the same URL.
    pub fn from_server_url(server_url: &str) -> Result<Self, Error> {
        let api_base = server_url.trim().trim_end_matches('/');
        let origin = strip_version_suffix(api_base);
        Ok(Self {
            management_origin: Url::parse(origin)?,
            api_base: Url::parse(api_base)?,
        })
    }

    /// Decide which origin serves `path`.
    pub fn route(path: &str) -> Route {
        if path.starts_with(Self::MANAGEMENT_PREFIX) || path == "/api" {
            Route::Management
        } else {
            Route::Versioned
        }
    }

    /// Build the absolute URL for a resolved request path.
    pub fn url_for(&self, path: &str) -> Result<Url, Error> {
        let base = match Self::route(path) {
            Route::Management => &self.management_origin,
            Route::Versioned => &self.api_base,
        };
        join(base, path)
    }

    /// `{management_origin}/api/login`
    pub fn login_url(&self) -> Result<Url, Error> {
        join(&self.management_origin, Self::LOGIN_PATH)
    }
}

/// Concatenate rather than `Url::join`, which would drop the base path.
fn join(base: &Url, path: &str) -> Result<Url, Error> {
    let base = base.as_str().trim_end_matches('/');
    let full = if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    };
    Ok(Url::parse(&full)?)
}

fn strip_version_suffix(base: &str) -> &str {
    let Some(rest) = base.strip_suffix("/api") else {
        return base;
    };
    let Some(idx) = rest.rfind('/') else {
        return base;
    };
    let segment = &rest[idx + 1..];
    let is_version = segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
    if is_version { &rest[..idx] } else { base }
}
