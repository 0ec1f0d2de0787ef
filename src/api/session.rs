//! Cookie session and transport setup
//!
//! Builds a timeout-bounded `reqwest` client whose cookie jar holds the three
//! session cookies and whose default headers mimic a browser tab on the
//! service. Every request sent through the client carries both.

use crate::config::SessionConfig;
use crate::error::{Result, StoryloopError};
use reqwest::cookie::Jar;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, DNT, ORIGIN, REFERER, TE,
    USER_AGENT,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Session token cookie
pub const AUTH_SESSION_COOKIE: &str = "auth_session";
/// Locale cookie
pub const LANGUAGE_COOKIE: &str = "i18n_redirected";
/// Secondary token cookie
pub const GCP_TOKEN_COOKIE: &str = "gcp_token";

const CREATE_PATH: &str = "api/chat/create";
const SEND_PATH: &str = "api/models/llms";
const DELETE_PATH: &str = "api/chat/delete";

/// Endpoint URLs derived from the configured base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Parse `api_base`
    ///
    /// # Errors
    ///
    /// Returns `StoryloopError::InvalidUrl` if the base is not an absolute
    /// http(s) URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyloop::api::session::Endpoints;
    ///
    /// let endpoints = Endpoints::new("https://example.test/").unwrap();
    /// assert_eq!(endpoints.create(), "https://example.test/api/chat/create");
    /// ```
    pub fn new(api_base: &str) -> Result<Self> {
        let mut base = Url::parse(api_base)
            .map_err(|e| StoryloopError::InvalidUrl(format!("{}: {}", api_base, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(StoryloopError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                api_base
            ))
            .into());
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    /// Base URL, always ending in `/`
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// "Create conversation" endpoint
    pub fn create(&self) -> String {
        self.join(CREATE_PATH)
    }

    /// "Send message" endpoint
    pub fn send(&self) -> String {
        self.join(SEND_PATH)
    }

    /// "Delete conversation" endpoint
    pub fn delete(&self) -> String {
        self.join(DELETE_PATH)
    }

    /// Value for the `Origin` header
    pub fn origin(&self) -> String {
        self.base.origin().ascii_serialization()
    }

    /// Value for the `Referer` header
    pub fn referer(&self, path: &str) -> String {
        self.join(path)
    }

    fn join(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }
}

/// HTTP client plus the endpoints it talks to
#[derive(Debug, Clone)]
pub struct Session {
    /// Client carrying cookies and default headers
    pub client: Client,
    /// Endpoint URLs
    pub endpoints: Endpoints,
}

impl Session {
    /// Build the session from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL or a header value is invalid, or if the
    /// client cannot be built.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let endpoints = Endpoints::new(&config.api_base)?;
        let jar = cookie_jar(config, endpoints.base())?;
        let headers = default_headers(config, &endpoints)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .cookie_provider(jar)
            .default_headers(headers)
            .build()
            .map_err(|e| StoryloopError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized session: base={}, timeout={}s",
            endpoints.base(),
            config.timeout_seconds
        );

        Ok(Self { client, endpoints })
    }
}

/// Whether `value` can be sent as a cookie value without quoting
///
/// Accepts the RFC 6265 `cookie-octet` set: visible ASCII except `"`, `,`,
/// `;` and `\`.
pub fn is_cookie_value(value: &str) -> bool {
    value
        .bytes()
        .all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
}

/// Cookie jar preloaded with the three session cookies
///
/// The cookies are host-only and scoped to `/` on the base URL. The session
/// token is marked `Secure` when the base is https.
///
/// # Errors
///
/// Returns `StoryloopError::Config` if a value is not a valid cookie value,
/// since the jar would otherwise drop that cookie without notice.
pub fn cookie_jar(config: &SessionConfig, base: &Url) -> Result<Arc<Jar>> {
    for (name, value) in [
        (AUTH_SESSION_COOKIE, &config.auth_session),
        (LANGUAGE_COOKIE, &config.language),
        (GCP_TOKEN_COOKIE, &config.gcp_token),
    ] {
        if !is_cookie_value(value) {
            return Err(StoryloopError::Config(format!(
                "{} cookie value contains characters not allowed in a cookie",
                name
            ))
            .into());
        }
    }

    let jar = Jar::default();
    let secure = if base.scheme() == "https" {
        "; Secure"
    } else {
        ""
    };

    jar.add_cookie_str(
        &format!("{}={}; Path=/{}", AUTH_SESSION_COOKIE, config.auth_session, secure),
        base,
    );
    jar.add_cookie_str(
        &format!("{}={}; Path=/", LANGUAGE_COOKIE, config.language),
        base,
    );
    jar.add_cookie_str(
        &format!("{}={}; Path=/", GCP_TOKEN_COOKIE, config.gcp_token),
        base,
    );

    Ok(Arc::new(jar))
}

/// Browser-mimicking header set attached to every request
///
/// `Content-Type` is left to each call (JSON or multipart).
pub fn default_headers(config: &SessionConfig, endpoints: &Endpoints) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(&config.user_agent)?);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(
        REFERER,
        header_value(&endpoints.referer(&config.referer_path))?,
    );
    headers.insert(ORIGIN, header_value(&endpoints.origin())?);
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(HeaderName::from_static("sec-gpc"), HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("empty"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("priority"),
        HeaderValue::from_static("u=0"),
    );
    headers.insert(TE, HeaderValue::from_static("trailers"));
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| StoryloopError::Config(format!("Invalid header value {:?}: {}", value, e)).into())
}
