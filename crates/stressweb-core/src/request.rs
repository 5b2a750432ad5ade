use crate::error::ConfigError;
use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Sent with every request unless the caller supplies its own User-Agent
pub const DEFAULT_USER_AGENT: &str = "StressTest/1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            _ => Err(ConfigError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Target request, built once per run and shared read-only by every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    url: Url,
    method: Method,
    /// Lowercased header names
    headers: BTreeMap<String, String>,
    body: Option<Bytes>,
}

impl RequestSpec {
    /// Validate the target and normalize headers.
    ///
    /// Fails on anything that is not an absolute http(s) URL with a host and
    /// without embedded credentials, and on header names or values that
    /// cannot go on the wire.
    pub fn new<I>(
        url: &str,
        method: Method,
        headers: I,
        body: Option<Bytes>,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let url = validate_url(url)?;

        let mut normalized = BTreeMap::new();
        for (name, value) in headers {
            let header_name =
                HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| {
                    ConfigError::InvalidHeader {
                        name: name.clone(),
                        reason: e.to_string(),
                    }
                })?;
            HeaderValue::from_str(value.trim()).map_err(|e| ConfigError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            normalized.insert(header_name.as_str().to_string(), value.trim().to_string());
        }
        normalized
            .entry("user-agent".to_string())
            .or_insert_with(|| DEFAULT_USER_AGENT.to_string());

        Ok(Self {
            url,
            method,
            headers: normalized,
            body,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Body as it should go on the wire: always `None` for GET.
    pub fn body(&self) -> Option<&Bytes> {
        match self.method {
            Method::Get => None,
            Method::Post => self.body.as_ref(),
        }
    }
}

fn validate_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::MissingHost(raw.to_string()));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(ConfigError::CredentialsInUrl(raw.to_string()));
    }

    Ok(url)
}

/// Parse a curl-style `Name: value` header argument.
pub fn parse_header_line(line: &str) -> Result<(String, String), ConfigError> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| ConfigError::InvalidHeader {
            name: line.to_string(),
            reason: "expected `Name: value`".to_string(),
        })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::InvalidHeader {
            name: line.to_string(),
            reason: "empty header name".to_string(),
        });
    }
    Ok((name.to_string(), value.trim().to_string()))
}
