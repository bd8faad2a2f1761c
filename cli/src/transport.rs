//! Network side of the host: executes the requests the core builds.

use todo_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};
use tracing::debug;
use url::Url;

/// Executes one request. Non-2xx statuses are returned as data; only a
/// request that got no response at all is an error.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
    origin: Url,
}

impl UreqTransport {
    pub fn new(origin: Url) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent, origin }
    }

    /// Joins a relative request path onto the origin. Absolute and
    /// protocol-relative URLs are refused, and the joined URL must keep the
    /// configured origin.
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        if Url::parse(path).is_ok() || path.starts_with("//") || path.starts_with("\\\\") {
            return Err(ApiError::TransportError(format!(
                "refusing absolute request URL {path}"
            )));
        }
        let url = self
            .origin
            .join(path)
            .map_err(|e| ApiError::TransportError(format!("invalid request path {path}: {e}")))?;
        if url.origin() != self.origin.origin() {
            return Err(ApiError::TransportError(format!(
                "request path {path} leaves origin {}",
                self.origin.origin().ascii_serialization()
            )));
        }
        Ok(url)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = self.resolve(&request.path)?;
        let url = url.as_str();
        debug!(method = request.method.as_str(), %url, "sending request");

        let body = request.body.as_deref();
        let result = match request.method {
            HttpMethod::Get => self.agent.get(url).call(),
            HttpMethod::Delete => self.agent.delete(url).call(),
            HttpMethod::Post => {
                let mut req = self.agent.post(url);
                for (name, value) in &request.headers {
                    req = req.header(name, value);
                }
                req.send(body.unwrap_or_default().as_bytes())
            }
            HttpMethod::Put => {
                let mut req = self.agent.put(url);
                for (name, value) in &request.headers {
                    req = req.header(name, value);
                }
                req.send(body.unwrap_or_default().as_bytes())
            }
        };
        let mut response = result.map_err(|e| ApiError::TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                Some((name.as_str().to_string(), value.to_str().ok()?.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::TransportError(e.to_string()))?;
        debug!(status, "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(origin: &str) -> UreqTransport {
        UreqTransport::new(Url::parse(origin).unwrap())
    }

    #[test]
    fn resolves_relative_path_against_origin() {
        let t = transport("http://127.0.0.1:3000");
        assert_eq!(
            t.resolve("/api/todos").unwrap().as_str(),
            "http://127.0.0.1:3000/api/todos"
        );
    }

    #[test]
    fn absolute_path_replaces_origin_path() {
        let t = transport("https://todo.example/app/");
        assert_eq!(
            t.resolve("/api/todos/3").unwrap().as_str(),
            "https://todo.example/api/todos/3"
        );
    }

    #[test]
    fn refuses_absolute_urls() {
        let t = transport("http://127.0.0.1:3000");
        for path in [
            "http://localhost:5000/api/todos",
            "//evil.example/api/todos",
            "\\\\evil.example/api/todos",
            "/\\evil.example/api/todos",
        ] {
            let err = t.resolve(path).unwrap_err();
            assert!(matches!(err, ApiError::TransportError(_)), "{path}");
        }
    }
}
