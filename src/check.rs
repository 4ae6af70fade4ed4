use http::{
    header::{CONNECTION, HeaderName, HeaderValue},
    HeaderMap, Method,
};
use reqwest::{Client, Request};
use tracing::debug;
use url::Url;

use crate::error::CheckError;

/// A validated health check, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub expected_status: u16,
}

impl Probe {
    pub fn build_request(&self, http: &Client) -> Result<Request, CheckError> {
        let method = Method::from_bytes(self.method.as_bytes())?;
        let url = Url::parse(&self.url)?;

        let mut headers = HeaderMap::with_capacity(self.headers.len() + 1);
        for (key, value) in &self.headers {
            headers.append(HeaderName::from_bytes(key.as_bytes())?, HeaderValue::from_str(value)?);
        }
        // never reuse the connection
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        http.request(method, url)
            .headers(headers)
            .build()
            .map_err(|source| CheckError::Request { source })
    }

    /// Sends the request once and compares the response status.
    pub async fn execute(&self, http: &Client) -> Result<(), CheckError> {
        let request = self.build_request(http)?;
        debug!(method = %request.method(), url = %request.url(), "Sending health check request");

        let status = {
            let response = http.execute(request).await.map_err(|source| {
                debug!(reason = %source, "Health check request failed");
                CheckError::Transport { source }
            })?;
            response.status()
            // response and its body are released here
        };
        debug!(%status, "Received response");

        if status.as_u16() != self.expected_status {
            return Err(CheckError::StatusMismatch {
                actual: status.as_u16(),
                expected: self.expected_status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use tracing_test::traced_test;

    fn probe(url: &str) -> Probe {
        Probe {
            url: url.to_string(),
            method: "GET".to_string(),
            headers: Vec::new(),
            expected_status: 200,
        }
    }

    #[test]
    fn test_request_carries_headers_in_order() {
        let probe = Probe {
            headers: vec![
                ("X-Test".into(), "abc".into()),
                ("X-Test".into(), "def".into()),
                ("Authorization".into(), "Bearer abc:def".into()),
            ],
            ..probe("http://localhost:8080/health")
        };
        let request = probe.build_request(&Client::new()).expect("valid request");

        let values: Vec<_> = request
            .headers()
            .get_all("x-test")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(values, vec!["abc", "def"]);
        assert_eq!(request.headers()["authorization"], "Bearer abc:def");
        assert_eq!(request.headers()[CONNECTION], "close");
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.url().as_str(), "http://localhost:8080/health");
        assert!(request.body().is_none());
    }

    #[test]
    fn test_custom_verb() {
        let probe = Probe {
            method: "HEAD".into(),
            ..probe("http://localhost/")
        };
        let request = probe.build_request(&Client::new()).expect("valid request");
        assert_eq!(request.method(), Method::HEAD);
    }

    #[test]
    fn test_request_build_failures() {
        let http = Client::new();

        let err = probe("not a url").build_request(&http).unwrap_err();
        assert!(matches!(err, CheckError::InvalidUrl { .. }));
        assert_eq!(err.to_string(), "relative URL without a base");

        let err = probe("http://localhost:99999/").build_request(&http).unwrap_err();
        assert!(matches!(err, CheckError::InvalidUrl { .. }));

        let err = Probe {
            method: "GE T".into(),
            ..probe("http://localhost/")
        }
        .build_request(&http)
        .unwrap_err();
        assert!(matches!(err, CheckError::InvalidMethod { .. }));

        let err = Probe {
            headers: vec![("Bad Key".into(), "v".into())],
            ..probe("http://localhost/")
        }
        .build_request(&http)
        .unwrap_err();
        assert!(matches!(err, CheckError::InvalidHeaderName { .. }));
        assert!(err.is_pre_flight());

        let err = Probe {
            headers: vec![(String::new(), "abc".into())],
            ..probe("http://localhost/")
        }
        .build_request(&http)
        .unwrap_err();
        assert!(matches!(err, CheckError::InvalidHeaderName { .. }));
    }

    #[traced_test]
    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // grab a free port, then close it so nothing is listening
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = probe(&format!("http://127.0.0.1:{port}/"))
            .execute(&Client::new())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckError::Transport { .. }));
        assert!(!err.is_pre_flight());
        assert!(!err.to_string().contains("didn't match"));
        assert!(logs_contain("Health check request failed"));
    }
}
