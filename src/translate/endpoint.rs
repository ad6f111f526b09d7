//! Regional endpoint failover.
//!
//! Google answers a client it considers abusive with an error page or an empty
//! body instead of a translation. Each call therefore reports either an answer
//! or a block, and a blocked call moves on to the next regional domain.

use std::future::Future;
use reqwest::RequestBuilder;
use tracing::{debug, warn};

use crate::error::{Result, SubtransError};

/// Outcome of asking a single endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointReply<T> {
    Answered(T),
    /// The endpoint refused, failed or answered with something unusable
    Blocked(String),
}

impl<T> EndpointReply<T> {
    /// Keep a block as is, otherwise turn the answer into something else
    pub fn and_then<U>(self, f: impl FnOnce(T) -> EndpointReply<U>) -> EndpointReply<U> {
        match self {
            Self::Answered(value) => f(value),
            Self::Blocked(reason) => EndpointReply::Blocked(reason),
        }
    }

    /// Treat a missing value as a malformed reply
    pub fn from_option(value: Option<T>, reason: &str) -> Self {
        match value {
            Some(value) => Self::Answered(value),
            None => Self::Blocked(reason.to_string()),
        }
    }
}

/// Ordered list of regional hosts, e.g. `translate.googleapis.com`, `translate.googleapis.co.kr`
#[derive(Debug, Clone)]
pub struct EndpointRotation {
    hosts: Vec<String>,
}

impl EndpointRotation {
    pub fn new(host_base: &str, suffixes: &[String]) -> Self {
        let hosts = suffixes
            .iter()
            .map(|suffix| format!("{}{}", host_base, suffix))
            .collect();
        Self { hosts }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Ask every host in order until one answers.
    ///
    /// Each call starts over from the first host.
    pub async fn first_answer<T, F, Fut>(&self, mut call: F) -> Result<T>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = EndpointReply<T>>,
    {
        for host in &self.hosts {
            debug!("Requesting translation from \"{}\"", host);
            match call(host.clone()).await {
                EndpointReply::Answered(value) => return Ok(value),
                EndpointReply::Blocked(reason) => {
                    warn!("Endpoint \"{}\" got blocked ({}), trying another one...", host, reason);
                }
            }
        }

        Err(SubtransError::EndpointsExhausted {
            tried: self.hosts.len(),
        })
    }
}

/// Send a request and read its body, mapping every failure to a block
pub async fn fetch_text(request: RequestBuilder) -> EndpointReply<String> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => return EndpointReply::Blocked(format!("request failed: {}", e)),
    };

    let status = response.status();
    if !status.is_success() {
        return EndpointReply::Blocked(format!("HTTP {}", status));
    }

    match response.text().await {
        Ok(body) if body.trim().is_empty() => EndpointReply::Blocked("empty body".to_string()),
        Ok(body) => EndpointReply::Answered(body),
        Err(e) => EndpointReply::Blocked(format!("failed to read body: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn rotation() -> EndpointRotation {
        let suffixes: Vec<String> = ["com", "co.kr", "de"].iter().map(|s| s.to_string()).collect();
        EndpointRotation::new("translate.googleapis.", &suffixes)
    }

    #[test]
    fn test_hosts() {
        assert_eq!(rotation().hosts(), &[
            "translate.googleapis.com".to_string(),
            "translate.googleapis.co.kr".to_string(),
            "translate.googleapis.de".to_string(),
        ]);
    }

    #[tokio::test]
    async fn test_fails_over_in_order() {
        let asked = Mutex::new(Vec::new());
        let answer = rotation()
            .first_answer(|host| {
                asked.lock().unwrap().push(host.clone());
                async move {
                    if host.ends_with(".co.kr") {
                        EndpointReply::Answered(format!("answer from {}", host))
                    } else {
                        EndpointReply::Blocked("HTTP 429".to_string())
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(answer, "answer from translate.googleapis.co.kr");
        assert_eq!(*asked.lock().unwrap(), vec![
            "translate.googleapis.com".to_string(),
            "translate.googleapis.co.kr".to_string(),
        ]);
    }

    #[tokio::test]
    async fn test_every_call_restarts_from_first_host() {
        let rotation = rotation();
        for _ in 0..2 {
            let asked = Mutex::new(Vec::new());
            rotation
                .first_answer(|host| {
                    asked.lock().unwrap().push(host);
                    async { EndpointReply::Answered(()) }
                })
                .await
                .unwrap();
            assert_eq!(asked.lock().unwrap()[0], "translate.googleapis.com");
        }
    }

    #[tokio::test]
    async fn test_exhaustion_is_fatal() {
        let result: Result<()> = rotation()
            .first_answer(|_| async { EndpointReply::Blocked("HTTP 403".to_string()) })
            .await;

        assert!(matches!(result, Err(SubtransError::EndpointsExhausted { tried: 3 })));
    }

    #[test]
    fn test_reply_combinators() {
        let reply = EndpointReply::Answered(2).and_then(|n| EndpointReply::Answered(n * 2));
        assert_eq!(reply, EndpointReply::Answered(4));

        let blocked: EndpointReply<i32> = EndpointReply::Blocked("gone".to_string());
        assert_eq!(blocked.and_then(|n| EndpointReply::Answered(n)), EndpointReply::Blocked("gone".to_string()));

        assert_eq!(EndpointReply::<i32>::from_option(None, "malformed"), EndpointReply::Blocked("malformed".to_string()));
    }
}
