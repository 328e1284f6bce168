//! Post pipeline: admission, validation, authentication, escaping, storage.
//!
//! Steps run in order and stop at the first failure:
//!
//! 1. global throttle
//! 2. per-client rate limit
//! 3. field validation
//! 4. password check, only for reserved usernames
//! 5. escaping of every text field
//! 6. insertion into the message log
//!
//! Nothing is written unless every step passes.

use crate::credentials::CredentialStore;
use crate::error::BoardError;
use crate::message_log::MessageLog;
use crate::models::{Message, PostRequest};
use crate::rate_limit::PerClientRateLimiter;
use crate::sanitize::escape;
use crate::throttle::SlidingWindowThrottle;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub const MAX_USERNAME_CHARS: usize = 15;
pub const MAX_MESSAGE_CHARS: usize = 2500;
pub const MAX_SIGNATURE_CHARS: usize = 2000;

#[derive(Clone)]
pub struct PostingService {
    throttle: Arc<SlidingWindowThrottle>,
    rate_limiter: Arc<PerClientRateLimiter>,
    credentials: Arc<CredentialStore>,
    messages: Arc<MessageLog>,
}

impl PostingService {
    pub fn new(
        throttle: Arc<SlidingWindowThrottle>,
        rate_limiter: Arc<PerClientRateLimiter>,
        credentials: Arc<CredentialStore>,
        messages: Arc<MessageLog>,
    ) -> Self {
        Self {
            throttle,
            rate_limiter,
            credentials,
            messages,
        }
    }

    pub fn post(
        &self,
        request: &PostRequest,
        client: &str,
        now: Instant,
    ) -> Result<Message, BoardError> {
        self.throttle.admit(now)?;
        self.post_admitted(request, client, now)
    }

    /// Steps 2 to 6, for callers that already passed the global throttle
    /// before reading the request body.
    pub fn post_admitted(
        &self,
        request: &PostRequest,
        client: &str,
        now: Instant,
    ) -> Result<Message, BoardError> {
        self.rate_limiter.admit(client, now)?;

        let fields = validate(request)?;

        if self.credentials.is_reserved(fields.username) {
            let verified = !request.password.is_empty()
                && self.credentials.verify(fields.username, &request.password);
            if !verified {
                warn!("Rejected post as reserved user {} from {}", fields.username, client);
                return Err(BoardError::Authentication);
            }
        }

        let message = Message {
            username: escape(fields.username),
            body: escape(fields.body),
            signature: fields.signature.map(escape),
            posted_at: Utc::now(),
        };
        self.messages.push(message.clone());

        info!("Stored post from {} ({} chars)", client, fields.body.chars().count());
        Ok(message)
    }

    /// Current board, newest first.
    pub fn list(&self) -> Vec<Message> {
        self.messages.snapshot()
    }
}

struct Fields<'a> {
    username: &'a str,
    body: &'a str,
    signature: Option<&'a str>,
}

fn validate(request: &PostRequest) -> Result<Fields<'_>, BoardError> {
    let username = request.username.trim();
    let body = request.msg.trim();
    let signature = request.signature.trim();

    if username.is_empty() || body.is_empty() {
        return Err(BoardError::validation("Username and message are required."));
    }
    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(BoardError::validation(format!(
            "Username is too long (max {} characters).",
            MAX_USERNAME_CHARS
        )));
    }
    if body.chars().count() > MAX_MESSAGE_CHARS {
        return Err(BoardError::validation(format!(
            "Message is too long (max {} characters).",
            MAX_MESSAGE_CHARS
        )));
    }
    if signature.chars().count() > MAX_SIGNATURE_CHARS {
        return Err(BoardError::validation(format!(
            "Signature is too long (max {} characters).",
            MAX_SIGNATURE_CHARS
        )));
    }

    Ok(Fields {
        username,
        body,
        signature: (!signature.is_empty()).then_some(signature),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::hash_password_with;
    use std::time::Duration;

    fn service_with(throttle: SlidingWindowThrottle, limiter: PerClientRateLimiter) -> PostingService {
        let credentials = CredentialStore::parse(&format!(
            "alice={}",
            hash_password_with("wonderland", "saltysalt", 1000)
        ));
        PostingService::new(
            Arc::new(throttle),
            Arc::new(limiter),
            Arc::new(credentials),
            Arc::new(MessageLog::new()),
        )
    }

    fn service() -> PostingService {
        service_with(
            SlidingWindowThrottle::default(),
            PerClientRateLimiter::new(1000, Duration::from_secs(60), 1000),
        )
    }

    fn post(username: &str, msg: &str) -> PostRequest {
        PostRequest {
            username: username.into(),
            msg: msg.into(),
            ..Default::default()
        }
    }

    fn validation_reason(result: Result<Message, BoardError>) -> String {
        match result {
            Err(BoardError::Validation(reason)) => reason,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_username_is_required() {
        let svc = service();
        let reason = validation_reason(svc.post(&post("", "hi"), "c", Instant::now()));
        assert!(reason.contains("required"));
        assert!(svc.list().is_empty());
    }

    #[test]
    fn whitespace_only_message_is_required() {
        let svc = service();
        let reason = validation_reason(svc.post(&post("bob", "   \n"), "c", Instant::now()));
        assert!(reason.contains("required"));
    }

    #[test]
    fn long_fields_are_rejected() {
        let svc = service();
        let now = Instant::now();

        let reason = validation_reason(svc.post(&post(&"A".repeat(16), "hi"), "c", now));
        assert!(reason.contains("too long"));

        let reason = validation_reason(svc.post(&post("bob", &"x".repeat(2501)), "c", now));
        assert!(reason.contains("Message is too long"));

        let mut req = post("bob", "hi");
        req.signature = "s".repeat(2001);
        let reason = validation_reason(svc.post(&req, "c", now));
        assert!(reason.contains("Signature is too long"));

        assert!(svc.list().is_empty());
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        let svc = service();
        // 15 two-byte characters
        let name = "é".repeat(15);
        assert!(svc.post(&post(&name, "hi"), "c", Instant::now()).is_ok());
    }

    #[test]
    fn boundary_lengths_are_accepted() {
        let svc = service();
        let mut req = post(&"A".repeat(15), &"x".repeat(2500));
        req.signature = "s".repeat(2000);
        let stored = svc.post(&req, "c", Instant::now()).unwrap();
        assert_eq!(stored.signature.map(|s| s.as_str().len()), Some(2000));
    }

    #[test]
    fn reserved_username_needs_the_right_password() {
        let svc = service();
        let now = Instant::now();

        let mut req = post("alice", "hello");
        req.password = "wonderland".into();
        assert!(svc.post(&req, "c", now).is_ok());

        req.password = "guess".into();
        assert_eq!(svc.post(&req, "c", now), Err(BoardError::Authentication));

        req.password.clear();
        assert_eq!(svc.post(&req, "c", now), Err(BoardError::Authentication));

        assert_eq!(svc.list().len(), 1);
    }

    #[test]
    fn unreserved_username_ignores_password() {
        let svc = service();
        let mut req = post("bob", "hello");
        req.password = "whatever".into();
        assert!(svc.post(&req, "c", Instant::now()).is_ok());
    }

    #[test]
    fn auth_failures_look_the_same() {
        let svc = service();
        let now = Instant::now();

        let mut wrong_pw = post("alice", "hi");
        wrong_pw.password = "nope".into();
        let mut no_pw = post("alice", "hi");
        no_pw.password.clear();

        let a = svc.post(&wrong_pw, "c", now).unwrap_err();
        let b = svc.post(&no_pw, "c", now).unwrap_err();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn stored_text_is_escaped() {
        let svc = service();
        let mut req = post("<b>eve</b>", "<script>alert(1)</script>");
        req.signature = "\"sig\" & 'co'".into();

        let stored = svc.post(&req, "c", Instant::now()).unwrap();
        assert_eq!(stored.username.as_str(), "&lt;b&gt;eve&lt;/b&gt;");
        assert!(!stored.body.as_str().contains("<script>"));
        assert_eq!(
            stored.signature.as_ref().map(|s| s.as_str()),
            Some("&#34;sig&#34; &amp; &#39;co&#39;")
        );
    }

    #[test]
    fn empty_signature_is_absent() {
        let svc = service();
        let mut req = post("bob", "hi");
        req.signature = "   ".into();
        let stored = svc.post(&req, "c", Instant::now()).unwrap();
        assert!(stored.signature.is_none());
    }

    #[test]
    fn fields_are_trimmed() {
        let svc = service();
        let stored = svc.post(&post("  bob  ", "  hi there \n"), "c", Instant::now()).unwrap();
        assert_eq!(stored.username.as_str(), "bob");
        assert_eq!(stored.body.as_str(), "hi there");
    }

    #[test]
    fn throttles_run_before_validation() {
        let svc = service_with(
            SlidingWindowThrottle::new(1, Duration::from_secs(60)),
            PerClientRateLimiter::default(),
        );
        let now = Instant::now();

        // Invalid post still takes the only global slot
        assert!(matches!(
            svc.post(&post("", ""), "c", now),
            Err(BoardError::Validation(_))
        ));
        assert_eq!(svc.post(&post("bob", "hi"), "c", now), Err(BoardError::Throttled));
    }

    #[test]
    fn post_admitted_leaves_global_window_alone() {
        let throttle = Arc::new(SlidingWindowThrottle::new(1, Duration::from_secs(60)));
        let svc = PostingService::new(
            Arc::clone(&throttle),
            Arc::new(PerClientRateLimiter::default()),
            Arc::new(CredentialStore::default()),
            Arc::new(MessageLog::new()),
        );
        let now = Instant::now();

        throttle.admit(now).unwrap();
        assert!(svc.post_admitted(&post("bob", "hi"), "c", now).is_ok());
        assert_eq!(throttle.in_flight(now), 1);
        assert_eq!(svc.post(&post("bob", "hi"), "c", now), Err(BoardError::Throttled));
    }

    #[test]
    fn per_client_limit_applies_after_global() {
        let svc = service_with(SlidingWindowThrottle::default(), PerClientRateLimiter::default());
        let now = Instant::now();

        for _ in 0..5 {
            assert!(svc.post(&post("bob", "hi"), "10.0.0.1", now).is_ok());
        }
        assert_eq!(
            svc.post(&post("bob", "hi"), "10.0.0.1", now),
            Err(BoardError::RateLimited)
        );
        assert!(svc.post(&post("carol", "hi"), "10.0.0.2", now).is_ok());
    }

    #[test]
    fn global_capacity_scenario_across_clients() {
        let svc = service();
        let t0 = Instant::now();

        for i in 0..250 {
            let client = format!("10.0.{}.{}", i / 200, i % 200);
            assert!(svc.post(&post("bob", "hi"), &client, t0).is_ok(), "request {}", i + 1);
        }
        assert_eq!(svc.post(&post("bob", "hi"), "10.9.9.9", t0), Err(BoardError::Throttled));

        let later = t0 + Duration::from_secs(60);
        assert!(svc.post(&post("bob", "hi"), "10.9.9.9", later).is_ok());
        assert_eq!(svc.list().len(), 100);
    }
}
