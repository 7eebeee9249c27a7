use std::{fmt, sync::Arc};

use base64::Engine;
use log::{Level, Log, Metadata, Record};

use crate::{
    models::{AuthRequest, Claim, Payload, PendingRequest, RequestOptions, SsoState},
    session::SessionSlot,
    util::{query_param, query_string, ENCODER},
    Config, Error, Result,
};

/// Target of every log record the provider emits
pub static LOG_TARGET: &str = "discourse_sso";

static SSO_PROVIDER_PATH: &str = "/session/sso_provider";

/// Forwards to the logger installed through the `log` crate, if any
struct GlobalLogger;

impl Log for GlobalLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record) {
        log::logger().log(record)
    }

    fn flush(&self) {
        log::logger().flush()
    }
}

/// Discourse SSO protocol engine
///
/// Configuration is validated once and never changes afterwards, so a single
/// provider can be shared between requests behind an `Arc`.
pub struct SsoProvider {
    config: Config,
    base_url: String,
    logger: Arc<dyn Log>,
}

impl fmt::Debug for SsoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsoProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SsoProvider {
    /// Create a provider logging through the global `log` facade
    pub fn new(config: Config) -> Result<SsoProvider> {
        SsoProvider::with_logger(config, Arc::new(GlobalLogger))
    }

    /// Create a provider logging to `logger`
    pub fn with_logger(config: Config, logger: Arc<dyn Log>) -> Result<SsoProvider> {
        config.validate()?;

        let base_url = config.discourse_url.trim_end_matches('/').to_owned();

        Ok(SsoProvider {
            config,
            base_url,
            logger,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate a signed authentication request and bind its nonce to the session
    ///
    /// Replaces any request already pending in the slot.
    pub async fn generate_auth_request<S>(
        &self,
        slot: &S,
        options: RequestOptions,
    ) -> Result<AuthRequest>
    where
        S: SessionSlot + ?Sized,
    {
        let pending = PendingRequest::new(options)?;

        let mut payload = format!(
            "nonce={}&return_sso_url={}",
            pending.nonce, self.config.callback_url
        );

        if pending.options.prompt == Some(false) {
            payload.push_str("&prompt=none");
        }

        // Discourse signs and verifies the base64 text, not the raw payload
        let payload_b64 = ENCODER.encode(payload);
        let signature = self.config.secret.sign(&payload_b64);
        let payload: String = form_urlencoded::byte_serialize(payload_b64.as_bytes()).collect();

        let redirect_url = format!(
            "{}{}?sso={}&sig={}",
            self.base_url, SSO_PROVIDER_PATH, payload, signature
        );

        slot.store(SsoState::Pending(pending.clone())).await?;

        debug!(
            self,
            "stored nonce {} for request created at {}",
            pending.nonce,
            pending.created_at
        );
        debug!(self, "redirecting to {}", redirect_url);

        let PendingRequest {
            nonce,
            created_at,
            options,
        } = pending;

        Ok(AuthRequest {
            redirect_url,
            nonce,
            signature,
            payload,
            options,
            created_at,
        })
    }

    /// Validate a callback from Discourse
    ///
    /// Malformed requests are errors. Callbacks that fail signature or nonce
    /// checks resolve to `None` and leave the session slot untouched. A valid
    /// callback consumes the pending request so it can't be answered twice.
    pub async fn validate_auth<S>(&self, slot: &S, request_url: &str) -> Result<Option<Payload>>
    where
        S: SessionSlot + ?Sized,
    {
        let query = query_string(request_url).ok_or(Error::BadUrl)?;

        let sso = query_param(query, "sso")
            .filter(|sso| !sso.is_empty())
            .ok_or(Error::BadParam { with: "sso" })?;

        let sig = query_param(query, "sig")
            .filter(|sig| !sig.is_empty())
            .ok_or(Error::BadParam { with: "sig" })?;

        if !self.config.secret.verify(&sso, &sig) {
            warn!(self, "invalid auth: signature does not match sso payload");
            return Ok(None);
        }

        let Some(mut payload) = Payload::decode(&sso) else {
            warn!(
                self,
                "invalid auth: signed sso payload is not base64 encoded UTF-8"
            );
            return Ok(None);
        };

        let Some(nonce) = payload.nonce().map(str::to_owned) else {
            warn!(self, "invalid auth: sso payload carries no nonce");
            return Ok(None);
        };

        let pending = match slot.consume(&nonce, self.config.nonce_lifetime).await? {
            Claim::Accepted(pending) => pending,
            Claim::Expired(pending) => {
                warn!(
                    self,
                    "invalid auth: request with nonce {} created at {} has expired",
                    pending.nonce,
                    pending.created_at
                );
                return Ok(None);
            }
            Claim::Unknown => {
                warn!(
                    self,
                    "invalid auth: nonce {} does not match a known request", nonce
                );
                return Ok(None);
            }
        };

        payload.options = Some(pending.options);

        debug!(
            self,
            "auth was successful for external_id {:?}",
            payload.external_id()
        );

        Ok(Some(payload))
    }

    pub(crate) fn debug(&self, args: fmt::Arguments<'_>) {
        if self.config.debug {
            self.emit(Level::Debug, args);
        }
    }

    pub(crate) fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        let record = Record::builder()
            .args(args)
            .level(level)
            .target(LOG_TARGET)
            .module_path_static(Some(module_path!()))
            .build();

        if self.logger.enabled(record.metadata()) {
            self.logger.log(&record);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use base64::Engine;
    use chrono::{Duration, Utc};
    use log::Level;

    use crate::models::{Claim, PendingRequest, RequestOptions, Secret, SsoState};
    use crate::test::*;
    use crate::util::{query_param, query_string, ENCODER};
    use crate::{Config, Error, MemorySlot, Result, SessionSlot, SsoProvider, Success};

    #[async_std::test]
    async fn generates_signed_redirect() {
        let provider = provider();
        let slot = MemorySlot::default();

        let request = provider
            .generate_auth_request(&slot, RequestOptions::default())
            .await
            .unwrap();

        assert!(request
            .redirect_url
            .starts_with("https://discourse.example.net/session/sso_provider?sso="));
        assert_eq!(request.nonce.len(), 32);

        let query = query_string(&request.redirect_url).unwrap();
        let sso = query_param(query, "sso").unwrap();
        let sig = query_param(query, "sig").unwrap();

        assert_eq!(sig, request.signature);
        assert!(Secret::from(SECRET).verify(&sso, &sig));

        let payload = decode_request_payload(&request.redirect_url);
        assert_eq!(
            payload,
            format!("nonce={}&return_sso_url={}", request.nonce, CALLBACK_URL)
        );

        match slot.load().await.unwrap() {
            SsoState::Pending(pending) => {
                assert_eq!(pending.nonce, request.nonce);
                assert_eq!(pending.created_at, request.created_at);
            }
            state => panic!("expected a pending request, found {:?}", state),
        }
    }

    #[async_std::test]
    async fn percent_encodes_payload() {
        let provider = provider();
        let slot = MemorySlot::default();

        let request = provider
            .generate_auth_request(&slot, RequestOptions::default())
            .await
            .unwrap();

        assert!(!request.payload.contains('+'));
        assert!(!request.payload.contains('/'));
        assert!(!request.payload.contains('='));
    }

    #[async_std::test]
    async fn requests_no_prompt() {
        let provider = provider();
        let slot = MemorySlot::default();

        let request = provider
            .generate_auth_request(
                &slot,
                RequestOptions {
                    prompt: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(decode_request_payload(&request.redirect_url).ends_with("&prompt=none"));

        let request = provider
            .generate_auth_request(
                &slot,
                RequestOptions {
                    prompt: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!decode_request_payload(&request.redirect_url).contains("prompt"));
    }

    #[async_std::test]
    async fn trims_trailing_slash_of_base_url() {
        let provider = SsoProvider::new(Config {
            discourse_url: "https://discourse.example.net/forum/".into(),
            ..config()
        })
        .unwrap();

        let request = provider
            .generate_auth_request(&MemorySlot::default(), RequestOptions::default())
            .await
            .unwrap();

        assert!(request
            .redirect_url
            .starts_with("https://discourse.example.net/forum/session/sso_provider?sso="));
    }

    #[test]
    fn rejects_invalid_config() {
        let err = SsoProvider::new(Config {
            discourse_url: "not a url".into(),
            ..config()
        })
        .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidConfig {
                with: "discourse_url"
            }
        );

        let err = SsoProvider::new(Config {
            secret: "".into(),
            ..config()
        })
        .unwrap_err();
        assert_eq!(err, Error::InvalidConfig { with: "secret" });
    }

    #[async_std::test]
    async fn validates_discourse_response() {
        let provider = provider();
        let slot = MemorySlot::default();

        let request = provider
            .generate_auth_request(&slot, RequestOptions::default())
            .await
            .unwrap();

        let url = discourse_response(
            SECRET,
            &format!(
                "nonce={}&return_sso_url={}&external_id=42&username=alice",
                request.nonce, CALLBACK_URL
            ),
        );

        let payload = provider
            .validate_auth(&slot, &url)
            .await
            .unwrap()
            .expect("a payload");

        assert_eq!(payload.nonce(), Some(request.nonce.as_str()));
        assert_eq!(payload.external_id(), Some("42"));
        assert_eq!(payload.username(), Some("alice"));
        assert_eq!(payload.return_sso_url(), Some(CALLBACK_URL));
        assert_eq!(slot.load().await, Ok(SsoState::Consumed));
    }

    #[async_std::test]
    async fn echoes_request_options() {
        let provider = provider();
        let slot = MemorySlot::default();

        let mut options = RequestOptions::default();
        options
            .extra
            .insert("return_to".into(), serde_json::json!("/settings"));

        let request = provider
            .generate_auth_request(&slot, options.clone())
            .await
            .unwrap();

        let url = discourse_response(SECRET, &format!("nonce={}", request.nonce));
        let payload = provider.validate_auth(&slot, &url).await.unwrap().unwrap();

        assert_eq!(payload.options, Some(options));
    }

    #[async_std::test]
    async fn rejects_tampered_payload() {
        let provider = provider();
        let slot = MemorySlot::default();

        let request = provider
            .generate_auth_request(&slot, RequestOptions::default())
            .await
            .unwrap();

        let blob = ENCODER.encode(format!("nonce={}&admin=false", request.nonce));
        let sig = Secret::from(SECRET).sign(&blob);

        for index in 0..blob.len() {
            let url = callback_url(&replace_char(&blob, index), &sig);
            assert_eq!(provider.validate_auth(&slot, &url).await, Ok(None));
        }

        for index in 0..sig.len() {
            let url = callback_url(&blob, &replace_char(&sig, index));
            assert_eq!(provider.validate_auth(&slot, &url).await, Ok(None));
        }

        // failed attempts leave the pending request in place
        let url = callback_url(&blob, &sig);
        assert!(provider.validate_auth(&slot, &url).await.unwrap().is_some());
    }

    /// Slot yielding to the executor around every access, like a networked store
    struct YieldingSlot(MemorySlot);

    #[async_trait]
    impl SessionSlot for YieldingSlot {
        async fn load(&self) -> Result<SsoState> {
            async_std::task::yield_now().await;
            let state = self.0.load().await;
            async_std::task::yield_now().await;
            state
        }

        async fn store(&self, state: SsoState) -> Success {
            async_std::task::yield_now().await;
            self.0.store(state).await
        }

        async fn consume(&self, nonce: &str, lifetime: Option<i64>) -> Result<Claim> {
            async_std::task::yield_now().await;
            let claim = self.0.consume(nonce, lifetime).await;
            async_std::task::yield_now().await;
            claim
        }
    }

    #[async_std::test]
    async fn accepts_concurrent_deliveries_once() {
        let provider = provider();
        let slot = YieldingSlot(MemorySlot::default());

        let request = provider
            .generate_auth_request(&slot, RequestOptions::default())
            .await
            .unwrap();

        let url = discourse_response(SECRET, &format!("nonce={}", request.nonce));

        let (first, second) = futures::join!(
            provider.validate_auth(&slot, &url),
            provider.validate_auth(&slot, &url)
        );

        let accepted = [first.unwrap(), second.unwrap()]
            .iter()
            .filter(|payload| payload.is_some())
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(slot.load().await, Ok(SsoState::Consumed));
    }

    #[async_std::test]
    async fn rejects_foreign_secret() {
        let provider = provider();
        let slot = MemorySlot::default();

        let request = provider
            .generate_auth_request(&slot, RequestOptions::default())
            .await
            .unwrap();

        let url = discourse_response("not-the-secret", &format!("nonce={}", request.nonce));
        assert_eq!(provider.validate_auth(&slot, &url).await, Ok(None));
    }

    #[async_std::test]
    async fn rejects_replayed_response() {
        let provider = provider();
        let slot = MemorySlot::default();

        let request = provider
            .generate_auth_request(&slot, RequestOptions::default())
            .await
            .unwrap();

        let url = discourse_response(SECRET, &format!("nonce={}", request.nonce));

        assert!(provider.validate_auth(&slot, &url).await.unwrap().is_some());
        assert_eq!(provider.validate_auth(&slot, &url).await, Ok(None));
    }

    #[async_std::test]
    async fn rejects_unknown_nonce() {
        let provider = provider();
        let slot = MemorySlot::default();

        provider
            .generate_auth_request(&slot, RequestOptions::default())
            .await
            .unwrap();

        let url = discourse_response(SECRET, "nonce=0123456789abcdef0123456789abcdef");
        assert_eq!(provider.validate_auth(&slot, &url).await, Ok(None));

        let url = discourse_response(SECRET, "external_id=42");
        assert_eq!(provider.validate_auth(&slot, &url).await, Ok(None));
    }

    #[async_std::test]
    async fn rejects_response_without_request() {
        let provider = provider();

        let url = discourse_response(SECRET, "nonce=0123456789abcdef0123456789abcdef");
        assert_eq!(
            provider.validate_auth(&MemorySlot::default(), &url).await,
            Ok(None)
        );
    }

    #[async_std::test]
    async fn rejects_response_to_replaced_request() {
        let provider = provider();
        let slot = MemorySlot::default();

        let first = provider
            .generate_auth_request(&slot, RequestOptions::default())
            .await
            .unwrap();
        let second = provider
            .generate_auth_request(&slot, RequestOptions::default())
            .await
            .unwrap();

        let url = discourse_response(SECRET, &format!("nonce={}", first.nonce));
        assert_eq!(provider.validate_auth(&slot, &url).await, Ok(None));

        let url = discourse_response(SECRET, &format!("nonce={}", second.nonce));
        assert!(provider.validate_auth(&slot, &url).await.unwrap().is_some());
    }

    #[async_std::test]
    async fn rejects_expired_request() {
        let provider = SsoProvider::new(Config {
            nonce_lifetime: Some(600),
            ..config()
        })
        .unwrap();

        let slot = MemorySlot::default();
        let pending = PendingRequest {
            created_at: Utc::now() - Duration::minutes(11),
            ..PendingRequest::new(RequestOptions::default()).unwrap()
        };

        slot.store(SsoState::Pending(pending.clone())).await.unwrap();

        let url = discourse_response(SECRET, &format!("nonce={}", pending.nonce));
        assert_eq!(provider.validate_auth(&slot, &url).await, Ok(None));
        assert_eq!(slot.load().await, Ok(SsoState::Pending(pending)));
    }

    #[async_std::test]
    async fn fails_on_malformed_requests() {
        let provider = provider();
        let slot = MemorySlot::default();

        assert_eq!(
            provider.validate_auth(&slot, "/auth/discourse/callback").await,
            Err(Error::BadUrl)
        );
        assert_eq!(
            provider.validate_auth(&slot, "/auth/discourse/callback?").await,
            Err(Error::BadParam { with: "sso" })
        );
        assert_eq!(
            provider
                .validate_auth(&slot, "/auth/discourse/callback?sig=abcd")
                .await,
            Err(Error::BadParam { with: "sso" })
        );
        assert_eq!(
            provider
                .validate_auth(&slot, "/auth/discourse/callback?sso=bm9uY2U9")
                .await,
            Err(Error::BadParam { with: "sig" })
        );
        assert_eq!(
            provider
                .validate_auth(&slot, "/auth/discourse/callback?sso=&sig=abcd")
                .await,
            Err(Error::BadParam { with: "sso" })
        );
    }

    #[async_std::test]
    async fn warns_without_leaking_secret() {
        let logger = Arc::new(CaptureLogger::default());
        let provider = SsoProvider::with_logger(config(), logger.clone()).unwrap();
        let slot = MemorySlot::default();

        provider
            .generate_auth_request(&slot, RequestOptions::default())
            .await
            .unwrap();

        // debug output is off by default
        assert!(logger.records().is_empty());

        let url = discourse_response(SECRET, "nonce=0123456789abcdef0123456789abcdef");
        provider.validate_auth(&slot, &url).await.unwrap();
        let url = discourse_response("wrong", "nonce=0123456789abcdef0123456789abcdef");
        provider.validate_auth(&slot, &url).await.unwrap();

        let records = logger.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|(level, _)| *level == Level::Warn));
        assert!(records.iter().all(|(_, message)| !message.contains(SECRET)));
    }

    #[async_std::test]
    async fn logs_debug_output_when_enabled() {
        let logger = Arc::new(CaptureLogger::default());
        let provider = SsoProvider::with_logger(
            Config {
                debug: true,
                ..config()
            },
            logger.clone(),
        )
        .unwrap();

        let slot = MemorySlot::default();
        let request = provider
            .generate_auth_request(&slot, RequestOptions::default())
            .await
            .unwrap();

        let url = discourse_response(SECRET, &format!("nonce={}", request.nonce));
        provider.validate_auth(&slot, &url).await.unwrap();

        let records = logger.records();
        assert!(!records.is_empty());
        assert!(records.iter().all(|(level, _)| *level == Level::Debug));
        assert!(records.iter().all(|(_, message)| !message.contains(SECRET)));
    }
}
