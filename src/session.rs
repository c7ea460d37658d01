//! Role-assumption session manager: reuse cached credentials or assume the role.

pub struct SessionManager<'a> {
    config: &'a crate::config::Config,
    service: &'a dyn crate::client::IdentityService,
    codes: &'a dyn crate::mfa::CodeProvider,
}

impl<'a> SessionManager<'a> {
    pub fn new(
        config: &'a crate::config::Config,
        service: &'a dyn crate::client::IdentityService,
        codes: &'a dyn crate::mfa::CodeProvider,
    ) -> Self {
        Self {
            config,
            service,
            codes,
        }
    }

    /// Produce credentials for a request. Stages run strictly in order; a fresh
    /// cache entry short-circuits everything after the lookup, MFA prompt included.
    pub async fn resolve(
        &self,
        request: &crate::request::RoleAssumptionRequest,
    ) -> Result<crate::credentials::CredentialSet, crate::error::Error> {
        use tracing::Instrument;

        request.validate()?;

        let span = tracing::info_span!("resolve", role_arn = %request.role_arn);
        async move {
            let key = request.cache_key();
            let cache = self.config.cache();

            if request.cache_enabled {
                if let Some(creds) = cache.load(&key, chrono::Utc::now()).await {
                    tracing::info!(message = "Using cached credentials", cache_key = %key, access_key_id = %creds.access_key_id, expiration = %creds.expiration);
                    return Ok(creds);
                }
                tracing::debug!(message = "Cache miss", cache_key = %key);
            }

            let mfa_serial = match request.mfa_serial {
                Some(ref s) => Some(s.clone()),
                None => self.discover_mfa_device().await,
            };

            let mfa = match mfa_serial {
                Some(serial_number) => {
                    let token_code = self.codes.code(&serial_number)?;
                    Some(crate::client::MfaToken {
                        serial_number,
                        token_code,
                    })
                }
                None => None,
            };

            let assume_request = crate::client::AssumeRoleRequest {
                role_arn: request.role_arn.clone(),
                role_session_name: request.session_name.clone(),
                duration_seconds: request.duration_seconds,
                external_id: request.external_id.clone(),
                mfa,
            };
            tracing::debug!(message = "Assuming role", request = ?assume_request);

            let creds = match self.service.assume_role(&assume_request).await {
                Ok(v) => v,
                Err(e) => {
                    tracing::error!(message = "Failed to assume role", role_arn = %request.role_arn, error = %e);
                    return Err(e);
                }
            };
            tracing::info!(message = "Assumed role", access_key_id = %creds.access_key_id, expiration = %creds.expiration);

            if request.cache_enabled {
                match cache.store(&key, &creds).await {
                    Ok(_) => {
                        tracing::debug!(message = "Saved credentials to cache", path = ?cache.path(&key))
                    }
                    Err(e) => {
                        tracing::warn!(message = "Failed to save credentials to cache; continuing", path = ?cache.path(&key), error = ?e)
                    }
                }
            }

            Ok(creds)
        }
        .instrument(span)
        .await
    }

    /// First MFA device registered to the caller. Listing failures mean no device.
    async fn discover_mfa_device(&self) -> Option<String> {
        match self.service.list_mfa_devices().await {
            Ok(devices) => {
                let first = devices.into_iter().next();
                match first {
                    Some(ref d) => tracing::info!(message = "Using MFA device", mfa_serial = %d),
                    None => tracing::debug!("No MFA device registered; proceeding without MFA"),
                }
                first
            }
            Err(e) => {
                tracing::debug!(message = "Failed to list MFA devices; proceeding without MFA", error = %e);
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ROLE: &str = "arn:aws:iam::123456789012:role/Admin";
    const MFA_SERIAL: &str = "arn:aws:iam::123456789012:mfa/operator";

    fn request() -> crate::request::RoleAssumptionRequest {
        crate::request::RoleAssumptionRequest::new(ROLE)
    }

    #[tokio::test]
    async fn test_cache_miss_without_mfa() {
        let config = crate::dev::TestConfig::new();
        let service = crate::dev::StubIdentityService::new();
        let codes = crate::dev::PanickingCodeProvider;
        let manager = SessionManager::new(&config, &service, &codes);

        let creds = manager.resolve(&request()).await.unwrap();
        assert_eq!(creds, service.issued());
        assert_eq!(service.assume_calls(), 1);
        assert_eq!(service.list_calls(), 1);

        let sent = service.last_request().unwrap();
        assert_eq!(sent.role_arn, ROLE);
        assert_eq!(sent.duration_seconds, 3600);
        assert_eq!(sent.external_id, None);
        assert_eq!(sent.mfa, None);

        let cached = config.cache().read(&request().cache_key()).await.unwrap();
        assert_eq!(cached, creds);
        assert!(cached.is_fresh(chrono::Utc::now()));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_external_calls() {
        let config = crate::dev::TestConfig::new();
        let cached = crate::dev::credentials_expiring_in(1000);
        config
            .cache()
            .store(&request().cache_key(), &cached)
            .await
            .unwrap();

        let service = crate::dev::StubIdentityService::new().with_mfa_devices(&[MFA_SERIAL]);
        let codes = crate::dev::PanickingCodeProvider;
        let manager = SessionManager::new(&config, &service, &codes);

        let first = manager.resolve(&request()).await.unwrap();
        let second = manager.resolve(&request()).await.unwrap();
        assert_eq!(first, cached);
        assert_eq!(second, cached);
        assert_eq!(service.assume_calls(), 0);
        assert_eq!(service.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_cache_entry_is_replaced() {
        let config = crate::dev::TestConfig::new();
        let stale = crate::dev::credentials_expiring_in(100);
        config
            .cache()
            .store(&request().cache_key(), &stale)
            .await
            .unwrap();

        let service = crate::dev::StubIdentityService::new();
        let codes = crate::dev::PanickingCodeProvider;
        let manager = SessionManager::new(&config, &service, &codes);

        let creds = manager.resolve(&request()).await.unwrap();
        assert_eq!(service.assume_calls(), 1);
        assert_ne!(creds, stale);
        assert_eq!(
            config.cache().read(&request().cache_key()).await,
            Some(service.issued())
        );
    }

    #[tokio::test]
    async fn test_cache_disabled_always_assumes() {
        let config = crate::dev::TestConfig::new();
        let service = crate::dev::StubIdentityService::new();
        let codes = crate::dev::PanickingCodeProvider;
        let manager = SessionManager::new(&config, &service, &codes);

        let mut req = request();
        req.cache_enabled = false;
        manager.resolve(&req).await.unwrap();
        manager.resolve(&req).await.unwrap();

        assert_eq!(service.assume_calls(), 2);
        assert!(config.cache().read(&req.cache_key()).await.is_none());
    }

    #[tokio::test]
    async fn test_explicit_mfa_serial_prompts_without_listing() {
        let config = crate::dev::TestConfig::new();
        let service = crate::dev::StubIdentityService::new();
        let codes = crate::mfa::StaticCodeProvider::new("123456");
        let manager = SessionManager::new(&config, &service, &codes);

        let mut req = request();
        req.mfa_serial = Some(MFA_SERIAL.to_string());
        req.external_id = Some("confused-deputy".to_string());
        manager.resolve(&req).await.unwrap();

        assert_eq!(service.list_calls(), 0);
        let sent = service.last_request().unwrap();
        assert_eq!(sent.external_id.as_deref(), Some("confused-deputy"));
        assert_eq!(
            sent.mfa,
            Some(crate::client::MfaToken {
                serial_number: MFA_SERIAL.to_string(),
                token_code: "123456".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_discovered_mfa_device_is_used() {
        let config = crate::dev::TestConfig::new();
        let service = crate::dev::StubIdentityService::new()
            .with_mfa_devices(&[MFA_SERIAL, "arn:aws:iam::123456789012:mfa/backup"]);
        let codes = crate::mfa::StaticCodeProvider::new("654321");
        let manager = SessionManager::new(&config, &service, &codes);

        manager.resolve(&request()).await.unwrap();

        let sent = service.last_request().unwrap();
        assert_eq!(
            sent.mfa.map(|m| m.serial_number),
            Some(MFA_SERIAL.to_string())
        );
    }

    #[tokio::test]
    async fn test_mfa_listing_failure_is_not_fatal() {
        let config = crate::dev::TestConfig::new();
        let service = crate::dev::StubIdentityService::new().with_failing_mfa_listing();
        let codes = crate::dev::PanickingCodeProvider;
        let manager = SessionManager::new(&config, &service, &codes);

        manager.resolve(&request()).await.unwrap();
        assert_eq!(service.list_calls(), 1);
        assert_eq!(service.assume_calls(), 1);
        assert_eq!(service.last_request().unwrap().mfa, None);
    }

    #[tokio::test]
    async fn test_validation_failure_makes_no_calls() {
        let config = crate::dev::TestConfig::new();
        let service = crate::dev::StubIdentityService::new();
        let codes = crate::dev::PanickingCodeProvider;
        let manager = SessionManager::new(&config, &service, &codes);

        let req = crate::request::RoleAssumptionRequest::new("");
        let err = manager.resolve(&req).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(service.list_calls(), 0);
        assert_eq!(service.assume_calls(), 0);
        assert_eq!(std::fs::read_dir(config.cache_dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_assume_role_failure_is_fatal() {
        let config = crate::dev::TestConfig::new();
        let service = crate::dev::StubIdentityService::new().with_assume_role_error(
            "AccessDenied: User is not authorized to perform: sts:AssumeRole",
        );
        let codes = crate::dev::PanickingCodeProvider;
        let manager = SessionManager::new(&config, &service, &codes);

        let err = manager.resolve(&request()).await.unwrap_err();
        assert!(err
            .to_string()
            .contains("User is not authorized to perform: sts:AssumeRole"));
        assert_eq!(service.assume_calls(), 1);
        assert!(config.cache().read(&request().cache_key()).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_write_failure_is_not_fatal() {
        let tmpdir = temp_dir::TempDir::with_prefix("assumer-dev").unwrap();
        let blocker = tmpdir.path().join("not-a-directory");
        std::fs::write(&blocker, b"").unwrap();
        let config = crate::config::Config::new(Some(blocker.join("cache"))).unwrap();

        let service = crate::dev::StubIdentityService::new();
        let codes = crate::dev::PanickingCodeProvider;
        let manager = SessionManager::new(&config, &service, &codes);

        let creds = manager.resolve(&request()).await.unwrap();
        assert_eq!(creds, service.issued());
    }

    #[tokio::test]
    async fn test_requests_sharing_a_key_share_the_entry() {
        let config = crate::dev::TestConfig::new();
        let service = crate::dev::StubIdentityService::new();
        let codes = crate::dev::PanickingCodeProvider;
        let manager = SessionManager::new(&config, &service, &codes);

        let first = request();
        let mut second = request();
        second.session_name = "another-session".to_string();
        second.duration_seconds = 7200;

        manager.resolve(&first).await.unwrap();
        manager.resolve(&second).await.unwrap();
        assert_eq!(service.assume_calls(), 1);

        let mut third = request();
        third.external_id = Some("other".to_string());
        manager.resolve(&third).await.unwrap();
        assert_eq!(service.assume_calls(), 2);
    }
}
