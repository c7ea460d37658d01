pub struct TestConfig {
    inner: crate::config::Config,
    pub tmpdir: temp_dir::TempDir,
}

impl std::ops::Deref for TestConfig {
    type Target = crate::config::Config;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl TestConfig {
    pub fn new() -> Self {
        let tmpdir = temp_dir::TempDir::with_prefix("assumer-dev").unwrap();
        let inner = crate::config::Config::new(Some(tmpdir.path().into())).unwrap();
        Self { inner, tmpdir }
    }
}

pub fn credentials_expiring_in(seconds: i64) -> crate::credentials::CredentialSet {
    crate::credentials::CredentialSet {
        access_key_id: "ASIACACHEDEXAMPLE".to_string(),
        secret_access_key: "cached/secret+key".into(),
        session_token: "cached-session-token".to_string(),
        expiration: chrono::Utc::now() + chrono::Duration::seconds(seconds),
    }
}

/// Identity service double counting every call it receives.
pub struct StubIdentityService {
    mfa_devices: Result<Vec<String>, String>,
    assume_role_result: Result<crate::credentials::CredentialSet, String>,
    list_calls: std::sync::atomic::AtomicUsize,
    assume_calls: std::sync::atomic::AtomicUsize,
    last_request: std::sync::Mutex<Option<crate::client::AssumeRoleRequest>>,
}

impl StubIdentityService {
    pub fn new() -> Self {
        let expiration = chrono::Utc::now() + chrono::Duration::seconds(3600);
        Self {
            mfa_devices: Ok(Vec::new()),
            assume_role_result: Ok(crate::credentials::CredentialSet {
                access_key_id: "ASIAISSUEDEXAMPLE".to_string(),
                secret_access_key: "issued/secret+key".into(),
                session_token: "issued-session-token".to_string(),
                expiration: chrono::DateTime::<chrono::Utc>::from_timestamp(expiration.timestamp(), 0)
                    .unwrap(),
            }),
            list_calls: Default::default(),
            assume_calls: Default::default(),
            last_request: Default::default(),
        }
    }

    pub fn with_mfa_devices(mut self, devices: &[&str]) -> Self {
        self.mfa_devices = Ok(devices.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn with_failing_mfa_listing(mut self) -> Self {
        self.mfa_devices = Err("AccessDenied: not authorized to perform iam:ListMFADevices".to_string());
        self
    }

    pub fn with_assume_role_error(mut self, message: &str) -> Self {
        self.assume_role_result = Err(message.to_string());
        self
    }

    /// Credentials returned by a successful assume_role
    pub fn issued(&self) -> crate::credentials::CredentialSet {
        self.assume_role_result.clone().unwrap()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn assume_calls(&self) -> usize {
        self.assume_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<crate::client::AssumeRoleRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl crate::client::IdentityService for StubIdentityService {
    async fn list_mfa_devices(&self) -> Result<Vec<String>, crate::error::Error> {
        self.list_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.mfa_devices
            .clone()
            .map_err(crate::error::Error::ApiError)
    }

    async fn assume_role(
        &self,
        request: &crate::client::AssumeRoleRequest,
    ) -> Result<crate::credentials::CredentialSet, crate::error::Error> {
        self.assume_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.assume_role_result
            .clone()
            .map_err(crate::error::Error::ApiError)
    }
}

/// For flows that must never reach the MFA prompt
pub struct PanickingCodeProvider;

impl crate::mfa::CodeProvider for PanickingCodeProvider {
    fn code(&self, mfa_serial: &str) -> Result<String, crate::error::Error> {
        panic!("unexpected MFA prompt for {mfa_serial}");
    }
}
