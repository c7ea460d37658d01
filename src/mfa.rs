//! Sources of MFA one-time codes.

pub trait CodeProvider: Send + Sync {
    /// Return a one-time code for the given MFA device. May block.
    fn code(&self, mfa_serial: &str) -> Result<String, crate::error::Error>;
}

/// Prompts on the terminal. Prompt and echo go to stderr.
#[derive(Debug, Default)]
pub struct TerminalCodeProvider;

impl CodeProvider for TerminalCodeProvider {
    fn code(&self, mfa_serial: &str) -> Result<String, crate::error::Error> {
        dialoguer::Input::<String>::new()
            .with_prompt(format!("MFA code for {mfa_serial}"))
            .interact_text()
            .map_err(|e| crate::error::Error::PromptError(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct StaticCodeProvider {
    code: String,
}

impl StaticCodeProvider {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

impl CodeProvider for StaticCodeProvider {
    fn code(&self, _mfa_serial: &str) -> Result<String, crate::error::Error> {
        Ok(self.code.clone())
    }
}
