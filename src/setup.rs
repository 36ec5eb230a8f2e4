//! Connection Settings Validation
//!
//! Checks user-supplied host and credentials before they are persisted.
//! Failures are reported as one of two [`SetupError`] kinds so the caller
//! can tell an unreachable device from rejected credentials:
//!
//! | Condition                              | Error           |
//! |----------------------------------------|-----------------|
//! | connect fails                          | `CannotConnect` |
//! | login call fails in transport          | `CannotConnect` |
//! | login returns `success: false`         | `InvalidAuth`   |
//! | device rejects credentials (`Auth`)    | `InvalidAuth`   |

use crate::config;
use crate::error::{FnosError, SetupError};
use crate::fnos::FnosApi;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

/// User input for adding a device.
#[derive(Debug, Clone)]
pub struct SetupInput {
    pub host: String,
    pub username: String,
    pub password: SecretString,
    pub name: Option<String>,
}

impl SetupInput {
    /// Entry title: the friendly name, or the host when no name is given.
    pub fn title(&self) -> String {
        config::entry_title(self.name.as_deref(), &self.host)
    }

    fn check(&self) -> Result<(), SetupError> {
        if self.host.trim().is_empty() {
            return Err(SetupError::InvalidInput("host must not be empty".to_string()));
        }
        if self.username.trim().is_empty() {
            return Err(SetupError::InvalidInput(
                "username must not be empty".to_string(),
            ));
        }
        if self.password.expose_secret().is_empty() {
            return Err(SetupError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Short-lived connection used only to validate settings.
pub struct FnosHub<C> {
    host: String,
    client: C,
    connected: bool,
}

impl<C: FnosApi> FnosHub<C> {
    pub fn new(host: impl Into<String>, client: C) -> Self {
        Self {
            host: host.into(),
            client,
            connected: false,
        }
    }

    /// Connect and log in.
    pub async fn authenticate(
        &mut self,
        username: &str,
        password: &SecretString,
    ) -> Result<(), SetupError> {
        if let Err(e) = self.client.connect(&self.host).await {
            warn!("Cannot connect to {}: {}", self.host, e);
            return Err(SetupError::CannotConnect(e.to_string()));
        }
        self.connected = true;

        match self.client.login(username, password).await {
            Ok(result) if result.success => {
                info!("Authenticated to {} as {}", self.host, username);
                Ok(())
            }
            Ok(_) => {
                warn!("Login to {} rejected for {}", self.host, username);
                Err(SetupError::InvalidAuth(format!(
                    "login rejected for user '{}'",
                    username
                )))
            }
            Err(FnosError::Auth(reason)) => {
                warn!("Login to {} rejected: {}", self.host, reason);
                Err(SetupError::InvalidAuth(reason))
            }
            Err(e) => {
                warn!("Login to {} failed: {}", self.host, e);
                Err(SetupError::CannotConnect(e.to_string()))
            }
        }
    }

    /// Release the validation connection. Does nothing if never connected.
    pub async fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        if let Err(e) = self.client.disconnect().await {
            warn!("Disconnect from {} failed: {}", self.host, e);
        }
        self.connected = false;
    }
}

/// Validate `input` against the device and return the entry title.
///
/// The validation connection is always released before returning.
pub async fn validate_input<C: FnosApi>(client: C, input: &SetupInput) -> Result<String, SetupError> {
    input.check()?;

    let mut hub = FnosHub::new(input.host.trim(), client);
    let result = hub.authenticate(input.username.trim(), &input.password).await;
    hub.disconnect().await;

    result.map(|()| input.title())
}
