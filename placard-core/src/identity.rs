// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Device Identity
//!
//! Immutable per-process snapshot of the publisher credentials and the
//! device environment that every signed request carries.

use std::fmt;

use crate::config::ConfigurationError;

/// Data connection type reported with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionType {
    /// No active data connection.
    #[default]
    NoNetwork,
    /// Mobile data.
    Mobile,
    /// Wi-Fi.
    Wifi,
    /// The host may not query the network state.
    NoPermission,
}

impl ConnectionType {
    /// Value of the `connection` parameter, `None` when it must be omitted.
    pub fn param_value(&self) -> Option<&'static str> {
        match self {
            ConnectionType::NoNetwork => Some("0"),
            ConnectionType::Mobile => Some("1"),
            ConnectionType::Wifi => Some("2"),
            ConnectionType::NoPermission => None,
        }
    }
}

/// Screen size class, sent as `idiom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenSize {
    /// Small handsets.
    Small,
    /// Regular handsets.
    #[default]
    Normal,
    /// Small tablets.
    Large,
    /// Tablets.
    XLarge,
}

impl ScreenSize {
    /// Numeric code used on the wire.
    pub fn code(&self) -> u8 {
        match self {
            ScreenSize::Small => 1,
            ScreenSize::Normal => 2,
            ScreenSize::Large => 3,
            ScreenSize::XLarge => 4,
        }
    }
}

/// Publisher credentials plus device/app environment.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    token: String,
    secret: String,
    device_id: Option<String>,
    app_id: String,
    app_version: String,
    hardware: String,
    os_name: String,
    os_version: String,
    screen_size: ScreenSize,
    width: u32,
    height: u32,
    dpi: u32,
    orientation: u16,
    language: String,
    connection: ConnectionType,
}

impl DeviceIdentity {
    /// Starts building an identity for the given publisher credentials.
    pub fn builder(token: impl Into<String>, secret: impl Into<String>) -> DeviceIdentityBuilder {
        DeviceIdentityBuilder::new(token, secret)
    }

    /// Fails unless both token and secret are non-empty.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.token.is_empty() {
            return Err(ConfigurationError::MissingToken);
        }
        if self.secret.is_empty() {
            return Err(ConfigurationError::MissingSecret);
        }
        Ok(())
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Device id as sent on the wire (`"null"` when unknown).
    pub fn device_param(&self) -> &str {
        self.device_id.as_deref().unwrap_or("null")
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    pub fn hardware(&self) -> &str {
        &self.hardware
    }

    /// OS name and version joined by a space.
    pub fn os(&self) -> String {
        format!("{} {}", self.os_name, self.os_version)
    }

    pub fn screen_size(&self) -> ScreenSize {
        self.screen_size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Display rotation in degrees.
    pub fn orientation(&self) -> u16 {
        self.orientation
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn connection(&self) -> ConnectionType {
        self.connection
    }
}

impl fmt::Debug for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceIdentity")
            .field("token", &self.token)
            .field("secret", &"<redacted>")
            .field("device_id", &self.device_id)
            .field("app_id", &self.app_id)
            .field("app_version", &self.app_version)
            .field("os", &self.os())
            .field("connection", &self.connection)
            .finish()
    }
}

/// Builder for [`DeviceIdentity`].
#[derive(Debug, Clone)]
pub struct DeviceIdentityBuilder {
    identity: DeviceIdentity,
}

impl DeviceIdentityBuilder {
    /// Creates a builder with neutral device defaults.
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        DeviceIdentityBuilder {
            identity: DeviceIdentity {
                token: token.into(),
                secret: secret.into(),
                device_id: None,
                app_id: String::new(),
                app_version: String::new(),
                hardware: String::new(),
                os_name: std::env::consts::OS.to_string(),
                os_version: String::new(),
                screen_size: ScreenSize::default(),
                width: 0,
                height: 0,
                dpi: 0,
                orientation: 0,
                language: "en".to_string(),
                connection: ConnectionType::default(),
            },
        }
    }

    pub fn device_id(mut self, device_id: impl Into<String>) -> Self {
        self.identity.device_id = Some(device_id.into());
        self
    }

    pub fn app(mut self, app_id: impl Into<String>, app_version: impl Into<String>) -> Self {
        self.identity.app_id = app_id.into();
        self.identity.app_version = app_version.into();
        self
    }

    pub fn hardware(mut self, hardware: impl Into<String>) -> Self {
        self.identity.hardware = hardware.into();
        self
    }

    pub fn os(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.identity.os_name = name.into();
        self.identity.os_version = version.into();
        self
    }

    /// Screen dimensions in pixels, density in dpi.
    pub fn screen(mut self, size: ScreenSize, width: u32, height: u32, dpi: u32) -> Self {
        self.identity.screen_size = size;
        self.identity.width = width;
        self.identity.height = height;
        self.identity.dpi = dpi;
        self
    }

    pub fn orientation(mut self, degrees: u16) -> Self {
        self.identity.orientation = degrees;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.identity.language = language.into();
        self
    }

    pub fn connection(mut self, connection: ConnectionType) -> Self {
        self.identity.connection = connection;
        self
    }

    pub fn build(self) -> DeviceIdentity {
        self.identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_device_id_is_sent_as_null() {
        let identity = DeviceIdentity::builder("tok", "sec").build();
        assert_eq!(identity.device_param(), "null");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let identity = DeviceIdentity::builder("tok", "hunter2").build();
        let printed = format!("{:?}", identity);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_no_permission_omits_connection() {
        assert_eq!(ConnectionType::NoPermission.param_value(), None);
        assert_eq!(ConnectionType::Wifi.param_value(), Some("2"));
    }
}
