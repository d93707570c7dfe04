use std::future::Future;

use crate::error::Error;

/// Supplies a stable per-device name, sent when a flow requests offline access.
///
/// The provider binds the issued refresh token to this value, so it should be
/// stable across app launches.
pub trait DeviceIdentifier: Send + Sync {
    fn device_id(&self) -> impl Future<Output = Result<String, Error>> + Send;
}

/// A device identifier known up front (e.g. read from host settings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDeviceId(String);

impl FixedDeviceId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DeviceIdentifier for FixedDeviceId {
    async fn device_id(&self) -> Result<String, Error> {
        Ok(self.0.clone())
    }
}
