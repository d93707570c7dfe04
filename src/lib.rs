#![doc = include_str!("../README.md")]

pub mod client;
pub mod config;
pub mod delegation;
pub mod device;
pub mod error;
pub mod http;
pub mod launcher;
pub mod scope;
pub mod session;
pub mod state;
pub mod token;

// Re-exports for convenient access
pub use client::{AuthClient, AuthorizationRequest, InteractiveLogin, PasswordLogin};
pub use config::AuthConfig;
pub use delegation::DelegationRequest;
pub use device::{DeviceIdentifier, FixedDeviceId};
pub use error::Error;
#[cfg(feature = "reqwest")]
pub use http::ReqwestExchange;
pub use http::{HttpExchange, HttpRequest, HttpResponse};
pub use launcher::{HeadlessLauncher, InteractiveLoginLauncher, LaunchOutcome};
pub use session::Session;
pub use token::{IdTokenClaims, decode_claims, has_expired};
