//! Remote detection API: wire types and, with the `http` feature, the
//! `reqwest` client that implements the core collaborator traits.

pub mod wire;

#[cfg(feature = "http")]
pub mod http;

pub use wire::{
    CurrentModel, HealthReport, LoginToken, ModelList, VerificationLayers, claims_from_body,
    error_message,
};

#[cfg(feature = "http")]
pub use http::{
    ApiClient, ClientError, ConnectivityReport, GoogleFactCheck, MultiFactCheck, Probe,
};
