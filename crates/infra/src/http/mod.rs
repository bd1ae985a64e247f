//! HTTP transport and the authenticated request engine

pub mod client;
pub mod engine;

pub use client::{HttpClient, HttpClientBuilder};
pub use engine::{
    AuthenticatedClient, AuthenticatedClientBuilder, Authenticator, Interceptor, ResponseHead,
};
