pub mod client_svc;
pub mod property_bag;
pub mod tenant_settings;

pub use client_svc::{ClientSvc, IdentityResponse};
