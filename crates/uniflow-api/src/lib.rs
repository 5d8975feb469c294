// uniflow-api: Session login and request execution against a UniFi controller

pub mod client;
pub mod endpoints;
pub mod error;
pub mod session;
pub mod transport;

pub use client::{ApiRequest, ControllerClient};
pub use endpoints::{Endpoints, Route};
pub use error::Error;
pub use session::{Session, extract_session_cookie};
pub use transport::{TlsMode, TransportConfig};

pub use reqwest::Method;
