//!
//! # ERP client
//!
//! Adapter between the document management dashboard and the legacy SOAP ERP service.
//!
//! Every business call goes through the same pipeline:
//! - the [`EndpointResolver`] picks the literal address for the configured target (direct host,
//!   local development proxy, or serverless relay);
//! - the [`SessionGate`] issues the connect call for the caller's identity and stops right there
//!   unless the service answers with the success sentinel;
//! - the [`EnvelopeCodec`] builds the SOAP envelope, the [`Transport`] posts it, and the codec
//!   decodes the answer into a [`ParsedResult`].
//!
//! Errors are never recovered inside the adapter, see [`Error`].
//!
//! ## Basic example
//!
//! ```no_run
//! use dms_erp_client::{documents, ClientConfig, ErpClient, ParsedResult};
//!
//! # async fn run() -> Result<(), dms_erp_client::Error> {
//! let config = ClientConfig::from_env().expect("valid environment");
//! let client = ErpClient::from_config(&config)?;
//!
//! let input = documents::get_master_list::Input {
//!     where_condition: Some(String::new()),
//!     orderby: Some("REF_SEQ_NO DESC".to_string()),
//!     include_emp_image: None,
//! };
//!
//! if let ParsedResult::List(rows) =
//!     documents::get_master_list(&client, &input, "alice@example.com", None).await?
//! {
//!     println!("{} documents", rows.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod connection;
pub mod dashboard;
pub mod data_model;
pub mod documents;
pub mod employees;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod file;
pub mod session;
pub mod tasks;
pub mod transport;
pub mod value;

pub use client::ErpClient;
pub use config::{ClientConfig, ConfigError, Environment};
pub use endpoint::{Endpoint, EndpointMode, EndpointResolver};
pub use envelope::{Envelope, EnvelopeCodec};
pub use error::{DecodeError, Error, TransportError};
pub use session::{with_session, ConnectPerCall, SessionGate};
pub use transport::{HttpTransport, Transport};
pub use value::{ParamValue, Params, ParsedResult, Record};
