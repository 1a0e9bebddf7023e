//! Shared types and ports for the scrapcore workspace: the error taxonomy,
//! wire DTOs exchanged between the Router/Worker/HTTP Surface,
//! the Task Queue Transport ports, and the client JWT signer
//! used by the HTTP Surface.

mod error;
pub mod jwt;
pub mod queue;
pub mod types;

#[cfg(feature = "aws")]
pub mod aws_queue;

pub use error::{Error, Result};
pub use jwt::{ClientTokenSigner, ClientTokenSignerConfig};
pub use queue::{LocalQueue, ResultQueue, TaskDelivery, TaskQueue};
pub use types::{ClientTokenClaims, JobKind, ResultEnvelope, TaskEnvelope};
