//! AI adapters - implementations of the AIProvider port.

mod http_provider;
mod mock_provider;
mod retrying_provider;

pub use http_provider::{parse_reply, HttpProvider, HttpProviderConfig};
pub use mock_provider::MockAIProvider;
pub use retrying_provider::{RetryPolicy, RetryingAIProvider};
