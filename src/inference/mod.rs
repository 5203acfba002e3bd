pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{CompletionProvider, CompletionRequest, ProviderError, build_messages};
pub use providers::AzureOpenAiProvider;
pub use types::{Conversation, Message, Role, SamplingConfig};
