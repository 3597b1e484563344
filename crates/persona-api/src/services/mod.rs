pub mod characters;
pub mod chat;
pub mod listing;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_support;

pub use characters::{CharacterForm, CharacterService};
pub use chat::{ChatCompletionClient, ChatMessage, ChatRole, ChatService, OpenAiChatClient};
pub use listing::ListingService;
pub use upload::{FsJanitor, Janitor, UploadOrchestrator};
