//! HTTP route handlers.

mod chat;
mod pages;
mod session;
mod upload;

pub use chat::{ChatMessageRequest, ChatMessageResponse, chat_message_handler};
pub use pages::{chat_page, index_page};
pub use session::{
    ClearSessionResponse, StatusResponse, clear_session_handler, status_handler,
};
pub use upload::{UploadResponse, upload_handler};
