pub mod email;
pub mod error;
pub mod logger;
pub mod pdf;
pub mod slug;
