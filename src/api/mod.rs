pub mod backend;
pub mod http;
pub mod types;

pub use backend::{Backend, BackendError};
pub use http::HttpBackend;
pub use types::{AckResponse, CommentResponse, CommentView, LikeResponse, PostId};
