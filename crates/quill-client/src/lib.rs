//! Client side of the Quill blog: a typed HTTP client over the REST API,
//! the authentication session, and per-view fetch state.

pub mod api;
pub mod error;
pub mod session;
pub mod view;

pub use api::BlogClient;
pub use error::ClientError;
pub use session::{
    FileSessionStore, MemorySessionStore, Session, SessionContext, SessionEvent, SessionState,
    SessionStore,
};
pub use view::{CategoryListView, PostListView, PostView, ViewState};
