pub mod auth;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::{SessionStore, StaticSession};
pub use error::FetchError;
pub use transport::{DEFAULT_BASE_URL, HttpTransport, PostsApi};
pub use types::{
    Category, CreatePost, DeletePostResponse, ListPage, LoginRequest, LoginResponse, Post,
    UpdatePost, User,
};
