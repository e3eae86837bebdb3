mod auth;
mod handlers;
mod server;

pub use auth::{AdminUser, CurrentUser, USER_ID_HEADER};
pub use server::{HttpServer, HttpServerConfig};
