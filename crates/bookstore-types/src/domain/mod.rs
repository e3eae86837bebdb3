pub mod book;
pub mod cart;
pub mod category;
pub mod order;
pub mod page;
pub mod search;
pub mod user;

mod error;

pub use error::ValidationError;
