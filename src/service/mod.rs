pub mod caching;
pub mod command;
pub mod router;
pub mod source;
pub mod view;
