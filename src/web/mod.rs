// file: src/web/mod.rs
// description: HTTP surface module exports
// reference: internal module structure

pub mod handlers;
pub mod render;
pub mod routing;
pub mod server;

pub use render::{ENGINE_NAME, render_page};
pub use routing::create_router;
pub use server::start_server;
