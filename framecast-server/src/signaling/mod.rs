mod handler;
mod ws;

pub use handler::ConnectionHandler;
pub use ws::ws_handler;
