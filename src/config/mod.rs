mod server;

pub use server::{DEFAULT_DATABASE_URI, DEFAULT_TOKEN_TTL_SECS, DatabaseLocation, ServerConfig};
