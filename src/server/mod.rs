mod api;
pub mod links;
pub mod response;
mod router;
pub mod validation;

pub use links::LinkBuilder;
pub use router::{AppState, create_router};
