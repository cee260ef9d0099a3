mod health;
mod highways;
mod locate;
mod resolve;

pub use health::health_check;
pub use highways::validate_km;
pub use locate::{locate_km, point_at_km};
pub use resolve::handle_resolve;
