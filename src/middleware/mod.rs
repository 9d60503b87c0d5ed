/// Middleware module
///
/// Request-level concerns shared by the routes: authentication of protected
/// handlers and the file server hit counter.

mod authenticated_user;
mod hit_counter;

pub use hit_counter::{FileserverHits, HitCounter};
