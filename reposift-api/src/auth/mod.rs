mod backend;
mod router;

pub use backend::AuthBackend;
pub use backend::AuthSession;
pub use router::router;
