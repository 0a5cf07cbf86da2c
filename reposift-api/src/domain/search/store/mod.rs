#[cfg(test)]
mod mock;
mod postgres;

#[cfg(test)]
pub use mock::MockSearchStore;
pub use postgres::PgSearchStore;
