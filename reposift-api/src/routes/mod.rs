pub(crate) mod admin;
pub(crate) mod error;
pub(crate) mod labels;
pub(crate) mod reports;
pub(crate) mod repositories;
pub(crate) mod search;
pub(crate) mod users;

pub(crate) use error::ApiError;
