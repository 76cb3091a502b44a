pub mod builder;
pub mod connection;
pub mod limits;
pub mod pagination;
pub mod query;
pub mod readonly;
pub mod schema;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;
