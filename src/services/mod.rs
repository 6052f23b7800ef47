pub mod excel;
pub mod export;
pub mod query;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;
