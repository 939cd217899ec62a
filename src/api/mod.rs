pub mod products;
pub mod search;
pub mod translate;
