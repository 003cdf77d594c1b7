pub mod common;
pub mod customer;
pub mod manual;
pub mod schema;
pub mod score;
