pub mod policy;
pub mod product;
pub mod review;
pub mod user;
