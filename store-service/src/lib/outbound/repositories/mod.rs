pub mod product;
pub mod review;
pub mod user;

pub use product::PostgresProductRepository;
pub use review::PostgresReviewRepository;
pub use user::PostgresUserRepository;
