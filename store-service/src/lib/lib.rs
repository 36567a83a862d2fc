pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::policy;
pub use domain::product;
pub use domain::review;
pub use domain::user;
pub use outbound::repositories;
