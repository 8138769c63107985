pub mod member;
pub mod tables;

pub use member::MemberProfile;
pub use tables::{registry, ALL_TABLES};
