pub mod contributors;
pub mod roles;

pub use contributors::{bulk_sync_contributors, sync_contributor, CONTRIBUTOR_KEY};
pub use roles::{classify_roles, Classification};
