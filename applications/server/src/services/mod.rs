/// Business logic services
pub mod users;

pub use users::{QueryOutcome, UserService};
