mod ids;
mod user;

pub use ids::UserId;
pub use user::{NewUser, SearchCriteria, User, UserInput, UserPatch};
