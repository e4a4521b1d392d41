mod identity;
mod user;

pub use identity::{merge_metadata, metadata_object, NewIdentity, UserIdentity, IDENTITY_COLUMNS};
pub use user::{NewUser, User, UserPatch, USER_COLUMNS};
