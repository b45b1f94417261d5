pub mod session;
pub mod user;

pub use session::{Claims, Session, TokenPair};
pub use user::{
    CreateUser, ModuleActions, PermissionMap, Role, SessionCheckpoint, UpdateUser, User,
    UserInfo,
};
