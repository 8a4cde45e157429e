//! Domain models shared across crates.

pub mod user;
pub mod video;

pub use user::{
    LoginForm, NewUser, RegisterRequest, SignInType, TokenResponse, User, UserResponse, UserRole,
    UserStatus,
};
pub use video::{MessageResponse, NewVideo, Video, VideoFilter, VideoPage, VideoUpdate};
