//! Authentication service models

pub mod user;

pub use user::{
    GoogleLoginRequest, GoogleProfile, LoginRequest, LoginResponse, RegisterRequest, User,
};
