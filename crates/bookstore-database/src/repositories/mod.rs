//! Repository implementations for the user record.

pub mod memory;
pub mod user;

pub use memory::MemoryUserRepository;
pub use user::UserRepository;
