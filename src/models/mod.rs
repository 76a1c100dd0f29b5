//! Data models for the Pinnacle site backend.
//!
//! Field names serialize in camelCase to match the admin panel's TypeScript interfaces.

mod contact;
mod content;
mod page;
mod user;

pub use contact::*;
pub use content::*;
pub use page::*;
pub use user::*;
