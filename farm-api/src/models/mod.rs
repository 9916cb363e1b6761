pub mod booking;
pub mod farm;
pub mod industry;
pub mod inventory;
pub mod messaging;
pub mod plot;
pub mod revoked_token;
pub mod role;
pub mod task;
pub mod text_enum;
pub mod user;
pub mod vendor;

// Re-export models for easier access
pub use booking::*;
pub use farm::*;
pub use industry::*;
pub use inventory::*;
pub use messaging::*;
pub use plot::*;
pub use revoked_token::*;
pub use role::*;
pub use task::*;
pub use user::*;
pub use vendor::*;
