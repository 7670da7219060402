//! Kernel module - infrastructure traits and dependencies.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::{CoreDeps, TelegramConnector, SEND_DELAY};
pub use traits::{
    BaseConnector, BasePlatformConnection, BaseSessionStore, Profile, RecipientRef, SendReceipt,
};
