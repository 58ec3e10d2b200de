mod intelligence;
mod memory_store;
mod user_store;

pub use self::intelligence::{
    IntelligenceError, IntelligenceOperation, IntelligenceOutput, IntelligenceResult,
    TripIntelligence,
};
pub use self::memory_store::MemoryUserStore;
pub use self::user_store::{
    LedgerReceipt, UserStore, UserStoreError, UserStoreOperation, UserStoreOutput,
    UserStoreResult,
};

pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub intelligence: TripIntelligence<Event>,
    pub user_store: UserStore<Event>,
}
