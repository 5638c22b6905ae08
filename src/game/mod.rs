pub mod types;
pub mod settings;
pub mod board;
pub mod rules;
pub mod history;
pub mod state;
pub mod engine;
pub mod scheduler;
pub mod observer;
pub mod connect;

pub use types::*;
pub use settings::*;
pub use board::*;
pub use rules::*;
pub use history::*;
pub use state::*;
pub use engine::*;
pub use scheduler::*;
pub use observer::*;
pub use connect::*;
