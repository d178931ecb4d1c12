pub mod board;
pub mod protocol;
pub mod types;
pub mod view_state;
