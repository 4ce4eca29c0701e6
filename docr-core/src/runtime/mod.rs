pub mod handler;
pub mod queue;
pub mod storage;
pub mod types;
pub mod worker;
