pub mod board;
pub mod dispatch;
