pub mod drive;
pub mod hardware;
