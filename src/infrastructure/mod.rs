pub mod database;
pub mod network;
pub mod notification;
pub mod offline;
