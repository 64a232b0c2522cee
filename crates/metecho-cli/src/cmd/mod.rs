pub mod config;
pub mod projects;
pub mod repos;
pub mod session;
