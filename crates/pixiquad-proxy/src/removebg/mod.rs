pub mod handlers;
pub mod upstream;
