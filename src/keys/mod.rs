pub mod codec;
pub mod composite;
