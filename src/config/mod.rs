pub mod settings;

pub use settings::{Configuration, EncryptedToken};
