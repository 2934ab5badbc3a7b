pub mod audio;
pub mod health;
pub mod synthesis;
pub mod voices;
