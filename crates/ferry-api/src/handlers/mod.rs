pub mod alien;
pub mod health;
