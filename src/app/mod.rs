pub mod dispatch;
mod health;
