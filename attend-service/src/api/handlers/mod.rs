pub mod checkins;
pub mod events;
pub mod health;
pub mod jobs;
pub mod queue;
pub mod types;
