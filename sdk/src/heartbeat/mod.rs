pub mod health_channel;
pub mod heartbeat_scheduler;
pub mod heartbeat_stats;
