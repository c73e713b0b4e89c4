pub mod health_check;
pub mod bounded_invoker;
