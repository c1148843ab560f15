pub mod amqp;
pub mod cache;
pub mod db;
