pub mod aggregator;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod mailer;
pub mod photo;
pub mod redmine;
pub mod template;
