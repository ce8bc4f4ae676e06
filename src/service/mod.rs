pub mod auth;
pub mod cache;
pub mod config;
pub mod email;
pub mod seeder;
pub mod token;
