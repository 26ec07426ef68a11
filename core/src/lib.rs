pub mod aggregate;
pub mod db;
pub mod error;
pub mod favorites;
pub mod goal;
pub mod matcher;
pub mod models;
pub mod nutrients;
pub mod repository;
mod seed;
pub mod service;
