pub mod legacy;
pub mod migrations;
pub mod repository;
