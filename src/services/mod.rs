// Services module - Business logic

pub mod card_factory;
pub mod card_repository;
pub mod card_service;
pub mod company;
pub mod crypto;
pub mod employee;
pub mod memory;
