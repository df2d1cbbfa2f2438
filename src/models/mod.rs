// Models module - Database entity representations

pub mod card;
pub mod company;
pub mod employee;

pub use card::{Card, CardType, NewCard};
pub use company::Company;
pub use employee::Employee;
