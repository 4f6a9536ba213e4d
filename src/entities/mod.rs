//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod mapping;
pub mod payment;
pub mod user;

// Re-export specific types to avoid conflicts
pub use mapping::{Column as MappingColumn, Entity as Mapping, Model as MappingModel};
pub use payment::{
    Column as PaymentColumn, Entity as Payment, Model as PaymentModel, PaymentStatus,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
