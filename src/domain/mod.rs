//! Pure data model: no I/O originates here.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod payment;
