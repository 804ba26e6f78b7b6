//! Taleweave: Credits bounded context.
//!
//! Each member has an event-sourced credit account. The balance is the sum of
//! grants and refunds minus deductions, and a deduction is only recorded when
//! the balance covers it.

pub mod application;
pub mod domain;
