/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `profile`: Profile and subscription plan
/// - `tasks`: Task submission and listing
/// - `evaluate`: AI evaluation of a task
/// - `evaluations`: Reading evaluation results
/// - `payments`: Report purchases and the payment webhook
/// - `dashboard`: Per-user summary figures

pub mod dashboard;
pub mod evaluate;
pub mod evaluations;
pub mod health;
pub mod payments;
pub mod profile;
pub mod tasks;
