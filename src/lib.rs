pub mod alerts; // Daily expiry alert job
pub mod api; // Admin API (axum)
pub mod config;
pub mod dashboard; // Expiry schedule read model
pub mod db;
pub mod export; // CSV export
pub mod mailer; // Delivery collaborator (Resend)
pub mod models;
pub mod scheduler; // Optional in-process daily trigger
pub mod status; // Expiry status classifier
