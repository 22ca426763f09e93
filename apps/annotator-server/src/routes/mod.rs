//! Route modules for the PDF Annotator server

pub mod auth;
pub mod documents;
pub mod health;
pub mod highlights;
