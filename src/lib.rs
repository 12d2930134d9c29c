//! Core library exports for the storefront catalog sync.
//!
//! Storefront `products.json` feeds are mapped into product and variant rows,
//! appended to CSV datasets and mirrored into spreadsheet tabs.

pub mod cli;
pub mod domain;
pub mod html;
pub mod models;
pub mod repository;
pub mod services;
pub mod sheets;
