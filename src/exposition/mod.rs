//! Prometheus exposition of collected families
//!
//! [`render`] turns families into the text exposition format. The [`server`] module serves
//! that text over HTTP, running one fresh fetch and collection pass per scrape; nothing is
//! cached between scrapes.

pub mod server;
mod text;

pub use server::{ScrapeState, router, serve};
pub use text::{CONTENT_TYPE, render};
