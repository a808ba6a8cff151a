//! Scrape-side rendering

mod render;

pub use render::render_exposition;
