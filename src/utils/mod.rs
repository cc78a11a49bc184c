pub mod html;

pub use html::unescape_html;
