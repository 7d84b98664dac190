pub mod markdown;
pub mod view;

pub use markdown::render_markdown;
pub use view::resolve_view;
