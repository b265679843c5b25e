mod list_view;
mod status_bar;

pub use list_view::ListViewWidget;
pub use status_bar::StatusBarWidget;
