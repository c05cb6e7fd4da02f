//! The input-to-explanation pipeline: state machine plus its Dioxus view.

pub mod engine;
pub mod view;

pub use view::ExplainView;
