//! TwiML rendering for routing markup

pub mod renderer;

pub use renderer::{render, RenderError, FALLBACK_TWIML, TWIML_CONTENT_TYPE};
