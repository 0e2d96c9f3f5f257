//! Typed property editing on top of an immediate-mode UI.
//!
//! A type implements [`PropertySource`] to list its editable fields with the
//! control each one uses. [`PropertyPanel`] turns that list into controls and
//! draws them through any [`Widgets`] implementation, writing edits back.
//!
//! ```rust,ignore
//! let panel = PropertyPanel::from_source(&particles)?;
//! // every frame:
//! if panel.draw(&mut ui, &mut particles)? {
//!     particles.restart();
//! }
//! ```

pub mod controls;
pub mod error;
pub mod panel;
pub mod source;
pub mod value;
pub mod widgets;

pub use controls::{create_control, Control, ControlKind, ControlTag, REGISTRY};
pub use error::PropertyError;
pub use panel::PropertyPanel;
pub use source::{
    expect_bool, expect_float, expect_int, expect_text, expect_vec2, expect_vec3, expect_vec4,
    PropertyDesc, PropertySource,
};
pub use value::{PropertyValue, ValueKind};
pub use widgets::Widgets;
