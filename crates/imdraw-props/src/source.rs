use crate::controls::ControlKind;
use crate::error::PropertyError;
use crate::value::{PropertyValue, ValueKind};

/// One editable property as advertised by a [`PropertySource`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PropertyDesc {
    pub name: &'static str,
    /// Panel position; lower comes first. Ties keep declaration order.
    pub order: i32,
    pub control: ControlKind,
}

impl PropertyDesc {
    pub const fn new(name: &'static str, control: ControlKind) -> Self {
        Self { name, order: 0, control }
    }

    pub const fn label(name: &'static str) -> Self {
        Self::new(name, ControlKind::Label)
    }

    pub const fn checkbox(name: &'static str) -> Self {
        Self::new(name, ControlKind::Checkbox)
    }

    pub const fn slider(name: &'static str, min: f32, max: f32) -> Self {
        Self::new(name, ControlKind::Slider { min, max })
    }

    pub const fn color_edit(name: &'static str) -> Self {
        Self::new(name, ControlKind::ColorEdit)
    }

    pub const fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

/// A type whose fields can be edited through a property panel.
///
/// Implementations list their properties statically and route `get`/`set`
/// by name, usually with a `match` over the names.
///
/// ```rust,ignore
/// impl PropertySource for Particles {
///     fn properties(&self) -> &[PropertyDesc] {
///         const PROPS: &[PropertyDesc] = &[
///             PropertyDesc::slider("size", 0.01, 0.5).order(-1),
///             PropertyDesc::checkbox("collision"),
///         ];
///         PROPS
///     }
///     fn get(&self, name: &str) -> Option<PropertyValue> {
///         match name {
///             "size" => Some(self.size.into()),
///             "collision" => Some(self.collision.into()),
///             _ => None,
///         }
///     }
///     fn set(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
///         match name {
///             "size" => self.size = expect_float(name, &value)?,
///             "collision" => self.collision = expect_bool(name, &value)?,
///             _ => return Err(PropertyError::UnknownProperty(name.to_owned())),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait PropertySource {
    fn properties(&self) -> &[PropertyDesc];

    fn get(&self, name: &str) -> Option<PropertyValue>;

    /// Stores `value`. A value of the wrong kind is a
    /// [`PropertyError::KindMismatch`] and leaves the property untouched.
    fn set(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError>;
}

fn mismatch(name: &str, expected: ValueKind, value: &PropertyValue) -> PropertyError {
    PropertyError::KindMismatch {
        property: name.to_owned(),
        expected,
        actual: value.kind(),
    }
}

pub fn expect_bool(name: &str, value: &PropertyValue) -> Result<bool, PropertyError> {
    value.as_bool().ok_or_else(|| mismatch(name, ValueKind::Bool, value))
}

pub fn expect_int(name: &str, value: &PropertyValue) -> Result<i32, PropertyError> {
    value.as_int().ok_or_else(|| mismatch(name, ValueKind::Int, value))
}

pub fn expect_float(name: &str, value: &PropertyValue) -> Result<f32, PropertyError> {
    value.as_float().ok_or_else(|| mismatch(name, ValueKind::Float, value))
}

pub fn expect_vec2(name: &str, value: &PropertyValue) -> Result<[f32; 2], PropertyError> {
    value.as_vec2().ok_or_else(|| mismatch(name, ValueKind::Vec2, value))
}

pub fn expect_vec3(name: &str, value: &PropertyValue) -> Result<[f32; 3], PropertyError> {
    value.as_vec3().ok_or_else(|| mismatch(name, ValueKind::Vec3, value))
}

pub fn expect_vec4(name: &str, value: &PropertyValue) -> Result<[f32; 4], PropertyError> {
    value.as_vec4().ok_or_else(|| mismatch(name, ValueKind::Vec4, value))
}

pub fn expect_text(name: &str, value: &PropertyValue) -> Result<String, PropertyError> {
    value
        .as_text()
        .map(str::to_owned)
        .ok_or_else(|| mismatch(name, ValueKind::Text, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_control_and_order() {
        let d = PropertyDesc::slider("size", 0.0, 2.0).order(-1);
        assert_eq!(d.name, "size");
        assert_eq!(d.order, -1);
        assert_eq!(d.control, ControlKind::Slider { min: 0.0, max: 2.0 });
        assert_eq!(PropertyDesc::checkbox("on").order, 0);
    }

    #[test]
    fn expect_reports_both_kinds() {
        let err = expect_bool("flag", &PropertyValue::Int(1)).unwrap_err();
        assert_eq!(
            err,
            PropertyError::KindMismatch {
                property: "flag".to_owned(),
                expected: ValueKind::Bool,
                actual: ValueKind::Int,
            }
        );
        assert_eq!(expect_text("t", &"hi".into()).unwrap(), "hi");
    }
}
