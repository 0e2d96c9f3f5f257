use std::fmt;

use crate::error::PropertyError;
use crate::source::PropertyDesc;
use crate::value::PropertyValue;
use crate::widgets::Widgets;

/// Which control edits a property, with its parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlKind {
    /// Read-only `name:value` text.
    Label,
    /// Bool only.
    Checkbox,
    /// Int, float and vector values, clamped to `min..=max`.
    Slider { min: f32, max: f32 },
    /// Vec3 or Vec4 color.
    ColorEdit,
}

/// Parameter-free tag of a [`ControlKind`]; keys the registration table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ControlTag {
    Label,
    Checkbox,
    Slider,
    ColorEdit,
}

impl ControlKind {
    pub fn tag(&self) -> ControlTag {
        match self {
            Self::Label => ControlTag::Label,
            Self::Checkbox => ControlTag::Checkbox,
            Self::Slider { .. } => ControlTag::Slider,
            Self::ColorEdit => ControlTag::ColorEdit,
        }
    }
}

/// A built control bound to one property name.
pub trait Control: fmt::Debug {
    fn name(&self) -> &str;

    /// Draws the control for `value`. Returns the edited value when the user
    /// changed it this frame.
    fn draw(
        &self,
        ui: &mut dyn Widgets,
        value: &PropertyValue,
    ) -> Result<Option<PropertyValue>, PropertyError>;
}

type Constructor = fn(&PropertyDesc) -> Result<Box<dyn Control>, PropertyError>;

/// Control constructors, looked up by tag.
pub const REGISTRY: &[(ControlTag, Constructor)] = &[
    (ControlTag::Label, Label::build),
    (ControlTag::Checkbox, Checkbox::build),
    (ControlTag::Slider, Slider::build),
    (ControlTag::ColorEdit, ColorEdit::build),
];

/// Builds the control `desc` asks for.
pub fn create_control(desc: &PropertyDesc) -> Result<Box<dyn Control>, PropertyError> {
    let tag = desc.control.tag();
    let (_, build) = REGISTRY
        .iter()
        .find(|(t, _)| *t == tag)
        .ok_or(PropertyError::Unregistered(tag))?;
    build(desc)
}

fn unsupported(control: &'static str, name: &str, value: &PropertyValue) -> PropertyError {
    PropertyError::UnsupportedKind {
        control,
        property: name.to_owned(),
        kind: value.kind(),
    }
}

// ── label ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Label {
    name: &'static str,
}

impl Label {
    fn build(desc: &PropertyDesc) -> Result<Box<dyn Control>, PropertyError> {
        Ok(Box::new(Self { name: desc.name }))
    }
}

impl Control for Label {
    fn name(&self) -> &str {
        self.name
    }

    fn draw(
        &self,
        ui: &mut dyn Widgets,
        value: &PropertyValue,
    ) -> Result<Option<PropertyValue>, PropertyError> {
        ui.text(&format!("{}:{}", self.name, value));
        Ok(None)
    }
}

// ── checkbox ──────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Checkbox {
    name: &'static str,
}

impl Checkbox {
    fn build(desc: &PropertyDesc) -> Result<Box<dyn Control>, PropertyError> {
        Ok(Box::new(Self { name: desc.name }))
    }
}

impl Control for Checkbox {
    fn name(&self) -> &str {
        self.name
    }

    fn draw(
        &self,
        ui: &mut dyn Widgets,
        value: &PropertyValue,
    ) -> Result<Option<PropertyValue>, PropertyError> {
        let PropertyValue::Bool(mut v) = *value else {
            return Err(unsupported("checkbox", self.name, value));
        };
        Ok(ui.checkbox(self.name, &mut v).then_some(PropertyValue::Bool(v)))
    }
}

// ── slider ────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Slider {
    name: &'static str,
    min: f32,
    max: f32,
}

impl Slider {
    fn build(desc: &PropertyDesc) -> Result<Box<dyn Control>, PropertyError> {
        let ControlKind::Slider { min, max } = desc.control else {
            return Err(PropertyError::Unregistered(desc.control.tag()));
        };
        if min.is_nan() || max.is_nan() || min >= max {
            return Err(PropertyError::InvalidRange {
                property: desc.name.to_owned(),
                min,
                max,
            });
        }
        Ok(Box::new(Self { name: desc.name, min, max }))
    }
}

impl Control for Slider {
    fn name(&self) -> &str {
        self.name
    }

    fn draw(
        &self,
        ui: &mut dyn Widgets,
        value: &PropertyValue,
    ) -> Result<Option<PropertyValue>, PropertyError> {
        let (name, min, max) = (self.name, self.min, self.max);
        let edited = match value.clone() {
            PropertyValue::Int(mut v) => ui
                .slider_int(name, &mut v, min as i32, max as i32)
                .then_some(PropertyValue::Int(v)),
            PropertyValue::Float(mut v) => ui
                .slider_float(name, &mut v, min, max)
                .then_some(PropertyValue::Float(v)),
            PropertyValue::Vec2(mut v) => ui
                .slider_float2(name, &mut v, min, max)
                .then_some(PropertyValue::Vec2(v)),
            PropertyValue::Vec3(mut v) => ui
                .slider_float3(name, &mut v, min, max)
                .then_some(PropertyValue::Vec3(v)),
            PropertyValue::Vec4(mut v) => ui
                .slider_float4(name, &mut v, min, max)
                .then_some(PropertyValue::Vec4(v)),
            PropertyValue::Bool(_) | PropertyValue::Text(_) => {
                return Err(unsupported("slider", name, value));
            }
        };
        Ok(edited)
    }
}

// ── color ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct ColorEdit {
    name: &'static str,
}

impl ColorEdit {
    fn build(desc: &PropertyDesc) -> Result<Box<dyn Control>, PropertyError> {
        Ok(Box::new(Self { name: desc.name }))
    }
}

impl Control for ColorEdit {
    fn name(&self) -> &str {
        self.name
    }

    fn draw(
        &self,
        ui: &mut dyn Widgets,
        value: &PropertyValue,
    ) -> Result<Option<PropertyValue>, PropertyError> {
        match *value {
            PropertyValue::Vec3(mut v) => {
                Ok(ui.color_edit3(self.name, &mut v).then_some(PropertyValue::Vec3(v)))
            }
            PropertyValue::Vec4(mut v) => {
                Ok(ui.color_edit4(self.name, &mut v).then_some(PropertyValue::Vec4(v)))
            }
            _ => Err(unsupported("color edit", self.name, value)),
        }
    }
}
