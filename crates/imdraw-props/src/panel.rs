use crate::controls::{create_control, Control};
use crate::error::PropertyError;
use crate::source::PropertySource;
use crate::widgets::Widgets;

/// A control and the index of the source that owns its property.
#[derive(Debug)]
struct Bound {
    source: usize,
    control: Box<dyn Control>,
}

/// Controls for one or more [`PropertySource`]s, in display order.
#[derive(Debug)]
pub struct PropertyPanel {
    controls: Vec<Bound>,
    sources: usize,
}

impl PropertyPanel {
    /// Builds one control per advertised property, sorted by `order`.
    ///
    /// The sort is stable, so equal orders keep the source's declaration
    /// order. Fails on the first property whose control cannot be built.
    pub fn from_source(source: &dyn PropertySource) -> Result<Self, PropertyError> {
        Self::from_sources(&[source])
    }

    /// Builds a single ordered panel over several sources.
    ///
    /// Properties of all sources are merged and sorted by `order`; equal
    /// orders keep source order, then declaration order.
    pub fn from_sources(sources: &[&dyn PropertySource]) -> Result<Self, PropertyError> {
        let mut descs: Vec<_> = sources
            .iter()
            .enumerate()
            .flat_map(|(i, s)| s.properties().iter().map(move |d| (i, *d)))
            .collect();
        descs.sort_by_key(|(_, d)| d.order);

        let controls = descs
            .iter()
            .map(|(source, desc)| {
                create_control(desc).map(|control| Bound { source: *source, control })
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "property panel built with {} controls over {} sources",
            controls.len(),
            sources.len()
        );
        Ok(Self { controls, sources: sources.len() })
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Property names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.controls.iter().map(|b| b.control.name())
    }

    /// Draws every control and writes edits back into `source`.
    ///
    /// Returns whether any property changed. Stops at the first control that
    /// cannot edit its property's current value.
    pub fn draw(
        &self,
        ui: &mut dyn Widgets,
        source: &mut dyn PropertySource,
    ) -> Result<bool, PropertyError> {
        self.draw_sources(ui, &mut [source])
    }

    /// Like [`PropertyPanel::draw`] for a panel built with
    /// [`PropertyPanel::from_sources`]. `sources` must be given in the same
    /// order as at build time.
    pub fn draw_sources(
        &self,
        ui: &mut dyn Widgets,
        sources: &mut [&mut dyn PropertySource],
    ) -> Result<bool, PropertyError> {
        if sources.len() != self.sources {
            return Err(PropertyError::SourceCountMismatch {
                expected: self.sources,
                actual: sources.len(),
            });
        }

        let mut changed = false;
        for Bound { source, control } in &self.controls {
            let source = &mut *sources[*source];
            let name = control.name();
            let value = source
                .get(name)
                .ok_or_else(|| PropertyError::UnknownProperty(name.to_owned()))?;

            if let Some(edited) = control.draw(ui, &value)? {
                log::trace!("property '{name}' changed to {edited}");
                source.set(name, edited)?;
                changed = true;
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::tests::MockUi;
    use crate::source::{expect_bool, expect_float, expect_int, expect_vec2, PropertyDesc};
    use crate::value::PropertyValue;

    #[derive(Debug, PartialEq)]
    struct Particles {
        value: f32,
        collision: bool,
        size: f32,
        offset: [f32; 2],
    }

    impl Default for Particles {
        fn default() -> Self {
            Self { value: 0.25, collision: false, size: 0.1, offset: [0.5, 0.5] }
        }
    }

    impl PropertySource for Particles {
        fn properties(&self) -> &[PropertyDesc] {
            const PROPS: &[PropertyDesc] = &[
                PropertyDesc::slider("value", 0.0, 1.0),
                PropertyDesc::checkbox("collision"),
                PropertyDesc::slider("size", 0.01, 0.5).order(-1),
                PropertyDesc::slider("offset", -1.0, 1.0),
            ];
            PROPS
        }

        fn get(&self, name: &str) -> Option<PropertyValue> {
            match name {
                "value" => Some(self.value.into()),
                "collision" => Some(self.collision.into()),
                "size" => Some(self.size.into()),
                "offset" => Some(self.offset.into()),
                _ => None,
            }
        }

        fn set(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
            match name {
                "value" => self.value = expect_float(name, &value)?,
                "collision" => self.collision = expect_bool(name, &value)?,
                "size" => self.size = expect_float(name, &value)?,
                "offset" => self.offset = expect_vec2(name, &value)?,
                _ => return Err(PropertyError::UnknownProperty(name.to_owned())),
            }
            Ok(())
        }
    }

    struct Emitter {
        rate: i32,
        on: bool,
    }

    impl PropertySource for Emitter {
        fn properties(&self) -> &[PropertyDesc] {
            const PROPS: &[PropertyDesc] = &[
                PropertyDesc::slider("rate", 0.0, 100.0).order(-5),
                PropertyDesc::checkbox("on").order(3),
            ];
            PROPS
        }

        fn get(&self, name: &str) -> Option<PropertyValue> {
            match name {
                "rate" => Some(self.rate.into()),
                "on" => Some(self.on.into()),
                _ => None,
            }
        }

        fn set(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
            match name {
                "rate" => self.rate = expect_int(name, &value)?,
                "on" => self.on = expect_bool(name, &value)?,
                _ => return Err(PropertyError::UnknownProperty(name.to_owned())),
            }
            Ok(())
        }
    }

    /// Advertises a property it cannot produce.
    struct Ghost;

    impl PropertySource for Ghost {
        fn properties(&self) -> &[PropertyDesc] {
            const PROPS: &[PropertyDesc] = &[PropertyDesc::label("missing")];
            PROPS
        }

        fn get(&self, _: &str) -> Option<PropertyValue> {
            None
        }

        fn set(&mut self, name: &str, _: PropertyValue) -> Result<(), PropertyError> {
            Err(PropertyError::UnknownProperty(name.to_owned()))
        }
    }

    // ── build ─────────────────────────────────────────────────────────────

    #[test]
    fn controls_follow_order_then_declaration() {
        let panel = PropertyPanel::from_source(&Particles::default()).unwrap();
        assert_eq!(
            panel.names().collect::<Vec<_>>(),
            vec!["size", "value", "collision", "offset"]
        );
        assert_eq!(panel.len(), 4);
    }

    // ── draw ──────────────────────────────────────────────────────────────

    #[test]
    fn untouched_panel_changes_nothing() {
        let mut p = Particles::default();
        let panel = PropertyPanel::from_source(&p).unwrap();
        let mut ui = MockUi::default();

        assert!(!panel.draw(&mut ui, &mut p).unwrap());
        assert_eq!(p, Particles::default());
        assert_eq!(
            ui.calls,
            vec![
                "slider_float:size",
                "slider_float:value",
                "checkbox:collision",
                "slider_float2:offset"
            ]
        );
    }

    #[test]
    fn edits_are_written_back() {
        let mut p = Particles::default();
        let panel = PropertyPanel::from_source(&p).unwrap();

        assert!(panel.draw(&mut MockUi::touching("collision"), &mut p).unwrap());
        assert!(p.collision);

        assert!(panel.draw(&mut MockUi::touching("size"), &mut p).unwrap());
        assert_eq!(p.size, 0.5);

        assert!(panel.draw(&mut MockUi::touching("offset"), &mut p).unwrap());
        assert_eq!(p.offset, [-1.0, -1.0]);
    }

    #[test]
    fn sources_merge_into_one_ordered_panel() {
        let mut a = Particles::default();
        let mut b = Emitter { rate: 10, on: true };
        let panel = PropertyPanel::from_sources(&[&a as &dyn PropertySource, &b]).unwrap();

        assert_eq!(
            panel.names().collect::<Vec<_>>(),
            vec!["rate", "size", "value", "collision", "offset", "on"]
        );

        let mut ui = MockUi::touching("rate");
        let changed = panel
            .draw_sources(&mut ui, &mut [&mut a as &mut dyn PropertySource, &mut b])
            .unwrap();
        assert!(changed);
        assert_eq!(b.rate, 100);
        assert_eq!(a, Particles::default());
    }

    #[test]
    fn drawing_with_wrong_source_count_fails() {
        let a = Particles::default();
        let b = Emitter { rate: 1, on: false };
        let panel = PropertyPanel::from_sources(&[&a as &dyn PropertySource, &b]).unwrap();

        let mut only = Particles::default();
        let err = panel.draw(&mut MockUi::default(), &mut only).unwrap_err();
        assert_eq!(err, PropertyError::SourceCountMismatch { expected: 2, actual: 1 });
    }

    #[test]
    fn missing_property_is_reported() {
        let panel = PropertyPanel::from_source(&Ghost).unwrap();
        let err = panel.draw(&mut MockUi::default(), &mut Ghost).unwrap_err();
        assert_eq!(err, PropertyError::UnknownProperty("missing".to_owned()));
    }
}
