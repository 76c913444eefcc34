//! # Interactive Controls
//!
//! Pointer-driven widgets that write into a [`ParameterStore`].
//!
//! | Widget | Gesture | Effect |
//! |--------|---------|--------|
//! | [`ClickSelector`] | click | relative x picks one of N equal zones |
//! | [`DragSelector`] | horizontal drag | one step per [`DRAG_THRESHOLD`] px |
//! | [`Knob`] | drag | `start + delta * sensitivity`, clamped and rounded |
//!
//! Every gesture ends on pointer-up; a stray move afterwards does nothing.

use crate::params::{ParamId, ParameterStore, PatternKind};
use crate::shader::{clamp01, round_to};

/// Pixels a drag must cover before a selector advances.
pub const DRAG_THRESHOLD: f32 = 40.0;

/// Knob deltas this small are ignored on the rotation knob.
pub const ROTATION_DEAD_ZONE: f32 = 3.0;

/// Zone index for a relative x position across `count` equal zones.
pub fn zone_for(rel_x: f32, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let zone = (clamp01(rel_x) * count as f32).floor() as usize;
    zone.min(count - 1)
}

/// A row of options picked by clicking across its width.
#[derive(Debug, Clone)]
pub struct ClickSelector<T> {
    options: Vec<T>,
    selected: usize,
}

impl<T: Copy + PartialEq> ClickSelector<T> {
    pub fn new(options: Vec<T>) -> Self {
        Self { options, selected: 0 }
    }

    pub fn selected(&self) -> Option<T> {
        self.options.get(self.selected).copied()
    }

    /// Select the zone under a click at relative x in [0, 1].
    pub fn click(&mut self, rel_x: f32) -> Option<T> {
        self.selected = zone_for(rel_x, self.options.len());
        self.selected()
    }

    /// Move the selection by `delta` options, stopping at either end.
    pub fn step(&mut self, delta: i32) -> Option<T> {
        if self.options.is_empty() {
            return None;
        }
        let last = self.options.len() as i64 - 1;
        self.selected = (self.selected as i64 + delta as i64).clamp(0, last) as usize;
        self.selected()
    }

    /// Point the selection at `value` if it is one of the options.
    pub fn sync(&mut self, value: T) {
        if let Some(i) = self.options.iter().position(|o| *o == value) {
            self.selected = i;
        }
    }
}

/// Turns a horizontal drag into discrete steps.
#[derive(Debug, Clone)]
pub struct DragSelector {
    threshold: f32,
    origin: Option<f32>,
}

impl Default for DragSelector {
    fn default() -> Self {
        Self::new(DRAG_THRESHOLD)
    }
}

impl DragSelector {
    pub fn new(threshold: f32) -> Self {
        Self { threshold, origin: None }
    }

    pub fn press(&mut self, x: f32) {
        self.origin = Some(x);
    }

    /// Returns +1/-1 once the drag passes the threshold, then re-anchors at `x`.
    pub fn drag(&mut self, x: f32) -> Option<i32> {
        let origin = self.origin?;
        let delta = x - origin;
        if delta.abs() <= self.threshold {
            return None;
        }
        self.origin = Some(x);
        Some(if delta > 0.0 { 1 } else { -1 })
    }

    pub fn release(&mut self) {
        self.origin = None;
    }
}

#[derive(Debug, Clone, Copy)]
struct KnobGesture {
    start_value: f32,
    start: (f32, f32),
}

/// A drag knob bound to one parameter.
#[derive(Debug, Clone)]
pub struct Knob {
    pub id: ParamId,
    /// Parameter units per pixel of drag
    pub sensitivity: f32,
    pub decimals: u32,
    pub dead_zone: f32,
    gesture: Option<KnobGesture>,
}

impl Knob {
    pub fn new(id: ParamId, sensitivity: f32, decimals: u32) -> Self {
        let dead_zone = if id == ParamId::Rotation { ROTATION_DEAD_ZONE } else { 0.0 };
        Self {
            id,
            sensitivity,
            decimals,
            dead_zone,
            gesture: None,
        }
    }

    /// Knob with the default sensitivity for its parameter.
    pub fn for_param(id: ParamId) -> Self {
        match id {
            ParamId::Rotation | ParamId::TintHue => Self::new(id, 1.0, 0),
            ParamId::Zoom | ParamId::Scale | ParamId::Speed => Self::new(id, 0.01, 2),
            _ => Self::new(id, 0.005, 2),
        }
    }

    pub fn press(&mut self, x: f32, y: f32, current: f32) {
        self.gesture = Some(KnobGesture {
            start_value: current,
            start: (x, y),
        });
    }

    /// New value for a drag to (x, y), or `None` if nothing should change.
    ///
    /// Rightward and upward movement both increase the value.
    pub fn drag(&self, x: f32, y: f32) -> Option<f32> {
        let gesture = self.gesture?;
        let delta = (x - gesture.start.0) + (gesture.start.1 - y);
        if delta.abs() <= self.dead_zone {
            return None;
        }
        let (min, max) = self.id.range();
        let raw = gesture.start_value + delta * self.sensitivity;
        let value = if self.id == ParamId::Rotation || self.id == ParamId::TintHue {
            raw.rem_euclid(max)
        } else {
            raw.clamp(min, max)
        };
        Some(round_to(value, self.decimals))
    }

    pub fn release(&mut self) {
        self.gesture = None;
    }
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlTarget {
    PatternStrip,
    Knob(ParamId),
}

/// The full control surface: pattern strip plus one knob per parameter.
#[derive(Debug, Clone)]
pub struct ControlPanel {
    patterns: ClickSelector<PatternKind>,
    pattern_drag: DragSelector,
    knobs: Vec<Knob>,
    active: Option<ControlTarget>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        let knobs = [
            ParamId::Density,
            ParamId::FlowIntensity,
            ParamId::Rotation,
            ParamId::Zoom,
            ParamId::Speed,
            ParamId::MotionBlur,
            ParamId::TintHue,
            ParamId::TintSaturation,
            ParamId::TintStrength,
        ]
        .into_iter()
        .map(Knob::for_param)
        .collect();

        Self {
            patterns: ClickSelector::new(PatternKind::SELECTOR.to_vec()),
            pattern_drag: DragSelector::default(),
            knobs,
            active: None,
        }
    }
}

impl ControlPanel {
    /// Click on the pattern strip at relative x.
    pub fn click_pattern(&mut self, rel_x: f32, store: &mut ParameterStore) {
        if let Some(pattern) = self.patterns.click(rel_x) {
            store.set_pattern(pattern);
        }
    }

    pub fn pointer_down(&mut self, target: ControlTarget, x: f32, y: f32, store: &ParameterStore) {
        self.pointer_up();
        match target {
            ControlTarget::PatternStrip => {
                self.patterns.sync(store.pattern());
                self.pattern_drag.press(x);
            }
            ControlTarget::Knob(id) => {
                let Some(knob) = self.knobs.iter_mut().find(|k| k.id == id) else {
                    return;
                };
                knob.press(x, y, store.get(id));
            }
        }
        self.active = Some(target);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, store: &mut ParameterStore) {
        match self.active {
            Some(ControlTarget::PatternStrip) => {
                let stepped = self
                    .pattern_drag
                    .drag(x)
                    .and_then(|step| self.patterns.step(step));
                if let Some(pattern) = stepped {
                    store.set_pattern(pattern);
                }
            }
            Some(ControlTarget::Knob(id)) => {
                let value = self
                    .knobs
                    .iter()
                    .find(|k| k.id == id)
                    .and_then(|k| k.drag(x, y));
                if let Some(value) = value {
                    store.set(id, value);
                }
            }
            None => {}
        }
    }

    /// End whatever gesture is in progress.
    pub fn pointer_up(&mut self) {
        self.pattern_drag.release();
        for knob in &mut self.knobs {
            knob.release();
        }
        self.active = None;
    }

    pub fn active(&self) -> Option<ControlTarget> {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RenderParameters;

    #[test]
    fn test_zone_for() {
        assert_eq!(zone_for(0.1, 3), 0);
        assert_eq!(zone_for(0.5, 3), 1);
        assert_eq!(zone_for(0.9, 3), 2);
        assert_eq!(zone_for(1.0, 3), 2);
        assert_eq!(zone_for(-0.2, 3), 0);
        assert_eq!(zone_for(0.5, 0), 0);
    }

    #[test]
    fn test_click_selector() {
        let mut selector = ClickSelector::new(PatternKind::SELECTOR.to_vec());
        assert_eq!(selector.click(0.9), Some(PatternKind::Contour));
        assert_eq!(selector.click(0.1), Some(PatternKind::Wave));
        assert_eq!(selector.step(-1), Some(PatternKind::Wave));
    }

    #[test]
    fn test_drag_below_threshold_does_nothing() {
        let mut drag = DragSelector::default();
        drag.press(100.0);
        assert_eq!(drag.drag(130.0), None);
        assert_eq!(drag.drag(140.0), None);
    }

    #[test]
    fn test_drag_steps_once_then_reanchors() {
        let mut drag = DragSelector::default();
        drag.press(100.0);
        assert_eq!(drag.drag(141.0), Some(1));
        assert_eq!(drag.drag(160.0), None);
        assert_eq!(drag.drag(100.0), Some(-1));
    }

    #[test]
    fn test_drag_without_press() {
        let mut drag = DragSelector::default();
        assert_eq!(drag.drag(500.0), None);
        drag.press(0.0);
        drag.release();
        assert_eq!(drag.drag(500.0), None);
    }

    #[test]
    fn test_knob_clamps_and_rounds() {
        let mut knob = Knob::new(ParamId::Density, 0.0033, 2);
        knob.press(0.0, 0.0, 0.5);
        assert_eq!(knob.drag(10.0, 0.0), Some(0.53));
        assert_eq!(knob.drag(1000.0, 0.0), Some(1.0));
        assert_eq!(knob.drag(-1000.0, 0.0), Some(0.2));
    }

    #[test]
    fn test_rotation_dead_zone() {
        let mut knob = Knob::for_param(ParamId::Rotation);
        knob.press(50.0, 50.0, 90.0);
        assert_eq!(knob.drag(52.0, 50.0), None);
        assert_eq!(knob.drag(50.0, 47.0), None);
        assert_eq!(knob.drag(60.0, 50.0), Some(100.0));
        assert_eq!(knob.drag(50.0, 50.0 + 100.0), Some(350.0));
    }

    #[test]
    fn test_panel_drag_changes_pattern() {
        let mut store = ParameterStore::new(RenderParameters::default());
        let mut panel = ControlPanel::default();

        panel.pointer_down(ControlTarget::PatternStrip, 10.0, 0.0, &store);
        panel.pointer_move(30.0, 0.0, &mut store);
        assert_eq!(store.pattern(), PatternKind::Wave);
        panel.pointer_move(60.0, 0.0, &mut store);
        assert_eq!(store.pattern(), PatternKind::Bump);
        panel.pointer_up();

        panel.pointer_move(500.0, 0.0, &mut store);
        assert_eq!(store.pattern(), PatternKind::Bump);
        assert_eq!(panel.active(), None);
    }

    #[test]
    fn test_panel_knob_writes_store() {
        let mut store = ParameterStore::new(RenderParameters::default());
        let mut panel = ControlPanel::default();

        panel.pointer_down(ControlTarget::Knob(ParamId::Zoom), 0.0, 0.0, &store);
        panel.pointer_move(50.0, 0.0, &mut store);
        panel.pointer_up();
        assert_eq!(store.snapshot().zoom, 1.5);

        panel.click_pattern(0.9, &mut store);
        assert_eq!(store.snapshot().pattern, PatternKind::Contour);
    }
}
