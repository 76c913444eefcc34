//! Parameter store shared by the controls and the renderer.
//!
//! Holds the parameters mapped from the latest metadata (the base) plus any
//! values the user has set. The renderer reads a fresh [`snapshot`] every
//! frame, so a control change shows up on the next frame.
//!
//! [`snapshot`]: ParameterStore::snapshot

use std::collections::BTreeMap;

use super::{PatternKind, RenderParameters, Tint};

/// Identifies one numeric control-adjustable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamId {
    Density,
    FlowIntensity,
    Brightness,
    Rotation,
    Scale,
    Zoom,
    Speed,
    MotionBlur,
    TintHue,
    TintSaturation,
    TintStrength,
}

impl ParamId {
    /// Valid range for the parameter.
    pub fn range(self) -> (f32, f32) {
        match self {
            ParamId::Density => (0.2, 1.0),
            ParamId::FlowIntensity => (0.1, 1.0),
            ParamId::Brightness => (0.0, 1.0),
            ParamId::Rotation => (0.0, 360.0),
            ParamId::Scale => (0.25, 4.0),
            ParamId::Zoom => (0.25, 4.0),
            ParamId::Speed => (0.0, 4.0),
            ParamId::MotionBlur => (0.0, 0.95),
            ParamId::TintHue => (0.0, 360.0),
            ParamId::TintSaturation => (0.0, 1.0),
            ParamId::TintStrength => (0.0, 1.0),
        }
    }

    fn read(self, params: &RenderParameters) -> f32 {
        match self {
            ParamId::Density => params.density,
            ParamId::FlowIntensity => params.flow_intensity,
            ParamId::Brightness => params.brightness,
            ParamId::Rotation => params.rotation,
            ParamId::Scale => params.scale,
            ParamId::Zoom => params.zoom,
            ParamId::Speed => params.speed,
            ParamId::MotionBlur => params.motion_blur,
            ParamId::TintHue => params.tint.hue,
            ParamId::TintSaturation => params.tint.saturation,
            ParamId::TintStrength => params.tint.strength,
        }
    }

    fn write(self, params: &mut RenderParameters, value: f32) {
        match self {
            ParamId::Density => params.density = value,
            ParamId::FlowIntensity => params.flow_intensity = value,
            ParamId::Brightness => params.brightness = value,
            ParamId::Rotation => params.rotation = value,
            ParamId::Scale => params.scale = value,
            ParamId::Zoom => params.zoom = value,
            ParamId::Speed => params.speed = value,
            ParamId::MotionBlur => params.motion_blur = value,
            ParamId::TintHue => params.tint = Tint { hue: value, ..params.tint },
            ParamId::TintSaturation => params.tint = Tint { saturation: value, ..params.tint },
            ParamId::TintStrength => params.tint = Tint { strength: value, ..params.tint },
        }
    }
}

/// Parameters the renderer reads each frame: the values mapped from the
/// current photo plus whatever the user has changed with the controls.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    base: RenderParameters,
    pattern: Option<PatternKind>,
    overrides: BTreeMap<ParamId, f32>,
}

impl ParameterStore {
    pub fn new(base: RenderParameters) -> Self {
        Self {
            base,
            pattern: None,
            overrides: BTreeMap::new(),
        }
    }

    /// Replace the base with freshly mapped parameters.
    ///
    /// A new upload discards every user setting from the previous one.
    pub fn replace_base(&mut self, base: RenderParameters) {
        self.base = base;
        self.pattern = None;
        self.overrides.clear();
    }

    pub fn base(&self) -> &RenderParameters {
        &self.base
    }

    /// Set a numeric parameter, clamped to its range.
    pub fn set(&mut self, id: ParamId, value: f32) {
        if !value.is_finite() {
            return;
        }
        let (min, max) = id.range();
        let value = if id == ParamId::Rotation || id == ParamId::TintHue {
            value.rem_euclid(360.0)
        } else {
            value.clamp(min, max)
        };
        self.overrides.insert(id, value);
    }

    pub fn set_pattern(&mut self, pattern: PatternKind) {
        self.pattern = Some(pattern);
    }

    /// Current effective value of a parameter.
    pub fn get(&self, id: ParamId) -> f32 {
        self.overrides
            .get(&id)
            .copied()
            .unwrap_or_else(|| id.read(&self.base))
    }

    pub fn pattern(&self) -> PatternKind {
        self.pattern.unwrap_or(self.base.pattern)
    }

    /// Effective parameters: the base with every user setting applied.
    pub fn snapshot(&self) -> RenderParameters {
        let mut params = self.base.clone();
        params.pattern = self.pattern();
        for (&id, &value) in &self.overrides {
            id.write(&mut params, value);
        }
        params
    }
}
