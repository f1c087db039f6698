//! Rendering boundary: turns a [`DesignTokenProfile`] into named theme properties
//! and hands them to a sink.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use log::debug;

use crate::tokens::{ColorScheme, ContrastLevel, Density, DesignTokenProfile, Motion};

/// Receives every design-token profile the engine commits.
///
/// Calls are synchronous. Applying the same profile twice must leave the sink
/// in the same state as applying it once.
pub trait ThemeApplier: Send + Sync {
    fn apply(&self, tokens: &DesignTokenProfile);
}

/// The five surface colors for one scheme and contrast level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub surface: &'static str,
    pub border: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
}

pub fn palette(scheme: ColorScheme, contrast: ContrastLevel) -> Palette {
    use ColorScheme::*;
    use ContrastLevel::*;

    let secondary = match scheme {
        Grey => "rgba(255, 255, 255, 0.8)",
        Vibrant => "rgba(232, 240, 255, 0.75)",
        Dark => "rgba(255, 255, 255, 0.7)",
    };
    let (background, surface, border, text) = match (scheme, contrast) {
        (Grey, High) => ("#1a1a1a", "#2a2a2a", "#666666", "#ffffff"),
        (Grey, Medium) => ("#2a2a2a", "#3a3a3a", "#555555", "#f5f5f5"),
        (Grey, Low) => ("#353535", "#454545", "#505050", "#e0e0e0"),
        (Vibrant, High) => ("#040810", "#0d1520", "#3d5a8f", "#ffffff"),
        (Vibrant, Medium) => ("#0a0e1a", "#151b2e", "#2d3f5f", "#e8f0ff"),
        (Vibrant, Low) => ("#0f1420", "#1a2235", "#253550", "#d0dcf0"),
        (Dark, High) => ("#000000", "#0d0d0d", "#666666", "#ffffff"),
        (Dark, Medium) => ("#0f0f0f", "#1a1a1a", "#404040", "#e0e0e0"),
        (Dark, Low) => ("#1a1a1a", "#252525", "#2a2a2a", "#c0c0c0"),
    };
    Palette {
        background,
        surface,
        border,
        text,
        text_secondary: secondary,
    }
}

fn density_metrics(density: Density) -> (&'static str, &'static str, &'static str) {
    match density {
        Density::Compact => ("0.4rem 0.8rem", "0.5rem", "2.25rem"),
        Density::Normal => ("0.75rem 1.5rem", "1rem", "3rem"),
        Density::Spacious => ("1.25rem 2.5rem", "2rem", "4rem"),
    }
}

fn motion_duration(motion: Motion) -> &'static str {
    match motion {
        Motion::Reduced => "0.05s",
        Motion::Normal => "0.2s",
        Motion::Enhanced => "0.5s",
    }
}

fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

fn px(value: f32) -> String {
    format!("{}px", round3(value))
}

/// Computes the full property set for `tokens`. Keys are CSS custom property names.
pub fn theme_properties(tokens: &DesignTokenProfile) -> BTreeMap<&'static str, String> {
    let base = tokens.typography_base;
    let scale = tokens.typography_scale;
    let space = tokens.spacing_base;
    let step = tokens.spacing_scale;
    let (padding, gap, min_height) = density_metrics(tokens.component_density);
    let colors = palette(tokens.color_scheme, tokens.contrast_level);
    let shadow = round3(tokens.shadow_intensity);

    BTreeMap::from([
        ("--font-base", px(base)),
        ("--font-scale", round3(scale).to_string()),
        ("--font-h1", px(base * scale.powi(3))),
        ("--font-h2", px(base * scale.powi(2))),
        ("--font-h3", px(base * scale)),
        ("--font-small", px(base * 0.875)),
        ("--space-1", px(space)),
        ("--space-2", px(space * step)),
        ("--space-3", px(space * step.powi(2))),
        ("--space-4", px(space * step.powi(3))),
        ("--space-5", px(space * step.powi(4))),
        ("--component-padding", padding.to_string()),
        ("--component-gap", gap.to_string()),
        ("--component-min-height", min_height.to_string()),
        ("--color-bg", colors.background.to_string()),
        ("--color-surface", colors.surface.to_string()),
        ("--color-border", colors.border.to_string()),
        ("--color-text", colors.text.to_string()),
        ("--color-text-secondary", colors.text_secondary.to_string()),
        ("--color-accent", tokens.accent_color.clone()),
        ("--motion-duration", motion_duration(tokens.motion).to_string()),
        ("--focus-ring", px(tokens.focus_ring_thickness)),
        ("--radius", px(tokens.border_radius)),
        ("--shadow-intensity", shadow.to_string()),
        ("--shadow", format!("0 2px 8px rgba(0, 0, 0, {})", shadow)),
        (
            "--shadow-lg",
            format!("0 4px 16px rgba(0, 0, 0, {})", round3(tokens.shadow_intensity * 1.5)),
        ),
    ])
}

/// An in-memory key/value property store.
///
/// Stands in for a document-level style target; each apply overwrites every
/// key it writes, so re-applying a profile is a no-op.
#[derive(Default)]
pub struct PropertyStore {
    properties: Mutex<BTreeMap<String, String>>,
}

impl fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyStore")
            .field("properties", &self.snapshot().len())
            .finish()
    }
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.properties
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.properties
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl ThemeApplier for PropertyStore {
    fn apply(&self, tokens: &DesignTokenProfile) {
        let properties = theme_properties(tokens);
        debug!("Applying {} theme properties", properties.len());
        let mut store = self.properties.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in properties {
            store.insert(key.to_string(), value);
        }
    }
}
