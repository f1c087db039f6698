//! Design tokens and the rules that derive them from an engagement class.

use serde::{Deserialize, Serialize};

use crate::engine::EngagementClass;
use crate::profile::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Compact,
    Normal,
    Spacious,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContrastLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Motion {
    Reduced,
    Normal,
    Enhanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Dark,
    Grey,
    Vibrant,
}

impl ColorScheme {
    /// The engagement class whose baseline uses this scheme.
    pub fn engagement_class(&self) -> EngagementClass {
        match self {
            Self::Grey => EngagementClass::Low,
            Self::Dark => EngagementClass::Medium,
            Self::Vibrant => EngagementClass::High,
        }
    }
}

/// The resolved visual parameters handed to the theme sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignTokenProfile {
    pub typography_base: f32,
    pub typography_scale: f32,
    pub spacing_base: f32,
    pub spacing_scale: f32,
    pub component_density: Density,
    pub contrast_level: ContrastLevel,
    pub motion: Motion,
    pub focus_ring_thickness: f32,
    pub border_radius: f32,
    pub shadow_intensity: f32,
    pub color_scheme: ColorScheme,
    pub accent_color: String,
}

impl Default for DesignTokenProfile {
    fn default() -> Self {
        Self::baseline(EngagementClass::Medium, &UserProfile::default())
    }
}

/// Accessibility slider value that forces the accessible variant.
const ACCESSIBILITY_FORCED: u8 = 5;
/// Animation slider values at or below this reduce motion.
const ANIMATION_REDUCED_MAX: u8 = 3;
/// Animation slider value that forces enhanced motion.
const ANIMATION_ENHANCED: u8 = 5;

impl DesignTokenProfile {
    /// The per-class starting point, before any slider override.
    ///
    /// Only the high-engagement class reads the profile: its contrast follows
    /// the mean of the layout-related sliders and its motion follows the
    /// animation slider.
    pub fn baseline(class: EngagementClass, profile: &UserProfile) -> Self {
        match class {
            EngagementClass::Low => Self {
                typography_base: 20.0,
                typography_scale: 1.35,
                spacing_base: 16.0,
                spacing_scale: 2.0,
                component_density: Density::Spacious,
                contrast_level: ContrastLevel::High,
                motion: Motion::Reduced,
                focus_ring_thickness: 4.0,
                border_radius: 16.0,
                shadow_intensity: 0.02,
                color_scheme: ColorScheme::Grey,
                accent_color: "#5cb85c".to_string(),
            },
            EngagementClass::Medium => Self {
                typography_base: 16.0,
                typography_scale: 1.2,
                spacing_base: 10.0,
                spacing_scale: 1.6,
                component_density: Density::Normal,
                contrast_level: ContrastLevel::Medium,
                motion: Motion::Normal,
                focus_ring_thickness: 2.0,
                border_radius: 8.0,
                shadow_intensity: 0.1,
                color_scheme: ColorScheme::Dark,
                accent_color: "#4a9eff".to_string(),
            },
            EngagementClass::High => Self {
                typography_base: 14.0,
                typography_scale: 1.1,
                spacing_base: 6.0,
                spacing_scale: 1.3,
                component_density: Density::Compact,
                contrast_level: if profile.contrast_affinity() > 4.0 {
                    ContrastLevel::High
                } else {
                    ContrastLevel::Low
                },
                motion: if profile.animation_transitions >= 4 {
                    Motion::Enhanced
                } else {
                    Motion::Normal
                },
                focus_ring_thickness: 2.0,
                border_radius: 4.0,
                shadow_intensity: 0.2,
                color_scheme: ColorScheme::Vibrant,
                accent_color: "#ff6b9d".to_string(),
            },
        }
    }

    fn apply_accessibility(&mut self, profile: &UserProfile) {
        if profile.accessibility >= ACCESSIBILITY_FORCED {
            self.focus_ring_thickness = self.focus_ring_thickness.max(4.0);
            self.contrast_level = ContrastLevel::High;
            self.typography_base = self.typography_base.max(18.0);
        }
    }

    fn apply_motion(&mut self, profile: &UserProfile) {
        if profile.animation_transitions <= ANIMATION_REDUCED_MAX {
            self.motion = Motion::Reduced;
        } else if profile.animation_transitions == ANIMATION_ENHANCED {
            self.motion = Motion::Enhanced;
        }
    }
}

/// Maps an engagement class and the survey profile to design tokens.
///
/// Stages run in a fixed order and later stages win: class baseline, then the
/// accessibility override, then the motion override.
pub fn map_tokens(class: EngagementClass, profile: &UserProfile) -> DesignTokenProfile {
    let mut tokens = DesignTokenProfile::baseline(class, profile);
    tokens.apply_accessibility(profile);
    tokens.apply_motion(profile);
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(accessibility: u8, animation: u8) -> UserProfile {
        UserProfile {
            accessibility,
            animation_transitions: animation,
            ..UserProfile::default()
        }
    }

    #[test]
    fn test_default_is_medium_baseline() {
        let tokens = DesignTokenProfile::default();
        assert_eq!(tokens.color_scheme, ColorScheme::Dark);
        assert_eq!(tokens.contrast_level, ContrastLevel::Medium);
        assert_eq!(tokens.motion, Motion::Normal);
        assert_eq!(tokens.typography_base, 16.0);
        assert_eq!(tokens.accent_color, "#4a9eff");
    }

    #[test]
    fn test_class_baselines() {
        // Sliders at 4 leave every override stage inactive.
        let p = profile(4, 4);
        let low = map_tokens(EngagementClass::Low, &p);
        assert_eq!(low.typography_base, 20.0);
        assert_eq!(low.spacing_scale, 2.0);
        assert_eq!(low.component_density, Density::Spacious);
        assert_eq!(low.color_scheme, ColorScheme::Grey);
        assert_eq!(low.accent_color, "#5cb85c");

        let medium = map_tokens(EngagementClass::Medium, &p);
        assert_eq!(medium.spacing_base, 10.0);
        assert_eq!(medium.component_density, Density::Normal);
        assert_eq!(medium.color_scheme, ColorScheme::Dark);

        let high = map_tokens(EngagementClass::High, &p);
        assert_eq!(high.typography_base, 14.0);
        assert_eq!(high.typography_scale, 1.1);
        assert_eq!(high.component_density, Density::Compact);
        assert_eq!(high.color_scheme, ColorScheme::Vibrant);
        assert_eq!(high.accent_color, "#ff6b9d");
    }

    #[test]
    fn test_high_class_contrast_follows_slider_mean() {
        let mut p = profile(4, 4);
        assert_eq!(map_tokens(EngagementClass::High, &p).contrast_level, ContrastLevel::Low);

        // Mean exactly 4 is not enough.
        p.color_scheme = 4;
        p.visual_hierarchy = 4;
        p.layout = 4;
        assert_eq!(map_tokens(EngagementClass::High, &p).contrast_level, ContrastLevel::Low);

        p.color_scheme = 5;
        p.visual_hierarchy = 5;
        p.layout = 5;
        assert_eq!(map_tokens(EngagementClass::High, &p).contrast_level, ContrastLevel::High);
    }

    #[test]
    fn test_high_class_motion_baseline() {
        assert_eq!(map_tokens(EngagementClass::High, &profile(4, 4)).motion, Motion::Enhanced);
        // Slider 3 never reaches the baseline value: the motion stage reduces it.
        assert_eq!(map_tokens(EngagementClass::High, &profile(4, 3)).motion, Motion::Reduced);
    }

    #[test]
    fn test_accessibility_override_for_every_class() {
        for class in EngagementClass::ALL {
            let tokens = map_tokens(class, &profile(5, 4));
            assert_eq!(tokens.contrast_level, ContrastLevel::High);
            assert!(tokens.focus_ring_thickness >= 4.0);
            assert!(tokens.typography_base >= 18.0);
        }
        // Larger class values survive the max().
        assert_eq!(map_tokens(EngagementClass::Low, &profile(5, 4)).typography_base, 20.0);
    }

    #[test]
    fn test_motion_override_for_every_class() {
        for class in EngagementClass::ALL {
            assert_eq!(map_tokens(class, &profile(4, 2)).motion, Motion::Reduced);
            assert_eq!(map_tokens(class, &profile(4, 5)).motion, Motion::Enhanced);
        }
        // Slider 4 leaves the class baseline alone.
        assert_eq!(map_tokens(EngagementClass::Low, &profile(4, 4)).motion, Motion::Reduced);
        assert_eq!(map_tokens(EngagementClass::Medium, &profile(4, 4)).motion, Motion::Normal);
    }

    #[test]
    fn test_mapping_is_deterministic() {
        for class in EngagementClass::ALL {
            for accessibility in 1..=5 {
                for animation in 1..=5 {
                    let p = profile(accessibility, animation);
                    assert_eq!(map_tokens(class, &p), map_tokens(class, &p));
                }
            }
        }
    }

    #[test]
    fn test_scheme_to_class() {
        assert_eq!(ColorScheme::Grey.engagement_class(), EngagementClass::Low);
        assert_eq!(ColorScheme::Dark.engagement_class(), EngagementClass::Medium);
        assert_eq!(ColorScheme::Vibrant.engagement_class(), EngagementClass::High);
    }
}
