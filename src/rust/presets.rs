//! Built-in survey presets, each paired with the token profile it installs.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::profile::{UserExperience, UserProfileUpdate};
use crate::tokens::{ColorScheme, ContrastLevel, Density, DesignTokenProfile, Motion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Large, simple, high contrast
    Minimal,
    /// Standard dark theme
    Balanced,
    /// Compact, vibrant, animated
    Rich,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Self::Minimal, Self::Balanced, Self::Rich];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Balanced => "balanced",
            Self::Rich => "rich",
        }
    }

    /// Survey answers typical for the preset's audience.
    pub fn profile_update(&self) -> UserProfileUpdate {
        let (age, experience, sliders): (u32, UserExperience, [u8; 16]) = match self {
            Self::Minimal => (
                65,
                UserExperience::Confusing,
                [5, 5, 3, 5, 5, 5, 5, 5, 5, 3, 5, 3, 5, 4, 5, 3],
            ),
            Self::Balanced => (35, UserExperience::UserFriendly, [4; 16]),
            Self::Rich => (
                22,
                UserExperience::Engaging,
                [3, 3, 5, 3, 4, 3, 3, 3, 3, 5, 3, 5, 3, 5, 4, 5],
            ),
        };
        let [color_scheme, visual_hierarchy, images_multimedia, layout, mobile_responsiveness, cta_buttons, forms_input_fields, feedback_error_messages, loading_speed, personalization, accessibility, animation_transitions, scrolling_behavior, gestures_touch_controls, search_functionality, social_media_integration] =
            sliders;

        UserProfileUpdate {
            age: Some(age),
            user_experience: Some(experience),
            color_scheme: Some(color_scheme),
            visual_hierarchy: Some(visual_hierarchy),
            images_multimedia: Some(images_multimedia),
            layout: Some(layout),
            mobile_responsiveness: Some(mobile_responsiveness),
            cta_buttons: Some(cta_buttons),
            forms_input_fields: Some(forms_input_fields),
            feedback_error_messages: Some(feedback_error_messages),
            loading_speed: Some(loading_speed),
            personalization: Some(personalization),
            accessibility: Some(accessibility),
            animation_transitions: Some(animation_transitions),
            scrolling_behavior: Some(scrolling_behavior),
            gestures_touch_controls: Some(gestures_touch_controls),
            search_functionality: Some(search_functionality),
            social_media_integration: Some(social_media_integration),
            ..Default::default()
        }
    }

    /// The literal token profile the preset installs.
    pub fn tokens(&self) -> DesignTokenProfile {
        match self {
            Self::Minimal => DesignTokenProfile {
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
            Self::Balanced => DesignTokenProfile {
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
            Self::Rich => DesignTokenProfile {
                typography_base: 14.0,
                typography_scale: 1.1,
                spacing_base: 6.0,
                spacing_scale: 1.3,
                component_density: Density::Compact,
                contrast_level: ContrastLevel::Low,
                motion: Motion::Enhanced,
                focus_ring_thickness: 2.0,
                border_radius: 4.0,
                shadow_intensity: 0.2,
                color_scheme: ColorScheme::Vibrant,
                accent_color: "#ff6b9d".to_string(),
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                EngineError::ValidationError(format!(
                    "Unknown preset '{}' (expected minimal, balanced or rich)",
                    s
                ))
            })
    }
}
