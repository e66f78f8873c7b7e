use serde::{Deserialize, Serialize};

/// Layout facts of one matched element, as reported by the page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementLayout {
    /// `offsetParent !== null`
    #[serde(default)]
    pub has_offset_parent: bool,
    /// Computed `position`
    #[serde(default = "default_position")]
    pub position: String,
    /// Computed `display`
    #[serde(default = "default_display")]
    pub display: String,
}

impl ElementLayout {
    /// Element laid out in the normal flow
    pub fn shown() -> Self {
        Self {
            has_offset_parent: true,
            position: default_position(),
            display: default_display(),
        }
    }

    /// Element removed from layout (`display: none` or inside a hidden parent)
    pub fn hidden() -> Self {
        Self {
            has_offset_parent: false,
            position: default_position(),
            display: "none".to_string(),
        }
    }

    /// Fixed element; these have no offset parent even when rendered
    pub fn fixed() -> Self {
        Self {
            has_offset_parent: false,
            position: "fixed".to_string(),
            display: default_display(),
        }
    }

    pub fn is_visible(&self) -> bool {
        // fixed elements may be visible even if the parent is not
        self.has_offset_parent || (self.position == "fixed" && self.display != "none")
    }
}

impl Default for ElementLayout {
    fn default() -> Self {
        Self::shown()
    }
}

fn default_position() -> String {
    "static".to_string()
}

fn default_display() -> String {
    "block".to_string()
}

/// CSS technique used to hide prehide selectors
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HideMethod {
    #[default]
    Display,
    Opacity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_rules() {
        assert!(ElementLayout::shown().is_visible());
        assert!(!ElementLayout::hidden().is_visible());
        assert!(ElementLayout::fixed().is_visible());

        let fixed_but_none = ElementLayout {
            display: "none".to_string(),
            ..ElementLayout::fixed()
        };
        assert!(!fixed_but_none.is_visible());
    }

    #[test]
    fn test_layout_defaults_from_json() {
        let layout: ElementLayout = serde_json::from_str("{}").unwrap();
        assert!(!layout.has_offset_parent);
        assert_eq!(layout.position, "static");
        assert!(!layout.is_visible());
    }
}
