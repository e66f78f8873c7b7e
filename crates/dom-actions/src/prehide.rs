use crate::model::HideMethod;

/// Id of the style element cosmetic rules are appended to
pub const STYLE_ELEMENT_ID: &str = "autoconsent-css-rules";

/// CSS rule hiding every selector in `selectors`
pub fn hiding_rule(selectors: &[String], method: HideMethod) -> String {
    let snippet = match method {
        HideMethod::Display => "display: none",
        HideMethod::Opacity => "opacity: 0",
    };
    format!(
        "{} {{ {} !important; z-index: -1 !important; pointer-events: none !important; }} ",
        selectors.join(","),
        snippet
    )
}
