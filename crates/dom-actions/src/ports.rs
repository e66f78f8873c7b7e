use async_trait::async_trait;
use serde_json::Value;

use crate::errors::DomError;
use crate::model::ElementLayout;

/// Low-level page binding.
///
/// `evaluate` runs page-authored strings with full page privileges. Rule
/// bundles are trusted input; bindings must not be pointed at bundles from
/// untrusted sources.
#[async_trait]
pub trait DomPort: Send + Sync {
    /// Every element matching `selector`, in document order
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementLayout>, DomError>;

    /// Dispatch a click on the `index`-th match of `selector`
    async fn click_nth(&self, selector: &str, index: usize) -> Result<(), DomError>;

    /// Evaluate `expression` in page context and return its JSON value
    async fn evaluate(&self, expression: &str) -> Result<Value, DomError>;

    /// Append `css` to the style element with id `element_id`, creating it if needed
    async fn append_style(&self, element_id: &str, css: &str) -> Result<(), DomError>;
}
