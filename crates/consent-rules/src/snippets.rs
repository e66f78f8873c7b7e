//! Named expression snippets
//!
//! Rule files reference larger page expressions by id (e.g. `EVAL_COOKIEBOT_1`)
//! instead of inlining them. The table maps ids to function bodies.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnippetTable(BTreeMap<String, String>);

impl SnippetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, body: impl Into<String>) {
        self.0.insert(id.into(), body.into());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Expression to hand to the page for an `eval` step.
    ///
    /// Snippet ids expand to an immediately invoked call of the stored
    /// function; anything else is passed through untouched.
    pub fn resolve<'a>(&self, expression: &'a str) -> Cow<'a, str> {
        match self.0.get(expression) {
            Some(body) => Cow::Owned(format!("({})()", body)),
            None => Cow::Borrowed(expression),
        }
    }
}

impl FromIterator<(String, String)> for SnippetTable {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
