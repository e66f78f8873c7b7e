//! Hand-written CMP strategies
//!
//! These implement [`ConsentCmp`](crate::ConsentCmp) directly for platforms
//! whose flow does not fit the declarative rule schema.

mod cookiebot;

pub use cookiebot::Cookiebot;

use std::sync::Arc;

use dom_actions::ConsentActions;

use crate::cmp::ConsentCmp;

/// Every built-in strategy, wired to `actions`
pub fn builtin_cmps(actions: Arc<dyn ConsentActions>) -> Vec<Arc<dyn ConsentCmp>> {
    vec![Arc::new(Cookiebot::new(actions))]
}
