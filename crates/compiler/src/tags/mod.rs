//! Built-in tags.

mod control;
mod scope;

pub use control::{ElseTag, ForTag, IfTag, LOOP_VARIABLE};
pub use scope::{IncludeTag, SetTag};

use crate::tag::Tag;
use std::sync::Arc;

pub fn builtins() -> Vec<Arc<dyn Tag>> {
    vec![
        Arc::new(IfTag),
        Arc::new(ElseTag),
        Arc::new(ForTag),
        Arc::new(SetTag),
        Arc::new(IncludeTag),
    ]
}
