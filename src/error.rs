use std::time::Duration;

use thiserror::Error;

/// Failure of the hierarchical layout engine.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout engine panicked: {0}")]
    EnginePanicked(String),

    #[error("layout engine returned no coordinates for {0} registered nodes")]
    NoCoordinates(usize),

    #[error("layout engine did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("layout worker failed: {0}")]
    Worker(String),
}

/// Problems reported by [`GraphInput::validate`](crate::model::GraphInput::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{collection}[{index}] has an empty id")]
    EmptyId {
        collection: &'static str,
        index: usize,
    },

    #[error("duplicate id `{id}` in {collection}")]
    DuplicateId { collection: &'static str, id: String },

    #[error("sub-category `{c2}` references unknown category `{c1}`")]
    UnknownCategory { c2: String, c1: String },

    #[error("sub-category `{c2}` contains unknown node `{node}`")]
    UnknownMember { c2: String, node: String },
}
