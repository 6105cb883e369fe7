#[cfg(feature = "cli")]
pub mod cli;
pub mod compose;
pub mod config;
pub mod error;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod overlap;
pub mod pipeline;
pub mod projection;
pub mod resolver;
mod validate;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{DuplicatePolicy, LayoutConfig, load_config};
pub use error::{InputError, LayoutError};
pub use layout::{DagreOracle, Direction, LayeredOracle, LayoutOptions, LayoutOracle, Placement};
pub use model::{C1Category, C2Category, Edge, GraphInput, LayoutResult, Node, Position, Relationship};
pub use pipeline::{arrange_nodes, arrange_nodes_with, layout_graph, layout_graph_with};
