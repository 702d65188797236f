//! Node-link diagram editor: a headless [`FlowEngine`] that owns graph state,
//! and the [`FlowCanvas`] component that drives it from the DOM.

mod component;
mod config;
mod decorate;
mod dispatch;
mod engine;
mod error;
mod layout;
mod menu;
mod reconcile;
mod render;
mod store;
mod sync;
mod types;
mod viewport;

#[cfg(test)]
mod test_utils;

pub use component::FlowCanvas;
pub use config::{EngineConfig, EqualTimestampPolicy, FlowArgs, FlowOptions};
pub use decorate::{Decorated, NodeKey, decorate};
pub use dispatch::connect_edge_id;
pub use engine::{Effect, FlowEngine};
pub use error::{FlowError, LayoutError};
pub use layout::{
	AutoLayout, Completion, Direction, ForceOptions, LayeredOptions, LayoutEngine, LayoutOptions,
	LayoutOrchestrator, LayoutOutput, LayoutRequest, LayoutTicket,
};
pub use menu::{
	EdgeAction, EdgePatch, MenuAction, MenuAnchor, MenuKind, MenuState, NodeAction, NodeDraft,
	NodePatch, PaneAction,
};
pub use reconcile::{Reconciler, Verdict};
pub use store::GraphStore;
pub use sync::{Clock, OutboundPayload, SyncChannel, SystemClock, strip_transient};
pub use types::{Edge, HandleSide, LabelStyle, Node, NodeData, NodeKind, Position, ThemeBase, Timestamp};
pub use viewport::{Bounds, Viewport};
