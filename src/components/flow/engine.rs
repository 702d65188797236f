//! The widget's single owner of graph state.
//!
//! Every mutation source (host push, pointer interaction, layout completion,
//! theme change) is a named method on [`FlowEngine`]. Methods return the
//! [`Effect`]s the surrounding component must carry out; the engine itself
//! never talks to the host, the layout engine or the DOM.

use log::{error, info};

use super::config::{EngineConfig, FlowArgs, FlowOptions};
use super::error::LayoutError;
use super::layout::{Completion, LayoutOrchestrator, LayoutOutput, LayoutRequest, LayoutTicket};
use super::menu::MenuState;
use super::reconcile::Reconciler;
use super::store::GraphStore;
use super::sync::{Clock, OutboundPayload, SyncChannel, SystemClock};
use super::types::{Edge, Node, ThemeBase, Timestamp};
use super::viewport::Viewport;

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
	/// Deliver to the host.
	Publish(OutboundPayload),
	/// Hand to the layout engine; report back through
	/// [`FlowEngine::layout_finished`].
	RunLayout(LayoutRequest),
	/// Fit the viewport to the graph once.
	FitView,
}

pub struct FlowEngine<C = SystemClock> {
	pub(super) store: GraphStore,
	pub(super) sync: SyncChannel<C>,
	pub(super) reconciler: Reconciler,
	pub(super) layout: LayoutOrchestrator,
	pub(super) menu: MenuState,
	pub(super) selection: Option<String>,
	pub(super) options: FlowOptions,
	pub(super) config: EngineConfig,
	pub(super) theme: ThemeBase,
	pub(super) viewport: Viewport,
}

impl<C: Clock> FlowEngine<C> {
	/// Seed the store from the host's initial snapshot.
	pub fn new(args: FlowArgs, clock: C, config: EngineConfig) -> Self {
		let FlowArgs {
			nodes,
			edges,
			timestamp,
			options,
		} = args;
		let theme = ThemeBase::default();
		let mut store = GraphStore::new(nodes, edges);
		store.restyle_edges(&theme.label_style());
		Self {
			store,
			sync: SyncChannel::new(clock, timestamp),
			reconciler: Reconciler::new(config.equal_timestamp),
			layout: LayoutOrchestrator::default(),
			menu: MenuState::None,
			selection: None,
			options,
			config,
			theme,
			viewport: Viewport::default(),
		}
	}

	pub fn nodes(&self) -> &[Node] {
		self.store.nodes()
	}

	pub fn edges(&self) -> &[Edge] {
		self.store.edges()
	}

	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	pub fn menu(&self) -> &MenuState {
		&self.menu
	}

	pub fn selection(&self) -> Option<&str> {
		self.selection.as_deref()
	}

	pub fn options(&self) -> &FlowOptions {
		&self.options
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn theme(&self) -> ThemeBase {
		self.theme
	}

	pub fn last_applied(&self) -> Timestamp {
		self.sync.last_applied()
	}

	pub fn layout(&self) -> &LayoutOrchestrator {
		&self.layout
	}

	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	pub fn viewport_mut(&mut self) -> &mut Viewport {
		&mut self.viewport
	}

	/// The rendering surface knows every node's intrinsic size.
	pub fn nodes_initialized(&mut self) -> Vec<Effect> {
		self.layout.set_surface_ready();
		self.request_layout().into_iter().collect()
	}

	pub fn layout_finished(
		&mut self,
		ticket: LayoutTicket,
		result: Result<LayoutOutput, LayoutError>,
	) -> Vec<Effect> {
		let output = match result {
			Ok(output) => output,
			Err(err) => {
				error!("layout {ticket:?} failed, keeping previous positions: {err}");
				self.layout.fail(ticket);
				return Vec::new();
			}
		};
		let generation = self.store.generation();
		match self.layout.complete(ticket, generation) {
			Completion::Discard => self.request_layout().into_iter().collect(),
			Completion::Apply => {
				info!(
					"layout {} applied to {} nodes",
					ticket.sequence,
					output.nodes.len()
				);
				self.store.apply_layout(&output.nodes, &output.edges);
				self.store.restyle_edges(&self.theme.label_style());
				let mut effects = vec![self.publish(None)];
				if self.options.fit_view && self.layout.take_fit(generation) {
					effects.push(Effect::FitView);
				}
				effects
			}
		}
	}

	/// Restyle edge labels. Derived state only, so nothing is published.
	pub fn set_theme(&mut self, theme: ThemeBase) {
		self.theme = theme;
		self.store.restyle_edges(&theme.label_style());
	}

	pub fn fit_view(&mut self) {
		let min_zoom = self.options.min_zoom;
		self.viewport.fit(
			self.store.nodes(),
			self.config.fit_padding,
			min_zoom,
			self.config.max_zoom.max(min_zoom),
		);
	}

	pub(super) fn request_layout(&mut self) -> Option<Effect> {
		let ticket = self.layout.begin(self.store.generation())?;
		info!(
			"running layout {} for generation {}",
			ticket.sequence, ticket.generation
		);
		Some(Effect::RunLayout(LayoutRequest {
			ticket,
			nodes: self.store.nodes().to_vec(),
			edges: self.store.edges().to_vec(),
			options: self.options.layout_options.clone(),
		}))
	}

	pub(super) fn publish(&mut self, selected_id: Option<String>) -> Effect {
		self.selection = selected_id.clone();
		Effect::Publish(
			self.sync
				.publish(self.store.nodes(), self.store.edges(), selected_id),
		)
	}
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;

	use super::*;
	use crate::components::flow::layout::{AutoLayout, LayoutEngine};
	use crate::components::flow::menu::{EdgeAction, EdgePatch, MenuAction};
	use crate::components::flow::test_utils::{args, engine, layout_request, node, published};
	use crate::components::flow::types::Position;

	#[test]
	fn layout_runs_once_after_initialization() {
		let (mut engine, _) = engine(vec![node("a"), node("b")], vec![], 100);
		let effects = engine.nodes_initialized();
		let request = layout_request(&effects).expect("layout requested");
		let output = block_on(AutoLayout.layout(
			request.nodes.clone(),
			request.edges.clone(),
			&request.options,
		));
		let effects = engine.layout_finished(request.ticket, output);
		assert_eq!(published(&effects).len(), 1);

		assert!(engine.nodes_initialized().is_empty());
		engine.drag_started();
		engine.node_drag_stop("a", Position::new(300.0, 300.0));
		assert!(engine.nodes_initialized().is_empty());
		assert_eq!(engine.store().node("a").unwrap().position, Position::new(300.0, 300.0));
	}

	/// Mount order of the canvas: seed from the first args, report the
	/// surface, then only later args pushes reconcile.
	#[test]
	fn mount_sequence_lays_out_once_per_snapshot() {
		let (mut engine, clock) = engine(
			vec![node("a"), node("b")],
			vec![Edge::new("ab", "a", "b")],
			100,
		);
		let mut runs = 0;
		let mut settle = |engine: &mut FlowEngine<_>, mut pending: Vec<Effect>| {
			while let Some(effect) = pending.pop() {
				if let Effect::RunLayout(request) = effect {
					runs += 1;
					let output = block_on(AutoLayout.layout(
						request.nodes,
						request.edges,
						&request.options,
					));
					pending.extend(engine.layout_finished(request.ticket, output));
				}
			}
		};

		let effects = engine.nodes_initialized();
		settle(&mut engine, effects);
		engine.drag_started();
		let effects = engine.node_drag_stop("a", Position::new(5.0, 5.0));
		settle(&mut engine, effects);
		let effects = engine.nodes_initialized();
		settle(&mut engine, effects);

		clock.set(200);
		let mut effects = engine.host_push(args(vec![node("c")], vec![], 200));
		effects.extend(engine.nodes_initialized());
		settle(&mut engine, effects);
		drop(settle);
		assert_eq!(runs, 2);
	}

	#[test]
	fn failed_layout_keeps_positions_and_publishes_nothing() {
		let mut a = node("a");
		a.position = Position::new(7.0, 7.0);
		let (mut engine, _) = engine(vec![a], vec![], 100);
		let request = layout_request(&engine.nodes_initialized()).unwrap();
		let effects = engine.layout_finished(
			request.ticket,
			Err(LayoutError::Rejected("boom".into())),
		);
		assert!(effects.is_empty());
		assert_eq!(engine.store().node("a").unwrap().position, Position::new(7.0, 7.0));
		assert!(engine.nodes_initialized().is_empty());
	}

	#[test]
	fn fit_is_requested_once_per_generation() {
		let (mut engine, _) = engine(vec![node("a")], vec![], 100);
		engine.options.fit_view = true;
		let request = layout_request(&engine.nodes_initialized()).unwrap();
		let effects = engine.layout_finished(
			request.ticket,
			Ok(LayoutOutput {
				nodes: request.nodes.clone(),
				edges: request.edges.clone(),
			}),
		);
		assert!(effects.contains(&Effect::FitView));

		engine.layout.mark_stale();
		let again = layout_request(&engine.nodes_initialized()).unwrap();
		let effects = engine.layout_finished(
			again.ticket,
			Ok(LayoutOutput {
				nodes: again.nodes,
				edges: again.edges,
			}),
		);
		assert!(!effects.contains(&Effect::FitView));
		assert_eq!(published(&effects).len(), 1);
	}

	#[test]
	fn local_structural_edit_during_layout_reruns_it() {
		let (mut engine, _) = engine(vec![node("a"), node("b")], vec![], 100);
		engine.options.allow_new_edges = true;
		let request = layout_request(&engine.nodes_initialized()).unwrap();
		engine.connect("a", "b");
		let effects = engine.layout_finished(
			request.ticket,
			Ok(LayoutOutput {
				nodes: request.nodes,
				edges: request.edges,
			}),
		);
		assert!(published(&effects).is_empty());
		let rerun = layout_request(&effects).expect("re-armed layout");
		assert_eq!(rerun.edges.len(), 1);
	}

	#[test]
	fn edge_edits_made_during_layout_survive_it() {
		let (mut engine, _) = engine(
			vec![node("a"), node("b")],
			vec![Edge::new("ab", "a", "b")],
			100,
		);
		engine.options.enable_edge_menu = true;
		let request = layout_request(&engine.nodes_initialized()).unwrap();

		assert!(engine.open_edge_menu("ab", 10.0, 10.0));
		engine.apply_menu_action(MenuAction::Edge(EdgeAction::Edit(EdgePatch {
			label: Some("calls".into()),
			animated: Some(true),
			..EdgePatch::default()
		})));

		let output = block_on(AutoLayout.layout(request.nodes, request.edges, &request.options));
		let effects = engine.layout_finished(request.ticket, output);
		let payload = published(&effects)[0];
		assert_eq!(payload.edges[0].label.as_deref(), Some("calls"));
		assert!(payload.edges[0].animated);
		assert_eq!(engine.edges()[0].label.as_deref(), Some("calls"));
	}

	#[test]
	fn theme_restyles_edges_without_publishing() {
		let (mut engine, _) = engine(
			vec![node("a"), node("b")],
			vec![Edge::new("ab", "a", "b")],
			100,
		);
		let published_before = engine.sync.published();
		engine.set_theme(ThemeBase::Dark);
		assert_eq!(
			engine.edges()[0].label_style.as_ref().map(|s| s.fill.as_str()),
			Some("white")
		);
		assert_eq!(engine.sync.published(), published_before);
	}
}
