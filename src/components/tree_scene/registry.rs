use std::collections::VecDeque;

use log::{debug, warn};

/// Global cap on nodes across every live tree.
pub const MAX_TOTAL_NODES: usize = 500;

/// Anything that spends part of the node budget.
pub trait NodeCount {
	fn node_count(&self) -> usize;
}

/// Live graphs in admission order with a running node total.
///
/// Graphs only ever enter at the back and leave from the front, so the
/// oldest survivor is always the next to go.
#[derive(Debug)]
pub struct SceneRegistry<G> {
	graphs: VecDeque<G>,
	total_nodes: usize,
	max_total_nodes: usize,
}

impl<G: NodeCount> SceneRegistry<G> {
	pub fn new(max_total_nodes: usize) -> Self {
		Self {
			graphs: VecDeque::new(),
			total_nodes: 0,
			max_total_nodes,
		}
	}

	pub fn total_nodes(&self) -> usize {
		self.total_nodes
	}

	pub fn len(&self) -> usize {
		self.graphs.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &G> {
		self.graphs.iter()
	}

	pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut G> {
		self.graphs.iter_mut()
	}

	/// Evict the oldest graphs until `graph` fits, then append it.
	///
	/// A graph larger than the whole budget is still admitted once everything
	/// else is gone. Returns the evicted graphs, oldest first.
	pub fn admit(&mut self, graph: G) -> Vec<G> {
		let need = graph.node_count();
		let mut evicted = Vec::new();
		while self.total_nodes + need > self.max_total_nodes {
			let Some(oldest) = self.evict_oldest() else {
				break;
			};
			evicted.push(oldest);
		}
		if need > self.max_total_nodes {
			warn!(
				"Admitting a {need}-node graph over the {}-node budget",
				self.max_total_nodes
			);
		}
		self.total_nodes += need;
		self.graphs.push_back(graph);
		debug!(
			"Admitted {need} nodes, evicted {} graphs, {} live nodes in {} graphs",
			evicted.len(),
			self.total_nodes,
			self.graphs.len()
		);
		evicted
	}

	pub fn evict_oldest(&mut self) -> Option<G> {
		let graph = self.graphs.pop_front()?;
		self.total_nodes -= graph.node_count();
		Some(graph)
	}
}
