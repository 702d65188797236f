use thiserror::Error;

/// Failure reported by a layout engine. The previous positions stay in place.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LayoutError {
	#[error("edge `{edge}` references unknown node `{node}`")]
	DanglingEdge { edge: String, node: String },
	#[error("layout engine rejected the graph: {0}")]
	Rejected(String),
}

#[derive(Debug, Error)]
pub enum FlowError {
	#[error("node id `{0}` already exists")]
	DuplicateNode(String),
	#[error("unknown node `{0}`")]
	UnknownNode(String),
	#[error("unknown edge `{0}`")]
	UnknownEdge(String),
	#[error("invalid host arguments: {0}")]
	InvalidArgs(#[from] serde_json::Error),
}
