pub mod canon;
pub mod error;
pub mod graph;
pub mod hypergraph;
pub mod id;
pub mod io;

pub use canon::{CanonicalOracle, CanonKey, RefinementOracle};
pub use error::CoreError;
pub use graph::{Graph, ShapeFlags};
pub use hypergraph::{BfsIter, Hypergraph, TdNode};
pub use id::{BasisId, EdgeName, TdNodeId, VertexId};
pub use io::{decode_directed, decode_graph6, decode_sparse6, encode_directed, encode_graph6, encode_sparse6};
