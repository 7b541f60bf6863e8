//! The control-flow graph: construction from a lowered Swift statement
//! list (§3.3, §4.3) and the post-construction operations run over it
//! (§4.4 item 6).

pub mod builder;
pub mod graph;
pub mod ops;

pub use graph::{Cfg, CfgEdge, CfgNode, StmtLoc};
