//! Report model
//!
//! Parses per-class XML test reports (`TEST-<class>.xml`) into a small
//! element tree that assertions can walk by tag and attribute.

mod node;
mod reader;

pub use node::ReportNode;
pub use reader::{parse, parse_file};
