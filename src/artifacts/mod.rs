//! Version-control data structures and algorithms
//!
//! - `branch`: Ref names and revision parsing
//! - `checkout`: Checkout conflict detection and application
//! - `database`: Database entry types
//! - `diff`: Tree, snapshot and line diffs
//! - `index`: Index/staging area data structures
//! - `log`: Commit history traversal
//! - `objects`: Object types (blob, tree, commit) and the tree builder
//! - `status`: Working tree status inspection

pub mod branch;
pub mod checkout;
pub mod database;
pub mod diff;
pub mod index;
pub mod log;
pub mod objects;
pub mod status;
