//! Commit history traversal
//!
//! History is walked along first parents only, newest first, starting from
//! any commit and ending at a root commit.

pub mod rev_list;
