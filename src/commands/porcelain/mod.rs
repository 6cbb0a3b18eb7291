//! Porcelain commands (user-facing operations)
//!
//! Each command is an inherent method on [`Repository`](crate::areas::repository::Repository)
//! returning a typed outcome; turning outcomes into text is left to the
//! command-line layer. Commands that change the repository hold its lock for
//! their whole run.
//!
//! ## Commands
//!
//! - `init`: Initialize a new repository
//! - `add` / `unstage`: Stage or unstage files
//! - `commit`: Create a new commit
//! - `status`: Show working tree status
//! - `diff`: Show staged or unstaged changes
//! - `log`: Show commit history
//! - `branch` / `tag`: Create, list, or delete refs
//! - `checkout`: Switch branches or commits

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod diff;
pub mod init;
pub mod log;
pub mod status;
pub mod tag;
pub mod unstage;
