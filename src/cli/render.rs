//! Human-readable output for core outcomes

use colored::Colorize;
use jit::areas::refs::Head;
use jit::artifacts::branch::branch_name::{BranchName, RefName};
use jit::artifacts::diff::text_diff::{Hunk, Line, TextDiff};
use jit::artifacts::diff::tree_diff::{ChangeKind, PathChange, Snapshot};
use jit::artifacts::objects::commit::Commit;
use jit::artifacts::objects::object_id::ObjectId;
use jit::artifacts::status::status_info::StatusReport;
use jit::commands::porcelain::branch::BranchListing;
use jit::commands::porcelain::checkout::CheckoutOutcome;
use jit::commands::porcelain::commit::CommitOutcome;
use jit::commands::porcelain::diff::FileDiff;
use jit::commands::porcelain::init::InitOutcome;
use jit::commands::porcelain::log::LogOutcome;
use jit::errors::Result;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

const LABEL_WIDTH: usize = 12;

pub fn init(writer: &mut dyn Write, outcome: &InitOutcome) -> Result<()> {
    let verb = if outcome.reinitialized {
        "Reinitialized existing"
    } else {
        "Initialized empty"
    };
    writeln!(
        writer,
        "{verb} Jit repository in {}",
        outcome.repository.git_path().display()
    )?;

    Ok(())
}

/// `[master (root-commit) 1a2b3c4] message`
pub fn commit(writer: &mut dyn Write, outcome: &CommitOutcome) -> Result<()> {
    let root = if outcome.root { " (root-commit)" } else { "" };
    writeln!(
        writer,
        "[{}{root} {}] {}",
        outcome.branch,
        outcome.oid.to_short_oid(),
        outcome.summary
    )?;

    Ok(())
}

pub fn status(writer: &mut dyn Write, report: &StatusReport) -> Result<()> {
    match &report.head {
        Head::Branch(branch) => writeln!(writer, "On branch {branch}")?,
        Head::Detached(oid) => writeln!(
            writer,
            "{} {}",
            "HEAD detached at".red(),
            oid.to_short_oid().red()
        )?,
    }

    if report.is_clean() {
        writeln!(writer, "nothing to commit, working tree clean")?;
        return Ok(());
    }

    if !report.staged.is_empty() {
        writeln!(writer, "\nChanges to be committed:")?;
        for change in &report.staged {
            let label = format!("{:<LABEL_WIDTH$}", staged_label(change.kind));
            writeln!(writer, "\t{}{}", label.green(), change.path.display())?;
        }
    }

    if !report.unstaged.is_empty() {
        writeln!(writer, "\nChanges not staged for commit:")?;
        for change in &report.unstaged {
            let label = format!("{:<LABEL_WIDTH$}", unstaged_label(change.kind));
            writeln!(writer, "\t{}{}", label.red(), change.path.display())?;
        }
    }

    if !report.untracked.is_empty() {
        writeln!(writer, "\nUntracked files:")?;
        for path in &report.untracked {
            writeln!(writer, "\t{}", path.display().to_string().red())?;
        }
    }

    if report.staged.is_empty() {
        writeln!(writer, "\nno changes added to commit")?;
    }

    Ok(())
}

fn staged_label(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Added => "new file:",
        ChangeKind::Removed => "deleted:",
        ChangeKind::Modified | ChangeKind::Unchanged => "modified:",
    }
}

fn unstaged_label(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Removed => "deleted:",
        _ => "modified:",
    }
}

/// `XY path`: X is the staged change, Y the unstaged one, `??` for untracked
pub fn status_porcelain(writer: &mut dyn Write, report: &StatusReport) -> Result<()> {
    let mut codes: BTreeMap<&Path, (char, char)> = BTreeMap::new();

    for change in &report.staged {
        codes.entry(&change.path).or_insert((' ', ' ')).0 = change.kind.status_letter();
    }
    for change in &report.unstaged {
        codes.entry(&change.path).or_insert((' ', ' ')).1 = change.kind.status_letter();
    }

    for (path, (staged, unstaged)) in codes {
        writeln!(writer, "{staged}{unstaged} {}", path.display())?;
    }
    for path in &report.untracked {
        writeln!(writer, "?? {}", path.display())?;
    }

    Ok(())
}

pub fn log(writer: &mut dyn Write, outcome: &LogOutcome, oneline: bool) -> Result<()> {
    for (position, (oid, commit)) in outcome.commits.iter().enumerate() {
        let decoration = decoration(outcome, oid);

        if oneline {
            writeln!(
                writer,
                "{}{decoration} {}",
                oid.to_short_oid().yellow(),
                commit.short_message()
            )?;
            continue;
        }

        if position > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "{}{decoration}", format!("commit {oid}").yellow())?;
        writeln!(writer, "Author: {}", commit.author().display_name())?;
        writeln!(writer, "Date:   {}", commit.author().readable_timestamp())?;
        writeln!(writer)?;
        for line in commit.message().lines() {
            writeln!(writer, "    {line}")?;
        }
    }

    Ok(())
}

/// ` (HEAD -> master, topic, tag: v1)`, or nothing when no ref points here
fn decoration(outcome: &LogOutcome, oid: &ObjectId) -> String {
    let mut refs = outcome.decorations.get(oid).cloned().unwrap_or_default();
    refs.sort();

    let mut names = Vec::with_capacity(refs.len() + 1);
    if outcome.head == Head::Detached(oid.clone()) {
        names.push("HEAD".cyan().bold().to_string());
    }

    for ref_name in refs {
        match ref_name {
            RefName::Branch(branch) if outcome.head == Head::Branch(branch.clone()) => {
                let name = format!("{} -> {}", "HEAD".cyan().bold(), branch.to_string().green().bold());
                names.insert(0, name);
            }
            RefName::Branch(branch) => names.push(branch.to_string().green().bold().to_string()),
            RefName::Tag(tag) => names.push(format!("tag: {tag}").yellow().bold().to_string()),
        }
    }

    if names.is_empty() {
        return String::new();
    }

    format!(" {}{}{}", "(".yellow(), names.join(", "), ")".yellow())
}

pub fn branches(writer: &mut dyn Write, branches: &[BranchListing]) -> Result<()> {
    for branch in branches {
        if branch.current {
            writeln!(writer, "* {}", branch.name.to_string().green())?;
        } else {
            writeln!(writer, "  {}", branch.name)?;
        }
    }

    Ok(())
}

pub fn tags(writer: &mut dyn Write, tags: &[(BranchName, ObjectId)]) -> Result<()> {
    for (name, _) in tags {
        writeln!(writer, "{name}")?;
    }

    Ok(())
}

pub fn checkout(writer: &mut dyn Write, outcome: &CheckoutOutcome, target: &Commit) -> Result<()> {
    match (&outcome.previous, &outcome.head) {
        (previous, Head::Branch(branch)) if previous == &outcome.head => {
            writeln!(writer, "Already on '{branch}'")?;
        }
        (_, Head::Branch(branch)) => writeln!(writer, "Switched to branch '{branch}'")?,
        (Head::Branch(_), Head::Detached(oid)) => {
            writeln!(writer, "Note: switching to '{oid}'.")?;
            writeln!(writer)?;
            writeln!(
                writer,
                "You are in 'detached HEAD' state. Commits are refused until you create a branch."
            )?;
            writeln!(writer)?;
            head_is_now_at(writer, oid, target)?;
        }
        (Head::Detached(_), Head::Detached(oid)) => head_is_now_at(writer, oid, target)?,
    }

    Ok(())
}

fn head_is_now_at(writer: &mut dyn Write, oid: &ObjectId, target: &Commit) -> Result<()> {
    writeln!(
        writer,
        "HEAD is now at {} {}",
        oid.to_short_oid(),
        target.short_message()
    )?;

    Ok(())
}

pub fn ls_tree(writer: &mut dyn Write, snapshot: &Snapshot) -> Result<()> {
    for (path, entry) in snapshot {
        writeln!(
            writer,
            "{} blob {}\t{}",
            entry.mode.as_str(),
            entry.oid,
            path.display()
        )?;
    }

    Ok(())
}

pub fn diff(writer: &mut dyn Write, diffs: &[FileDiff]) -> Result<()> {
    for diff in diffs {
        file_diff(writer, diff)?;
    }

    Ok(())
}

fn file_diff(writer: &mut dyn Write, diff: &FileDiff) -> Result<()> {
    let (old, new) = (&diff.old, &diff.new);

    writeln!(writer, "{}", header_line(&diff.change).bold())?;
    match (old.mode, new.mode) {
        (None, Some(mode)) => writeln!(writer, "{}", format!("new file mode {}", mode.as_str()).bold())?,
        (Some(mode), None) => {
            writeln!(writer, "{}", format!("deleted file mode {}", mode.as_str()).bold())?
        }
        (Some(old_mode), Some(new_mode)) if old_mode != new_mode => {
            writeln!(writer, "{}", format!("old mode {}", old_mode.as_str()).bold())?;
            writeln!(writer, "{}", format!("new mode {}", new_mode.as_str()).bold())?;
        }
        _ => {}
    }

    let mut oid_range = format!("index {}..{}", old.short_oid(), new.short_oid());
    if let (Some(old_mode), Some(new_mode)) = (old.mode, new.mode)
        && old_mode == new_mode
    {
        oid_range.push_str(&format!(" {}", old_mode.as_str()));
    }
    writeln!(writer, "{}", oid_range.bold())?;

    match &diff.text {
        TextDiff::Binary => writeln!(
            writer,
            "Binary files {} and {} differ",
            old.display_path("a"),
            new.display_path("b")
        )?,
        TextDiff::Hunks(hunks) => {
            writeln!(writer, "{}", format!("--- {}", old.display_path("a")).bold())?;
            writeln!(writer, "{}", format!("+++ {}", new.display_path("b")).bold())?;
            for each in hunks {
                hunk(writer, each)?;
            }
        }
    }

    Ok(())
}

fn header_line(change: &PathChange) -> String {
    let path = change.path.display();
    format!("diff --git a/{path} b/{path}")
}

fn hunk(writer: &mut dyn Write, hunk: &Hunk) -> Result<()> {
    writeln!(writer, "{}", hunk.header().cyan())?;

    for line in &hunk.lines {
        let text = line.text();
        let body = text.strip_suffix('\n').unwrap_or(text);
        match line {
            Line::Context(_) => writeln!(writer, " {body}")?,
            Line::Deleted(_) => writeln!(writer, "{}", format!("-{body}").red())?,
            Line::Inserted(_) => writeln!(writer, "{}", format!("+{body}").green())?,
        }
        if !text.ends_with('\n') {
            writeln!(writer, "\\ No newline at end of file")?;
        }
    }

    Ok(())
}
