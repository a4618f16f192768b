//! Line-oriented operation scripts.
//!
//! One operation per line, run in order against a single namespace:
//!
//! ```text
//! # comments and blank lines are skipped
//! mkdir /httpdocs
//! touch /httpdocs index.php
//! write /httpdocs/index.php rewrite some information
//! stat /httpdocs/index.php
//! ```
//!
//! The first failing line aborts the script.

use std::io::Write;

use anyhow::{Context, Result, anyhow, bail};
use drivefs_kernel::{DirEntry, Metadata, VirtualFileSystem, WriteMode};

/// One parsed script operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Mkdir(String),
    Touch { dir: String, name: String },
    Write { path: String, mode: WriteMode, text: String },
    Cat(String),
    Mv { from: String, to: String },
    Rename { path: String, name: String },
    Rm(String),
    Stat(String),
    Ls(String),
}

/// Parse one line. Returns `None` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<Op>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim_start();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let op = match (verb, args.as_slice()) {
        ("mkdir", [path]) => Op::Mkdir(path.to_string()),
        ("touch", [dir, name]) => Op::Touch {
            dir: dir.to_string(),
            name: name.to_string(),
        },
        ("write", [path, flag, ..]) => {
            let mode: WriteMode = flag
                .parse()
                .map_err(|_| anyhow!("unknown write mode {flag:?} (expected rewrite/w or append/a)"))?;
            // Text is everything after the mode, inner spacing preserved
            let after_path = rest[path.len()..].trim_start();
            let text = after_path[flag.len()..].trim_start().to_string();
            Op::Write {
                path: path.to_string(),
                mode,
                text,
            }
        }
        ("cat", [path]) => Op::Cat(path.to_string()),
        ("mv", [from, to]) => Op::Mv {
            from: from.to_string(),
            to: to.to_string(),
        },
        ("rename", [path, name]) => Op::Rename {
            path: path.to_string(),
            name: name.to_string(),
        },
        ("rm", [path]) => Op::Rm(path.to_string()),
        ("stat", [path]) => Op::Stat(path.to_string()),
        ("ls", [path]) => Op::Ls(path.to_string()),
        ("ls", []) => Op::Ls("/".to_string()),
        (
            "mkdir" | "touch" | "write" | "cat" | "mv" | "rename" | "rm" | "stat" | "ls",
            _,
        ) => bail!("wrong number of arguments for {verb}"),
        _ => bail!("unknown operation {verb:?}"),
    };
    Ok(Some(op))
}

/// Apply one operation, printing any result to `out`.
pub fn apply(fs: &VirtualFileSystem, op: &Op, out: &mut dyn Write, json: bool) -> Result<()> {
    match op {
        Op::Mkdir(path) => {
            fs.create_directory(path)?;
        }
        Op::Touch { dir, name } => {
            fs.create_file(dir, name)?;
        }
        Op::Write { path, mode, text } => {
            fs.write(path, text.as_bytes(), *mode)?;
        }
        Op::Cat(path) => {
            let data = fs.read(path)?;
            out.write_all(&data)?;
            writeln!(out)?;
        }
        Op::Mv { from, to } => fs.move_to(from, to)?,
        Op::Rename { path, name } => fs.rename(path, name)?,
        Op::Rm(path) => fs.delete(path)?,
        Op::Stat(path) => render_metadata(out, &fs.metadata(path)?, json)?,
        Op::Ls(path) => render_entries(out, &fs.list(path)?, json)?,
    }
    Ok(())
}

/// Run a whole script. Errors carry the failing line number.
pub fn run(fs: &VirtualFileSystem, script: &str, out: &mut dyn Write, json: bool) -> Result<()> {
    for (idx, line) in script.lines().enumerate() {
        let lineno = idx + 1;
        let Some(op) = parse_line(line).with_context(|| format!("line {lineno}"))? else {
            continue;
        };
        tracing::debug!("line {}: {:?}", lineno, op);
        apply(fs, &op, out, json).with_context(|| format!("line {lineno}: {}", line.trim()))?;
    }
    Ok(())
}

/// Print a metadata snapshot.
pub fn render_metadata(out: &mut dyn Write, meta: &Metadata, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(meta)?)?;
        return Ok(());
    }

    writeln!(out, "path:     {}", meta.path)?;
    writeln!(out, "kind:     {}", meta.kind)?;
    if let Some(name) = &meta.name {
        writeln!(out, "name:     {name}")?;
    }
    if let Some(size) = meta.size {
        writeln!(out, "size:     {size}")?;
    }
    writeln!(out, "created:  {}", meta.created_at)?;
    writeln!(out, "modified: {}", meta.modified_at)?;
    Ok(())
}

fn render_entries(out: &mut dyn Write, entries: &[DirEntry], json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(entries)?)?;
        return Ok(());
    }
    for entry in entries {
        let suffix = if entry.kind.is_dir() { "/" } else { "" };
        writeln!(out, "{}{}", entry.name, suffix)?;
    }
    Ok(())
}
