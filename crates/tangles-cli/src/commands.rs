use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use tangles_diff::{encode_delta, parse_delta, Edit, EditSummary, RevisionGenerator};
use tangles_types::{AuthorsDelta, DeltaOp, HeaderDelta, PartDelta, Post, Revision};

use crate::cli::*;
use crate::config;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let diff_config = config::load(cli.config.as_deref())?;
    match cli.command {
        Command::Diff(args) => cmd_diff(args, RevisionGenerator::new(diff_config), &cli.format),
        Command::Delta(args) => {
            let delta = encode_delta(&args.old, &args.new, &diff_config);
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&delta)?),
                OutputFormat::Text if delta.is_empty() => println!("{}", "(no change)".dimmed()),
                OutputFormat::Text => println!("{delta}"),
            }
            Ok(())
        }
        Command::Explain(args) => cmd_explain(args, &cli.format),
    }
}

fn cmd_diff(args: DiffArgs, generator: RevisionGenerator, format: &OutputFormat) -> anyhow::Result<()> {
    let before = read_post(&args.before)?;
    let after = read_post(&args.after)?;
    let mut revision = generator.generate(&before, &after)?;
    revision.public = args.public;
    revision.reason = args.reason.unwrap_or_default();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&revision)?),
        OutputFormat::Text => print!("{}", render_revision(&after, &revision)?),
    }
    Ok(())
}

fn cmd_explain(args: ExplainArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let edits = parse_delta(&args.delta)?;
    match format {
        OutputFormat::Json => {
            let ops: Vec<BTreeMap<&str, serde_json::Value>> = edits.iter().map(edit_json).collect();
            println!("{}", serde_json::to_string_pretty(&ops)?);
        }
        OutputFormat::Text => print!("{}", render_edits(&edits)?),
    }
    Ok(())
}

fn read_post(path: &Path) -> anyhow::Result<Post> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not a valid post", path.display()))
}

fn edit_json(edit: &Edit) -> BTreeMap<&'static str, serde_json::Value> {
    let (op, value) = match edit {
        Edit::Keep(n) => ("keep", serde_json::Value::from(*n)),
        Edit::Delete(n) => ("delete", serde_json::Value::from(*n)),
        Edit::Insert(text) => ("insert", serde_json::Value::from(text.as_str())),
    };
    BTreeMap::from([("op", serde_json::Value::from(op)), ("value", value)])
}

fn render_edits(edits: &[Edit]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for edit in edits {
        match edit {
            Edit::Keep(n) => writeln!(out, "  {} {n}", "keep".dimmed())?,
            Edit::Delete(n) => writeln!(out, "  {} {n}", "delete".red())?,
            Edit::Insert(text) => writeln!(out, "  {} {text:?}", "insert".green())?,
        }
    }
    let summary = EditSummary::of(edits);
    writeln!(
        out,
        "{} kept, {} deleted, {} inserted",
        summary.kept,
        summary.deleted.to_string().red(),
        summary.inserted.to_string().green()
    )?;
    Ok(out)
}

fn render_revision(post: &Post, revision: &Revision) -> Result<String, fmt::Error> {
    let mut out = String::new();
    if revision.is_empty() {
        writeln!(out, "{} No changes to {}.", "✓".green(), post.id.to_string().bold())?;
        return Ok(out);
    }

    let visibility = if revision.public { "public" } else { "silent" };
    writeln!(
        out,
        "Revision of {} ({}, {} changes)",
        post.id.to_string().bold(),
        visibility.cyan(),
        revision.change_count()
    )?;
    if !revision.reason.is_empty() {
        writeln!(out, "  Reason: {}", revision.reason)?;
    }
    if !revision.title_delta.is_empty() {
        writeln!(out, "  {} {}", "title".bold(), revision.title_delta.escape_default())?;
    }
    if !revision.slug_delta.is_empty() {
        writeln!(out, "  {} {}", "slug".bold(), revision.slug_delta.escape_default())?;
    }
    if !revision.authors_deltas.is_empty() {
        writeln!(out, "  {}", "authors".bold())?;
        for delta in &revision.authors_deltas {
            render_author(&mut out, delta)?;
        }
    }
    render_parts(&mut out, "parts", &revision.parts_deltas)?;
    render_parts(&mut out, "metadata", &revision.metadata_deltas)?;
    Ok(out)
}

fn render_author(out: &mut String, delta: &AuthorsDelta) -> fmt::Result {
    writeln!(
        out,
        "    {} {} {}",
        op_label(delta.op),
        delta.value,
        positions(delta.from_position, delta.to_position).dimmed()
    )
}

fn render_parts(out: &mut String, label: &str, deltas: &[PartDelta]) -> fmt::Result {
    if deltas.is_empty() {
        return Ok(());
    }
    writeln!(out, "  {}", label.bold())?;
    for delta in deltas {
        writeln!(
            out,
            "    {} {} {}",
            op_label(delta.op),
            delta.part_id.yellow(),
            positions(delta.from_position, delta.to_position).dimmed()
        )?;
        if !delta.body.is_empty() {
            writeln!(out, "      body {}", delta.body.escape_default())?;
        }
        if !delta.sha256_from.is_empty() {
            writeln!(out, "      from blob {}", delta.sha256_from.cyan())?;
        }
        if !delta.sha256_to.is_empty() {
            writeln!(out, "      to blob {}", delta.sha256_to.cyan())?;
        }
        for header in delta.headers.values().flatten() {
            render_header(out, header)?;
        }
    }
    Ok(())
}

fn render_header(out: &mut String, delta: &HeaderDelta) -> fmt::Result {
    writeln!(
        out,
        "      {} {}: {} {}",
        op_label(delta.op),
        delta.header,
        delta.value.escape_default(),
        positions(delta.from_position, delta.to_position).dimmed()
    )
}

fn op_label(op: DeltaOp) -> colored::ColoredString {
    let label = format!("{:<4}", op.as_str());
    match op {
        DeltaOp::Add => label.green(),
        DeltaOp::Remove => label.red(),
        DeltaOp::Update => label.yellow(),
        DeltaOp::Move | DeltaOp::MoveUpdate => label.blue(),
    }
}

fn positions(from: Option<usize>, to: Option<usize>) -> String {
    let show = |pos: Option<usize>| pos.map_or_else(|| "-".to_string(), |p| p.to_string());
    format!("[{} → {}]", show(from), show(to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tangles_types::Part;

    fn plain() {
        colored::control::set_override(false);
    }

    fn post_pair() -> (Post, Post) {
        let mut before = Post::new("post-1");
        before.title = "Hello".into();
        before.authors = vec!["alice".into()];
        before.parts = vec![Part::inline("intro", "hello")];
        let mut after = before.clone();
        after.title = "Hello!".into();
        after.authors.push("bob".into());
        after.parts = vec![Part::inline("intro", "hullo")];
        (before, after)
    }

    #[test]
    fn render_empty_revision() {
        plain();
        let (before, _) = post_pair();
        let text = render_revision(&before, &Revision::default()).unwrap();
        assert!(text.contains("No changes to post-1"));
    }

    #[test]
    fn render_revision_lists_every_change() {
        plain();
        let (before, after) = post_pair();
        let revision = tangles_diff::generate_revision(&before, &after).unwrap();
        let text = render_revision(&after, &revision).unwrap();
        assert!(text.contains("Revision of post-1 (silent, 3 changes)"));
        assert!(text.contains("title =5\\t+!"));
        assert!(text.contains("add  bob [- → 1]"));
        assert!(text.contains("up   intro [0 → 0]"));
        assert!(text.contains("body =1\\t-1\\t+u\\t=3"));
    }

    #[test]
    fn render_revision_shows_headers_and_blobs() {
        plain();
        let mut before = Post::new("post-1");
        before.parts = vec![Part::inline("cover", "draft").with_header("X", "p")];
        let mut after = before.clone();
        after.parts = vec![Part::blob("cover", "abc123").with_header("X", "q")];
        let revision = tangles_diff::generate_revision(&before, &after).unwrap();
        let text = render_revision(&after, &revision).unwrap();
        assert!(text.contains("  parts\n"));
        assert!(text.contains("to blob abc123"));
        assert!(text.contains("body -5"));
        assert!(text.contains("up   X: -1\\t+q [0 → 0]"));
        assert!(!text.contains("metadata"));
    }

    #[test]
    fn render_edits_with_summary() {
        plain();
        let edits = parse_delta("=1\t-1\t+u\t=3").unwrap();
        let text = render_edits(&edits).unwrap();
        assert!(text.contains("keep 1"));
        assert!(text.contains("delete 1"));
        assert!(text.contains("insert \"u\""));
        assert!(text.ends_with("4 kept, 1 deleted, 1 inserted\n"));
    }

    #[test]
    fn edit_json_shape() {
        let json = serde_json::to_value(edit_json(&Edit::Insert("ing".into()))).unwrap();
        assert_eq!(json, serde_json::json!({"op": "insert", "value": "ing"}));
    }

    #[test]
    fn read_post_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = read_post(&path).unwrap_err();
        assert!(err.to_string().contains("is not a valid post"));
    }

    #[test]
    fn read_post_parses_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.json");
        std::fs::write(&path, r#"{"id":"p","title":"T","parts":[{"id":"a","storage":"inline","body":"x"}]}"#).unwrap();
        let post = read_post(&path).unwrap();
        assert_eq!(post.title, "T");
        assert_eq!(post.parts[0].body(), Some(&b"x"[..]));
    }
}
