//! Plain-text help rendering.

use std::fmt::Write;

use crate::{
    cmd::Cmd,
    def::{ArgumentMode, OptionDefinition},
};

macro_rules! w {
    ($($tt:tt)*) => {
        drop(write!($($tt)*))
    };
}

const WRAP_WIDTH: usize = 78;
const INDENT: usize = 4;

pub(crate) fn render(cmd: &Cmd<'_>, verbose: bool) -> String {
    let mut buf = String::new();
    append_summary(&mut buf, cmd);
    append_usage(&mut buf, cmd);
    append_description(&mut buf, cmd);
    append_subcommands(&mut buf, cmd, verbose);
    append_options(&mut buf, cmd, verbose);
    buf
}

fn append_summary(buf: &mut String, cmd: &Cmd<'_>) {
    let Some(summary) = cmd.command().get_summary() else { return };
    w!(buf, "name\n");
    w!(buf, "    {} - {summary}\n", cmd.name());
    let aliases = cmd.command().aliases();
    if !aliases.is_empty() {
        w!(buf, "    aliases: {}\n", aliases.join(" "));
    }
}

fn append_usage(buf: &mut String, cmd: &Cmd<'_>) {
    let Some(usage) = cmd.command().get_usage() else { return };
    let mut full = String::new();
    for ancestor in cmd.ancestors() {
        w!(full, "{} ", ancestor.name());
    }
    full.push_str(usage);
    blank_line(buf);
    w!(buf, "usage\n");
    w!(buf, "{}\n", wrap_and_indent(&full, WRAP_WIDTH, INDENT));
}

fn append_description(buf: &mut String, cmd: &Cmd<'_>) {
    let Some(description) = cmd.command().get_description() else { return };
    blank_line(buf);
    w!(buf, "description\n");
    w!(buf, "{}\n", wrap_and_indent(description, WRAP_WIDTH, INDENT));
}

fn append_subcommands(buf: &mut String, cmd: &Cmd<'_>, verbose: bool) {
    let subcommands = cmd.command().subcommands();
    if subcommands.is_empty() {
        return;
    }

    blank_line(buf);
    let title = if cmd.supercommand().is_some() { "subcommands" } else { "commands" };
    w!(buf, "{title}\n");

    let mut shown: Vec<_> = subcommands.iter().filter(|c| !c.is_hidden() || verbose).collect();
    shown.sort_by(|a, b| a.name().cmp(b.name()));
    let width = shown.iter().map(|c| c.name().len()).max().unwrap_or(0) + 4;
    for sub in &shown {
        w!(buf, "    {:<width$} {}\n", sub.name(), sub.get_summary().unwrap_or(""));
    }

    if !verbose {
        match subcommands.len() - shown.len() {
            0 => {}
            1 => w!(buf, "    (1 hidden command omitted; show it with --verbose)\n"),
            n => w!(buf, "    ({n} hidden commands omitted; show them with --verbose)\n"),
        }
    }
}

fn append_options(buf: &mut String, cmd: &Cmd<'_>, verbose: bool) {
    let mut groups: Vec<(String, Vec<&OptionDefinition>)> =
        vec![("options".to_string(), cmd.command().option_definitions().iter().collect())];
    if let Some(supercmd) = cmd.supercommand() {
        groups.push((format!("options for {}", supercmd.name()), supercmd.global_option_definitions()));
    }

    let width = groups
        .iter()
        .flat_map(|(_, defs)| defs.iter())
        .filter(|d| !d.is_hidden() || verbose)
        .map(|d| long_label(d).len())
        .max()
        .unwrap_or(0)
        + 6;

    groups.sort_by(|(a, _), (b, _)| a.cmp(b));
    for (title, defs) in groups {
        append_option_group(buf, &title, defs, width, verbose);
    }
}

fn append_option_group(buf: &mut String, title: &str, defs: Vec<&OptionDefinition>, width: usize, verbose: bool) {
    let mut shown: Vec<_> = defs.into_iter().filter(|d| !d.is_hidden() || verbose).collect();
    if shown.is_empty() {
        return;
    }
    shown.sort_by_key(|d| d.short().map(String::from).unwrap_or_else(|| d.long().unwrap_or("").to_string()));

    blank_line(buf);
    w!(buf, "{title}\n");
    for defn in shown {
        let short = match defn.short() {
            Some(s) => format!("-{s}"),
            None => String::new(),
        };
        w!(buf, "    {short:<2} {:<width$} {}\n", long_label(defn), defn.desc());
    }
}

/// `--long` plus a value placeholder for value-taking options.
fn long_label(defn: &OptionDefinition) -> String {
    let Some(long) = defn.long() else { return String::new() };
    match defn.argument() {
        ArgumentMode::Forbidden => format!("--{long}"),
        ArgumentMode::Required => format!("--{long}=<value>"),
        ArgumentMode::Optional => format!("--{long}[=<value>]"),
    }
}

fn blank_line(buf: &mut String) {
    if !buf.is_empty() {
        buf.push('\n');
    }
}

/// Word-wraps each paragraph at `width` columns and prefixes every line
/// with `indent` spaces. Paragraphs are separated by blank lines.
fn wrap_and_indent(text: &str, width: usize, indent: usize) -> String {
    let max = width - indent;
    let pad = " ".repeat(indent);
    let mut paragraphs = Vec::new();
    for paragraph in text.split("\n\n") {
        let mut lines: Vec<String> = Vec::new();
        for word in paragraph.split_whitespace() {
            match lines.last_mut() {
                Some(line) if line.len() + 1 + word.len() < max => {
                    line.push(' ');
                    line.push_str(word);
                }
                _ => lines.push(word.to_string()),
            }
        }
        let mut res = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                res.push('\n');
            }
            res.push_str(&pad);
            res.push_str(line);
        }
        paragraphs.push(res);
    }
    paragraphs.join("\n\n")
}
