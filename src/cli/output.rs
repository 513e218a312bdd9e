//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::store::{MetadataCollection, StoreEntry};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print the store tree with box-drawing guides.
///
/// Folders are bold blue. Entries found through their metadata get a `*`.
pub fn print_tree(entries: &[StoreEntry]) {
    for line in render_tree(entries) {
        println!("{line}");
    }
}

/// Render the tree to lines, one per node.
pub fn render_tree(entries: &[StoreEntry]) -> Vec<String> {
    let mut lines = Vec::new();
    render_level(entries, "", &mut lines);
    lines
}

fn render_level(entries: &[StoreEntry], indent: &str, lines: &mut Vec<String>) {
    for (i, entry) in entries.iter().enumerate() {
        let last = i + 1 == entries.len();
        let branch = if last { "\u{2514}\u{2500}\u{2500} " } else { "\u{251c}\u{2500}\u{2500} " };

        let label = if entry.is_empty_folder() {
            format!("{} {}", style(&entry.name).blue().bold(), style("(empty)").dim())
        } else if entry.is_folder {
            style(&entry.name).blue().bold().to_string()
        } else if entry.has_metadata_match {
            format!("{} {}", entry.name, style("*").yellow())
        } else if entry.highlight {
            style(&entry.name).green().to_string()
        } else {
            entry.name.clone()
        };
        lines.push(format!("{indent}{branch}{label}"));

        // Nothing below an empty folder is worth a line of its own.
        if entry.is_folder && !entry.is_empty_folder() {
            let child_indent = if last {
                format!("{indent}    ")
            } else {
                format!("{indent}\u{2502}   ")
            };
            render_level(&entry.children, &child_indent, lines);
        }
    }
}

/// Print a table of an entry's metadata (Key, Value, Kind).
pub fn print_metadata_table(metadata: &MetadataCollection) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Key", "Value", "Kind"]);

    for m in metadata.iter() {
        let kind = if m.is_internal() { "internal" } else { "user" };
        table.add_row(vec![m.key.clone(), m.value.clone(), kind.to_string()]);
    }

    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_tree_with_guides() {
        console::set_colors_enabled(false);
        let tree = vec![
            StoreEntry::secret("mail"),
            StoreEntry::folder(
                "web",
                vec![StoreEntry::secret("github"), StoreEntry::secret("gitlab")],
            ),
        ];

        let lines = render_tree(&tree);
        assert_eq!(
            lines,
            vec![
                "\u{251c}\u{2500}\u{2500} mail",
                "\u{2514}\u{2500}\u{2500} web",
                "    \u{251c}\u{2500}\u{2500} github",
                "    \u{2514}\u{2500}\u{2500} gitlab",
            ]
        );
    }

    #[test]
    fn empty_folders_get_a_placeholder() {
        console::set_colors_enabled(false);
        let tree = vec![
            StoreEntry::folder("archive", vec![StoreEntry::folder("old", vec![])]),
            StoreEntry::folder("web", vec![StoreEntry::secret("github")]),
            StoreEntry::folder("empty", vec![]),
        ];

        let lines = render_tree(&tree);
        assert_eq!(
            lines,
            vec![
                "\u{251c}\u{2500}\u{2500} archive (empty)",
                "\u{251c}\u{2500}\u{2500} web",
                "\u{2502}   \u{2514}\u{2500}\u{2500} github",
                "\u{2514}\u{2500}\u{2500} empty (empty)",
            ]
        );
    }

    #[test]
    fn marks_metadata_matches() {
        console::set_colors_enabled(false);
        let mut hit = StoreEntry::secret("github");
        hit.has_metadata_match = true;

        let lines = render_tree(&[hit]);
        assert_eq!(lines, vec!["\u{2514}\u{2500}\u{2500} github *"]);
    }
}
