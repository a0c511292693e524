//! Which-key menu layout.
//!
//! Display entries are packed into columns of `key → name` triples, using as
//! few lines as fit in a target line length. The result is a set of text
//! layers, one per [`TokenCategory`], that overlay each other when painted at
//! the same origin, so hosts can style keys, arrows, commands and submenus
//! independently.
//!
//! All positions and widths are in terminal cells (`unicode-width`).

use std::collections::BTreeMap;

use unicode_width::UnicodeWidthStr;

use crate::keymap::{DisplayEntry, EntryKind, SubMenu};

/// Glyph between a key and its name.
pub const ARROW: &str = "→";
/// Rows per column on the first layout attempt.
pub const ROWS_PER_COLUMN: usize = 6;
/// Column count the fallback search starts from.
pub const MAX_COLUMNS: usize = 5;

const NO_ITEM_FOUND: &str = "No item found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenCategory {
    Key,
    Arrow,
    /// Name of a command entry.
    Command,
    /// Name of a submenu entry.
    Binding,
}

impl TokenCategory {
    pub const ALL: [Self; 4] = [Self::Key, Self::Arrow, Self::Command, Self::Binding];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Arrow => "arrow",
            Self::Command => "command",
            Self::Binding => "binding",
        }
    }
}

impl From<EntryKind> for TokenCategory {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Binding => Self::Binding,
            EntryKind::Command => Self::Command,
        }
    }
}

/// A positioned piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub category: TokenCategory,
    pub line: usize,
    pub column: usize,
    pub text: String,
    /// Cells the token occupies. For the arrow this is the configured arrow width.
    pub width: usize,
}

/// Knobs for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    pub target_line_length: usize,
    /// Cells the arrow glyph is rendered with by the host, 1 or 2.
    pub arrow_width: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            target_line_length: 100,
            arrow_width: 1,
        }
    }
}

/// A rendered menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub n_lines: usize,
    /// Widest line over all layers, in cells.
    pub max_line_length: usize,
    pub tokens: Vec<Token>,
    layers: BTreeMap<TokenCategory, String>,
}

impl Layout {
    /// The layer for `category`: one line per layout line, `\n` separated.
    #[must_use]
    pub fn text(&self, category: TokenCategory) -> &str {
        self.layers.get(&category).map_or("", String::as_str)
    }

    /// All layers flattened into plain lines.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let (lines, _) = assemble(self.tokens.iter(), self.n_lines);
        lines.join("\n")
    }
}

/// Lay out `menu` under `when`.
///
/// A menu without entries renders a single "No item found" line.
#[must_use]
pub fn render(menu: &SubMenu, when: Option<&str>, options: &LayoutOptions) -> Layout {
    match menu.entries(when) {
        Some(entries) if !entries.is_empty() => render_entries(entries, options),
        _ => render_entries(&[no_item_found()], options),
    }
}

fn no_item_found() -> DisplayEntry {
    DisplayEntry {
        key: String::new(),
        name: NO_ITEM_FOUND.to_string(),
        kind: EntryKind::Command,
        when: None,
    }
}

/// Lay out an already ordered list of entries.
#[must_use]
pub fn render_entries(entries: &[DisplayEntry], options: &LayoutOptions) -> Layout {
    let rows = choose_rows(entries, options);
    let (tokens, _) = place_columns(entries, rows, options.arrow_width);
    let n_lines = tokens.iter().map(|token| token.line + 1).max().unwrap_or(0);

    let mut layers = BTreeMap::new();
    let mut max_line_length = 0;
    for category in TokenCategory::ALL {
        let (lines, widths) = assemble(tokens.iter().filter(|token| token.category == category), n_lines);
        max_line_length = widths.into_iter().fold(max_line_length, usize::max);
        layers.insert(category, lines.join("\n"));
    }

    Layout {
        n_lines,
        max_line_length,
        tokens,
        layers,
    }
}

/// Rows per column: [`ROWS_PER_COLUMN`] if that fits, else the most
/// columns (from [`MAX_COLUMNS`] down) that fit, else a single column.
fn choose_rows(entries: &[DisplayEntry], options: &LayoutOptions) -> usize {
    let total = entries.len().max(1);
    let fits = |rows: usize| {
        let (_, width) = place_columns(entries, rows, options.arrow_width);
        width <= options.target_line_length
    };

    if fits(ROWS_PER_COLUMN) {
        return ROWS_PER_COLUMN;
    }
    (2..=MAX_COLUMNS)
        .rev()
        .map(|columns| total.div_ceil(columns))
        .find(|&rows| fits(rows))
        .unwrap_or(total)
}

/// Place entries in columns of `rows` lines. Returns the tokens and the
/// total width of the block.
fn place_columns(entries: &[DisplayEntry], rows: usize, arrow_width: usize) -> (Vec<Token>, usize) {
    let mut tokens = Vec::with_capacity(entries.len() * 3);
    let mut start = 0;

    for chunk in entries.chunks(rows.max(1)) {
        let key_len = chunk.iter().map(|entry| entry.key.width()).max().unwrap_or(0);
        let name_len = chunk.iter().map(|entry| entry.name.width()).max().unwrap_or(0);
        let arrow_column = start + key_len + 1;
        let name_column = arrow_column + arrow_width + 1;

        for (line, entry) in chunk.iter().enumerate() {
            let key_width = entry.key.width();
            tokens.push(Token {
                category: TokenCategory::Key,
                line,
                column: start + key_len - key_width,
                text: entry.key.clone(),
                width: key_width,
            });
            tokens.push(Token {
                category: TokenCategory::Arrow,
                line,
                column: arrow_column,
                text: ARROW.to_string(),
                width: arrow_width,
            });
            tokens.push(Token {
                category: entry.kind.into(),
                line,
                column: name_column,
                text: entry.name.clone(),
                width: entry.name.width(),
            });
        }

        start = name_column + name_len + 1;
    }

    (tokens, start.saturating_sub(1))
}

/// Build `n_lines` lines from tokens, padding each token to its column.
/// Returns the lines and their widths in cells.
fn assemble<'a>(tokens: impl Iterator<Item = &'a Token>, n_lines: usize) -> (Vec<String>, Vec<usize>) {
    let mut sorted: Vec<&Token> = tokens.collect();
    sorted.sort_by_key(|token| (token.line, token.column));

    let mut lines = vec![String::new(); n_lines];
    let mut widths = vec![0; n_lines];
    for token in sorted {
        let (Some(line), Some(width)) = (lines.get_mut(token.line), widths.get_mut(token.line)) else {
            continue;
        };
        if token.column > *width {
            line.extend(std::iter::repeat_n(' ', token.column - *width));
            *width = token.column;
        }
        line.push_str(&token.text);
        *width += token.width;
    }
    (lines, widths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{default_bindings, normalize, ChordPath, Resolved};

    fn entry(key: &str, name: &str, kind: EntryKind) -> DisplayEntry {
        DisplayEntry {
            key: key.to_string(),
            name: name.to_string(),
            kind,
            when: None,
        }
    }

    fn single_char_entries(count: usize) -> Vec<DisplayEntry> {
        ('!'..)
            .filter(|ch| !ch.is_whitespace())
            .take(count)
            .map(|ch| entry(&ch.to_string(), "x", EntryKind::Command))
            .collect()
    }

    #[test]
    fn small_menu_uses_one_column() {
        let entries = [
            entry("<backspace>", "Back", EntryKind::Command),
            entry("SPC", "+Leader", EntryKind::Binding),
            entry("a", "Apply", EntryKind::Command),
        ];
        let layout = render_entries(&entries, &LayoutOptions::default());

        assert_eq!(layout.n_lines, 3);
        assert_eq!(layout.text(TokenCategory::Key), "<backspace>\n        SPC\n          a");
        assert_eq!(layout.text(TokenCategory::Arrow), "            →\n            →\n            →");
        assert_eq!(layout.text(TokenCategory::Command), "              Back\n\n              Apply");
        assert_eq!(layout.text(TokenCategory::Binding), "\n              +Leader\n");
        assert_eq!(layout.max_line_length, 21);
        assert_eq!(
            layout.plain_text(),
            "<backspace> → Back\n        SPC → +Leader\n          a → Apply"
        );
    }

    #[test]
    fn six_rows_per_column_when_it_fits() {
        let layout = render_entries(&single_char_entries(12), &LayoutOptions::default());
        assert_eq!(layout.n_lines, 6);
        // two columns of "k → x", one space apart
        assert_eq!(layout.max_line_length, 11);
    }

    #[test]
    fn narrow_target_falls_back_to_one_column() {
        let options = LayoutOptions {
            target_line_length: 10,
            arrow_width: 1,
        };
        let layout = render_entries(&single_char_entries(12), &options);
        assert_eq!(layout.n_lines, 12);
        assert_eq!(layout.max_line_length, 5);
    }

    #[test]
    fn column_search_starts_at_five_columns() {
        let options = LayoutOptions {
            target_line_length: 35,
            arrow_width: 1,
        };
        let layout = render_entries(&single_char_entries(40), &options);
        assert_eq!(layout.n_lines, 8);
        assert_eq!(layout.max_line_length, 29);
    }

    #[test]
    fn max_line_length_is_the_widest_line() {
        let options = LayoutOptions {
            target_line_length: 20,
            arrow_width: 2,
        };
        let entries: Vec<DisplayEntry> = (0..17)
            .map(|i| entry(&format!("k{i}"), &"n".repeat(i % 7 + 1), EntryKind::Command))
            .collect();
        let layout = render_entries(&entries, &options);

        let widest = layout
            .tokens
            .iter()
            .map(|token| token.column + token.width)
            .max()
            .unwrap_or(0);
        assert_eq!(layout.max_line_length, widest);
        assert!(layout.n_lines >= 1);
    }

    #[test]
    fn wide_arrow_shifts_names() {
        let options = LayoutOptions {
            target_line_length: 100,
            arrow_width: 2,
        };
        let layout = render_entries(&[entry("a", "Apply", EntryKind::Command)], &options);
        let name = layout
            .tokens
            .iter()
            .find(|token| token.category == TokenCategory::Command)
            .expect("name token");
        assert_eq!(name.column, 5);
        assert_eq!(layout.max_line_length, 10);
    }

    #[test]
    fn empty_menu_renders_placeholder() {
        let tree = normalize(&crate::keymap::RawBindings::new("root"));
        let layout = render(&tree, None, &LayoutOptions::default());
        assert_eq!(layout.n_lines, 1);
        assert!(layout.text(TokenCategory::Command).contains("No item found"));
    }

    #[test]
    fn file_menu_end_to_end() {
        let tree = normalize(&default_bindings());
        let Some(Resolved::Menu(file)) = tree.resolve(&ChordPath::from("SPC f"), None) else {
            panic!("expected +File menu");
        };
        let layout = render(file, None, &LayoutOptions::default());

        assert!(layout.text(TokenCategory::Key).lines().any(|line| line == "f"));
        assert!(layout.text(TokenCategory::Command).contains("Open file/folder"));

        let name_columns: Vec<usize> = layout
            .tokens
            .iter()
            .filter(|token| token.category == TokenCategory::Command)
            .map(|token| token.column)
            .collect();
        assert_eq!(name_columns.len(), file.len());
        assert!(name_columns.iter().all(|&column| column == name_columns[0]));
    }
}
