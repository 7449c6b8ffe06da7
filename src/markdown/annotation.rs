use crate::{
    grid::{GridConfig, GridError, GridPosition},
    markdown::elements::{AnimationSpec, Style},
};
use std::{
    collections::{HashMap, HashSet},
    ops::Range,
};

/// Alias names mapped to grid-reference (or further alias) strings.
pub type AliasTable = HashMap<String, String>;

/// The result of stripping grid/style annotations off a piece of text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extraction {
    pub position: Option<GridPosition>,
    pub style: Option<Style>,
    pub clean_text: String,
}

/// Extract a grid reference and a style annotation from free text.
///
/// At most one of each is recognized; both are stripped from the returned
/// text. Text with no recognizable annotation comes back untouched: malformed
/// annotation syntax is ordinary text, never an error. A grid reference that
/// does resolve is validated against `grid` right here, so an out-of-bounds
/// inline position fails before it ever reaches the placement engine.
pub fn extract_grid_and_style(
    text: &str,
    aliases: &AliasTable,
    grid: &GridConfig,
) -> Result<Extraction, GridError> {
    let (position, text) = extract_grid_position(text, aliases, grid)?;
    let (style, clean_text) = extract_style(&text);
    Ok(Extraction { position, style, clean_text })
}

/// Extract the first grid reference token and return it along with the text
/// with the token removed.
pub fn extract_grid_position(
    text: &str,
    aliases: &AliasTable,
    grid: &GridConfig,
) -> Result<(Option<GridPosition>, String), GridError> {
    match find_grid_token(text, aliases, grid)? {
        Some((range, position)) => {
            position.validate(grid)?;
            Ok((Some(position), strip_range(text, range)))
        }
        None => Ok((None, text.to_string())),
    }
}

/// Extract the first `{...}` style token and return it along with the text
/// with the token removed.
pub fn extract_style(text: &str) -> (Option<Style>, String) {
    match find_style_token(text) {
        Some((range, style)) => (Some(style), strip_range(text, range)),
        None => (None, text.to_string()),
    }
}

/// Recognize a block-header line: a line whose trimmed text begins with a
/// grid reference or alias token.
///
/// Returns the validated region plus any style annotation on the rest of the
/// line. Lines that merely contain a token further in are not headers.
pub(crate) fn parse_block_header(
    line: &str,
    aliases: &AliasTable,
    grid: &GridConfig,
) -> Result<Option<(GridPosition, Option<Style>)>, GridError> {
    let trimmed = line.trim();
    if !trimmed.starts_with('[') {
        return Ok(None);
    }
    let Some((range, position)) = find_grid_token(trimmed, aliases, grid)? else {
        return Ok(None);
    };
    if range.start != 0 {
        return Ok(None);
    }
    position.validate(grid)?;
    let (style, _) = extract_style(&trimmed[range.end..]);
    Ok(Some((position, style)))
}

fn strip_range(text: &str, range: Range<usize>) -> String {
    let mut clean = String::with_capacity(text.len());
    clean.push_str(&text[..range.start]);
    clean.push_str(&text[range.end..]);
    clean.trim().to_string()
}

/// Scan for the first bracket token that parses as a grid reference or
/// resolves through the alias table. Bracketed text that is neither stays in
/// place and scanning continues past it.
fn find_grid_token(
    text: &str,
    aliases: &AliasTable,
    grid: &GridConfig,
) -> Result<Option<(Range<usize>, GridPosition)>, GridError> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('[') {
        let open = search_from + offset;
        let Some(length) = text[open + 1..].find(']') else { break };
        let close = open + 1 + length;
        let interior = &text[open + 1..close];
        if let Some(position) = parse_coordinates(interior, grid) {
            return Ok(Some((open..close + 1, position)));
        }
        if let Some(name) = alias_name(interior) {
            if let Some(position) = resolve_alias(name, aliases, grid, &mut HashSet::new())? {
                return Ok(Some((open..close + 1, position)));
            }
        }
        search_from = open + 1;
    }
    Ok(None)
}

/// Parse `c`, `c1-c2`, `c, r` or `c1-c2, r1-r2` bracket interiors.
/// Whitespace is tolerated around the comma. The column-only forms span the
/// grid's full height.
fn parse_coordinates(interior: &str, grid: &GridConfig) -> Option<GridPosition> {
    let interior = interior.trim();
    match interior.split_once(',') {
        Some((cols, rows)) => {
            let (col_start, col_end) = parse_span(cols.trim())?;
            let (row_start, row_end) = parse_span(rows.trim())?;
            Some(GridPosition::new(col_start, col_end, row_start, row_end))
        }
        None => {
            let (col_start, col_end) = parse_span(interior)?;
            Some(GridPosition::new(col_start, col_end, 1, grid.rows))
        }
    }
}

fn parse_span(text: &str) -> Option<(u16, u16)> {
    match text.split_once('-') {
        Some((start, end)) => Some((parse_number(start)?, parse_number(end)?)),
        None => {
            let value = parse_number(text)?;
            Some((value, value))
        }
    }
}

fn parse_number(text: &str) -> Option<u16> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn alias_name(interior: &str) -> Option<&str> {
    let interior = interior.trim();
    let mut chars = interior.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() && first != '_' {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return None;
    }
    Some(interior)
}

/// Resolve an alias to a position, following chains of aliases.
///
/// Unknown names and values with no recognizable token resolve to `None`
/// (fail-soft, like any other malformed annotation); a cycle is a hard error.
fn resolve_alias(
    name: &str,
    aliases: &AliasTable,
    grid: &GridConfig,
    visited: &mut HashSet<String>,
) -> Result<Option<GridPosition>, GridError> {
    if !visited.insert(name.to_string()) {
        return Err(GridError::alias_cycle(name));
    }
    let Some(value) = aliases.get(name) else {
        return Ok(None);
    };
    let value = value.trim();
    let interior = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')).unwrap_or(value);
    if let Some(position) = parse_coordinates(interior, grid) {
        return Ok(Some(position));
    }
    match alias_name(interior) {
        Some(next) => resolve_alias(next, aliases, grid, visited),
        None => Ok(None),
    }
}

fn find_style_token(text: &str) -> Option<(Range<usize>, Style)> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('{') {
        let open = search_from + offset;
        let length = text[open + 1..].find('}')?;
        let close = open + 1 + length;
        let interior = &text[open + 1..close];
        if !interior.is_empty() {
            return Some((open..close + 1, parse_style(interior)));
        }
        search_from = close + 1;
    }
    None
}

fn parse_style(interior: &str) -> Style {
    let mut style = Style::default();
    let mut animation = AnimationSpec::default();
    for directive in interior.split_whitespace() {
        if let Some(class) = directive.strip_prefix('.') {
            if !class.is_empty() {
                style.classes.push(class.to_string());
            }
            continue;
        }
        // `=` wins over `:` when a directive carries both.
        let (key, value) = if let Some(pair) = directive.split_once('=') {
            pair
        } else if let Some(pair) = directive.split_once(':') {
            pair
        } else {
            continue;
        };
        let value: String = value.chars().filter(|c| *c != '"' && *c != '\'').collect();
        apply_directive(&mut style, &mut animation, key, value);
    }
    if !animation.is_empty() {
        style.animation = Some(animation);
    }
    style
}

fn apply_directive(style: &mut Style, animation: &mut AnimationSpec, key: &str, value: String) {
    match key {
        "animation" | "animation-type" => animation.kind = Some(value),
        "animation-duration" | "duration" => match parse_seconds(&value) {
            Some(ms) => animation.duration_ms = Some(ms),
            None => drop(style.properties.insert(key.into(), value)),
        },
        "animation-delay" | "delay" => match parse_seconds(&value) {
            Some(ms) => animation.delay_ms = Some(ms),
            None => drop(style.properties.insert(key.into(), value)),
        },
        "animation-direction" | "direction" => animation.direction = Some(value),
        "animation-trigger" | "trigger" => animation.trigger = Some(value),
        "animation-repeat" | "repeat" => match value.parse() {
            Ok(count) => animation.repeat = Some(count),
            Err(_) => drop(style.properties.insert(key.into(), value)),
        },
        "animation-speed" | "speed" => animation.speed = Some(value),
        _ => {
            style.properties.insert(key.into(), value);
        }
    }
}

/// Annotation durations are seconds in the source text; the engine works in
/// integer milliseconds.
fn parse_seconds(value: &str) -> Option<u64> {
    let seconds: f64 = value.parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some((seconds * 1000.0).round() as u64)
}
