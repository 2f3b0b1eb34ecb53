//! BibTeX tokenizer
//!
//! Hand-rolled recovery loop around nom combinators: each `@` block is parsed
//! on its own, and a malformed block is reported and skipped instead of
//! aborting the rest of the file. Handles braced and quoted values, nested
//! braces, `#` concatenation, `@string` macros, and `@comment`/`@preamble`
//! blocks (both discarded).

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::map,
    IResult,
};
use std::collections::HashMap;

use folio_domain::EntryType;

use crate::entry::BibtexEntry;

/// A recovered per-block parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    pub line: u32,
    pub message: String,
}

/// Outcome of tokenizing a BibTeX file.
///
/// `entries` holds every block that parsed; `issues` describes the blocks
/// that did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    pub entries: Vec<BibtexEntry>,
    pub issues: Vec<ParseIssue>,
}

/// One parsed `@` block.
enum Block {
    Entry(BibtexEntry),
    StringDef(String, String),
    Discarded,
}

/// Tokenize a BibTeX file, recovering per block.
pub fn parse(input: &str) -> ParseResult {
    let mut result = ParseResult::default();
    let mut strings: HashMap<String, String> = HashMap::new();
    let mut rest = input;

    loop {
        rest = skip_to_block(rest);
        if rest.is_empty() {
            break;
        }

        match parse_block(rest, &strings) {
            Ok((tail, block)) => {
                match block {
                    Block::Entry(entry) => result.entries.push(entry),
                    Block::StringDef(key, value) => {
                        strings.insert(key, value);
                    }
                    Block::Discarded => {}
                }
                rest = tail;
            }
            Err(_) => {
                let line = line_of(input, rest);
                result.issues.push(ParseIssue {
                    line,
                    message: "malformed BibTeX block".to_string(),
                });
                tracing::warn!(line, "skipping malformed BibTeX block");
                // Resynchronize at the next '@'.
                rest = match rest[1..].find('@') {
                    Some(pos) => &rest[pos + 1..],
                    None => "",
                };
            }
        }
    }

    result
}

/// 1-based line number of `rest` within `input`.
fn line_of(input: &str, rest: &str) -> u32 {
    let consumed = &input[..input.len() - rest.len()];
    consumed.bytes().filter(|&b| b == b'\n').count() as u32 + 1
}

/// Skip whitespace, `%` line comments, and stray text up to the next `@`.
fn skip_to_block(input: &str) -> &str {
    let trimmed = skip_trivia(input);
    match trimmed.find('@') {
        Some(pos) => &trimmed[pos..],
        None => "",
    }
}

/// Skip whitespace and `%` line comments.
fn skip_trivia(input: &str) -> &str {
    let mut rest = input;
    loop {
        let trimmed = rest.trim_start();
        if let Some(comment) = trimmed.strip_prefix('%') {
            rest = match comment.find('\n') {
                Some(pos) => &comment[pos + 1..],
                None => "",
            };
        } else if trimmed.len() != rest.len() {
            rest = trimmed;
        } else {
            return rest;
        }
    }
}

/// Parse one `@` block: an entry, a `@string` definition, or a discarded
/// `@comment`/`@preamble`.
fn parse_block<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, Block> {
    let (rest, _) = char('@')(input)?;
    let rest = skip_trivia(rest);
    let (rest, keyword) = identifier(rest)?;

    match keyword.to_lowercase().as_str() {
        "string" => {
            let (rest, (key, value)) = parse_string_def(rest, strings)?;
            Ok((rest, Block::StringDef(key, value)))
        }
        "preamble" => {
            let rest = skip_trivia(rest);
            let (rest, _) = delimited_body(rest, strings)?;
            Ok((rest, Block::Discarded))
        }
        "comment" => {
            let rest = skip_trivia(rest);
            if rest.starts_with('{') {
                let (rest, _) = balanced_braces(rest)?;
                Ok((rest, Block::Discarded))
            } else {
                // Bare @comment: discard to end of line.
                let pos = rest.find('\n').unwrap_or(rest.len());
                Ok((&rest[pos..], Block::Discarded))
            }
        }
        type_token => {
            let (rest, entry) = parse_entry(rest, type_token, strings)?;
            Ok((rest, Block::Entry(entry)))
        }
    }
}

/// Parse `{ key = value }` after `@string`.
fn parse_string_def<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let rest = skip_trivia(input);
    let (rest, _) = char('{')(rest)?;
    let rest = skip_trivia(rest);
    let (rest, key) = identifier(rest)?;
    let rest = skip_trivia(rest);
    let (rest, _) = char('=')(rest)?;
    let (rest, value) = field_value(skip_trivia(rest), strings)?;
    let rest = skip_trivia(rest);
    let (rest, _) = char('}')(rest)?;
    Ok((rest, (key.to_string(), value)))
}

/// Parse `{ value }` for @preamble.
fn delimited_body<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let (rest, _) = char('{')(input)?;
    let (rest, value) = field_value(skip_trivia(rest), strings)?;
    let rest = skip_trivia(rest);
    let (rest, _) = char('}')(rest)?;
    Ok((rest, value))
}

/// Parse `{ cite_key, field = value, ... }` after the entry type token.
fn parse_entry<'a>(
    input: &'a str,
    type_token: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, BibtexEntry> {
    let rest = skip_trivia(input);
    let (rest, _) = char('{')(rest)?;
    let rest = skip_trivia(rest);
    let (rest, cite_key) = take_while1(|c: char| c.is_ascii_alphanumeric() || "_-:./+".contains(c))(rest)?;
    let rest = skip_trivia(rest);
    let (rest, _) = char(',')(rest)?;

    let mut entry = BibtexEntry::new(cite_key, EntryType::from_str(type_token));

    let mut rest = rest;
    loop {
        rest = skip_trivia(rest);
        if let Some(tail) = rest.strip_prefix('}') {
            return Ok((tail, entry));
        }
        let (tail, key) = identifier(rest)?;
        let tail = skip_trivia(tail);
        let (tail, _) = char('=')(tail)?;
        let (tail, value) = field_value(skip_trivia(tail), strings)?;
        entry.push_field(key, value);

        let tail = skip_trivia(tail);
        // Trailing comma before '}' is optional.
        rest = tail.strip_prefix(',').unwrap_or(tail);
    }
}

/// Field keys, @string names and entry type tokens.
fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(input)
}

/// A field value: braced, quoted, bare number, or @string reference, possibly
/// chained with `#`.
fn field_value<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, String> {
    let mut value = String::new();
    let mut rest = input;

    loop {
        let (tail, piece) = alt((
            braced_value,
            quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), str::to_string),
            map(identifier, |name| {
                strings.get(name).cloned().unwrap_or_else(|| name.to_string())
            }),
        ))(rest)?;
        value.push_str(&piece);

        let tail = skip_trivia(tail);
        match tail.strip_prefix('#') {
            Some(after) => rest = skip_trivia(after),
            None => return Ok((tail, value)),
        }
    }
}

/// `{...}` value; outer braces stripped, nested braces kept.
fn braced_value(input: &str) -> IResult<&str, String> {
    let (rest, raw) = balanced_braces(input)?;
    Ok((rest, raw[1..raw.len() - 1].to_string()))
}

/// Scan a balanced `{...}` region, honoring backslash escapes.
fn balanced_braces(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom_error(input));
    }
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }
    Err(nom_error(input))
}

/// `"..."` value; inner braces protect quotes, backslash escapes kept.
fn quoted_value(input: &str) -> IResult<&str, String> {
    let mut chars = input.char_indices();
    if !matches!(chars.next(), Some((_, '"'))) {
        return Err(nom_error(input));
    }
    let mut value = String::new();
    let mut depth = 0usize;
    let mut escaped = false;
    for (idx, ch) in chars {
        if escaped {
            value.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '"' if depth == 0 => return Ok((&input[idx + 1..], value)),
            '{' => {
                depth += 1;
                value.push('{');
            }
            '}' => {
                depth = depth.saturating_sub(1);
                value.push('}');
            }
            '\\' => {
                value.push('\\');
                escaped = true;
            }
            c => value.push(c),
        }
    }
    Err(nom_error(input))
}

fn nom_error(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char))
}
