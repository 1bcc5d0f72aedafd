//! Streaming decoder for the text format.
//!
//! Trees are read one blank-line-terminated batch at a time. Every line of a
//! batch is parsed on its own, then the entries are re-linked by depth. A
//! single bad line rejects its whole batch: skipping it would shift the
//! depth linkage of every later sibling.

use super::escape::unescape_arg;
use crate::tree::call_site::is_plain_name;
use crate::tree::{CallSiteResolver, CallTree, EntryId, Frame};
use crate::utils::config::ENTRY_POINT_IDENT;
use crate::utils::error::DecodeError;
use log::{debug, warn};
use std::io::{BufRead, Lines};

/// One parsed line, not yet linked to a parent
#[derive(Debug)]
struct ParsedLine {
    line: usize,
    depth: usize,
    frame: Frame,
    args: Vec<String>,
}

/// Iterator over the trees of a text stream
///
/// **Public** - main entry point for decoding
///
/// Yields `Err` for a batch that cannot be rebuilt and then carries on with
/// the next one. The stream ends at EOF or at an empty batch. An I/O error
/// is yielded once and ends the stream.
pub struct TextDecoder<R, S> {
    lines: Lines<R>,
    resolver: S,
    line_no: usize,
    finished: bool,
}

impl<R: BufRead, S: CallSiteResolver> TextDecoder<R, S> {
    pub fn new(reader: R, resolver: S) -> Self {
        Self {
            lines: reader.lines(),
            resolver,
            line_no: 0,
            finished: false,
        }
    }

    /// Read lines up to the next blank line or EOF
    fn read_batch(&mut self) -> Result<Vec<(usize, String)>, DecodeError> {
        let mut batch = Vec::new();
        for line in self.lines.by_ref() {
            let mut line = line?;
            self.line_no += 1;
            if line.ends_with('\r') {
                line.pop();
            }
            if line.is_empty() {
                break;
            }
            batch.push((self.line_no, line));
        }
        Ok(batch)
    }

    fn decode_batch(&self, batch: &[(usize, String)]) -> Result<CallTree, DecodeError> {
        let parsed = batch
            .iter()
            .map(|(line, text)| parse_line(*line, text, &self.resolver))
            .collect::<Result<Vec<_>, _>>()?;
        link(parsed, batch[0].0)
    }
}

impl<R: BufRead, S: CallSiteResolver> Iterator for TextDecoder<R, S> {
    type Item = Result<CallTree, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let batch = match self.read_batch() {
            Ok(batch) => batch,
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            }
        };

        if batch.is_empty() {
            self.finished = true;
            return None;
        }

        let result = self.decode_batch(&batch);
        match &result {
            Ok(tree) => debug!(
                "Decoded tree of {} entries from lines {}..={}",
                tree.node_count(),
                batch[0].0,
                self.line_no
            ),
            Err(e) => warn!("Rejected tree starting on line {}: {}", batch[0].0, e),
        }
        Some(result)
    }
}

/// Decode every tree in `text`
///
/// **Public** - convenience wrapper around [`TextDecoder`]
pub fn decode_str<S: CallSiteResolver>(text: &str, resolver: S) -> Vec<Result<CallTree, DecodeError>> {
    TextDecoder::new(text.as_bytes(), resolver).collect()
}

/// Parse one line into a standalone entry
fn parse_line<S: CallSiteResolver>(line: usize, text: &str, resolver: &S) -> Result<ParsedLine, DecodeError> {
    if text == ENTRY_POINT_IDENT {
        return Ok(ParsedLine {
            line,
            depth: 0,
            frame: Frame::EntryPoint,
            args: Vec::new(),
        });
    }

    let malformed = |reason: &str| DecodeError::Malformed {
        line,
        reason: reason.to_string(),
    };

    let body = text.trim_start_matches('-');
    let depth = text.len() - body.len();
    if depth == 0 {
        return Err(malformed("call line has no depth marker"));
    }

    let open = body.find('(').ok_or_else(|| malformed("missing '('"))?;
    if !body.ends_with(')') {
        return Err(malformed("unbalanced parentheses"));
    }

    let (owner_type, method_name) = body[..open]
        .rsplit_once('.')
        .ok_or_else(|| malformed("expected `owner.method` before '('"))?;
    if !is_plain_name(owner_type) || !is_plain_name(method_name) {
        return Err(malformed(
            "owner type and method name must be non-empty, without spaces or parentheses",
        ));
    }

    let (param_types, args) =
        split_args(&body[open + 1..body.len() - 1]).map_err(|reason| malformed(&reason))?;

    let site = resolver
        .resolve(owner_type, method_name, &param_types)
        .map_err(|source| DecodeError::Unresolvable { line, source })?;

    Ok(ParsedLine {
        line,
        depth,
        frame: Frame::Call(site),
        args,
    })
}

/// Split `type var0 = a, type var1 = b` into parameter types and arguments
///
/// A fragment that does not introduce the next `varN` belongs to the
/// previous argument, whose text contained `", "`. Values are unescaped
/// once every fragment is placed.
fn split_args(params: &str) -> Result<(Vec<String>, Vec<String>), String> {
    let mut types = Vec::new();
    let mut args: Vec<String> = Vec::new();
    if params.is_empty() {
        return Ok((types, args));
    }

    for fragment in params.split(", ") {
        match split_arg(fragment, types.len()) {
            Some((param_type, value)) => {
                types.push(param_type.to_string());
                args.push(value.to_string());
            }
            None => match args.last_mut() {
                Some(last) => {
                    last.push_str(", ");
                    last.push_str(fragment);
                }
                None => {
                    return Err(format!(
                        "argument `{}` is not of the form `type var0 = value`",
                        fragment
                    ))
                }
            },
        }
    }

    let args = args
        .iter()
        .map(|arg| unescape_arg(arg))
        .collect::<Result<_, _>>()?;
    Ok((types, args))
}

fn split_arg(fragment: &str, index: usize) -> Option<(&str, &str)> {
    let marker = format!(" var{} = ", index);
    let pos = fragment.find(&marker)?;
    let param_type = &fragment[..pos];
    if !is_plain_name(param_type) {
        return None;
    }
    Some((param_type, &fragment[pos + marker.len()..]))
}

/// Re-link parsed lines into a tree with a depth-indexed stack
fn link(parsed: Vec<ParsedLine>, first_line: usize) -> Result<CallTree, DecodeError> {
    let mut entries = parsed.into_iter();
    match entries.next() {
        Some(first) if first.frame.is_entry_point() => {}
        _ => return Err(DecodeError::MissingRoot(first_line)),
    }

    let mut tree = CallTree::new();
    let mut stack = vec![EntryId::ROOT];

    for entry in entries {
        while let Some(&top) = stack.last() {
            if tree[top].depth() < entry.depth {
                break;
            }
            stack.pop();
        }

        let parent = stack.last().copied().ok_or_else(|| DecodeError::Malformed {
            line: entry.line,
            reason: "second entry point inside one tree".to_string(),
        })?;

        let parent_depth = tree[parent].depth();
        if entry.depth != parent_depth + 1 {
            return Err(DecodeError::DepthGap {
                line: entry.line,
                depth: entry.depth,
                parent_depth,
            });
        }

        let id = tree.attach(parent, entry.frame, entry.args);
        stack.push(id);
    }

    Ok(tree)
}
