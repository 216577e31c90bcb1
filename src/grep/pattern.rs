use regex::Regex;
use regex_automata::{meta, Anchored, Input};
use regex_syntax::ast::{self, Ast, GroupKind};
use std::fmt::Write;
use std::ops::Range;
use std::path::Path;

use super::line_counter::LineCounter;
use super::matches::{MatchCollection, MatchRecord, FILE_FIELD, LINE_NUMBER_FIELD, PATH_FIELD};
use crate::errors::TaskError;

/// A compiled extraction pattern.
///
/// The regex engine only remembers the last capture of a group inside a
/// repetition. To report every capture, each outermost repetition that
/// contains named groups is wrapped in a synthetic slot group, and after a
/// match the slot's text is replayed one iteration at a time with an
/// anchored regex built from the repetition body.
pub struct Pattern {
    scanner: Regex,
    fields: Vec<String>,
    scope: CaptureScope,
}

/// Where the named groups of one (sub)pattern can be read from.
struct CaptureScope {
    direct: Vec<String>,
    repeats: Vec<RepeatSlot>,
}

struct RepeatSlot {
    slot: String,
    names: Vec<String>,
    /// One iteration followed by a `tail` group holding the remaining
    /// iterations up to the end of the haystack.
    body: meta::Regex,
    tail: String,
    scope: CaptureScope,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, TaskError> {
        let ast = ast::parse::Parser::new()
            .parse(pattern)
            .map_err(|e| TaskError::Pattern(e.to_string()))?;

        let mut fields = Vec::new();
        named_groups(&ast, &mut fields);

        let mut builder = ScopeBuilder {
            pattern,
            slot_prefix: slot_prefix(&fields),
            next_slot: 0,
        };
        let (rewritten, scope) = builder.build(&ast, 0..pattern.len(), "")?;
        let scanner = Regex::new(&rewritten).map_err(|e| TaskError::Pattern(e.to_string()))?;

        tracing::debug!(pattern, fields = ?fields, "compiled pattern");
        Ok(Self {
            scanner,
            fields,
            scope,
        })
    }

    /// Named groups reported for every match, in pattern order.
    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// Every non-overlapping match in `source`, left to right.
    pub fn extract(&self, file_name: &Path, source: &str) -> MatchCollection {
        let dir = file_name
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let file = file_name
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut counter = LineCounter::new(source);
        let mut result = MatchCollection::default();

        for caps in self.scanner.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };

            let mut fields = Vec::with_capacity(3 + self.fields.len());
            set_field(&mut fields, PATH_FIELD, dir.clone());
            set_field(&mut fields, FILE_FIELD, file.clone());
            set_field(
                &mut fields,
                LINE_NUMBER_FIELD,
                counter.count_to(whole.start()).to_string(),
            );

            for (name, value) in self.named_values(&caps, source) {
                set_field(&mut fields, &name, value);
            }

            result.push(MatchRecord::from_fields(fields));
        }

        result
    }

    /// Named-group values of the first match in `input`.
    pub fn first_match(&self, input: &str) -> Option<Vec<(String, String)>> {
        let caps = self.scanner.captures(input)?;
        Some(self.named_values(&caps, input))
    }

    fn named_values(&self, caps: &regex::Captures<'_>, haystack: &str) -> Vec<(String, String)> {
        let spans = |name: &str| caps.name(name).map(|m| m.range());
        self.fields
            .iter()
            .map(|name| {
                let mut value = String::new();
                self.scope.collect(name, haystack, &spans, &mut value);
                (name.clone(), value)
            })
            .collect()
    }
}

// A group named like a built-in field replaces it.
fn set_field(fields: &mut Vec<(String, String)>, name: &str, value: String) {
    match fields.iter_mut().find(|(k, _)| k == name) {
        Some(entry) => entry.1 = value,
        None => fields.push((name.to_string(), value)),
    }
}

impl CaptureScope {
    /// Appends every capture of `name` visible through `spans`.
    fn collect(
        &self,
        name: &str,
        haystack: &str,
        spans: &dyn Fn(&str) -> Option<Range<usize>>,
        out: &mut String,
    ) {
        if self.direct.iter().any(|n| n == name) {
            if let Some(range) = spans(name) {
                out.push_str(&haystack[range]);
            }
            return;
        }
        if let Some(repeat) = self
            .repeats
            .iter()
            .find(|r| r.names.iter().any(|n| n == name))
        {
            if let Some(range) = spans(&repeat.slot) {
                repeat.replay(name, haystack, range, out);
            }
        }
    }
}

impl RepeatSlot {
    fn replay(&self, name: &str, haystack: &str, range: Range<usize>, out: &mut String) {
        let mut caps = self.body.create_captures();
        let mut pos = range.start;
        // the tail must reach the end of the slot, so split choices tile it
        let bounded = &haystack[..range.end];

        while pos < range.end {
            let input = Input::new(bounded)
                .span(pos..range.end)
                .anchored(Anchored::Yes);
            self.body.search_captures(&input, &mut caps);
            let Some(rest) = caps.get_group_by_name(&self.tail) else {
                break;
            };

            let iteration = |group: &str| caps.get_group_by_name(group).map(|s| s.range());
            self.scope.collect(name, haystack, &iteration, out);

            if rest.start == pos {
                break;
            }
            pos = rest.start;
        }
    }
}

struct ScopeBuilder<'p> {
    pattern: &'p str,
    slot_prefix: String,
    next_slot: usize,
}

/// A repetition that needs a slot, with the inline flags active at it.
struct Pending<'a> {
    repetition: &'a ast::Repetition,
    flags: String,
}

impl ScopeBuilder<'_> {
    /// Rewrites `root` with slot groups around its outermost repetitions
    /// that contain named groups, and describes where each name lives.
    fn build(
        &mut self,
        root: &Ast,
        root_range: Range<usize>,
        flags: &str,
    ) -> Result<(String, CaptureScope), TaskError> {
        let mut direct = Vec::new();
        let mut pending = Vec::new();
        let mut active = flags.to_string();
        self.scan(root, &mut active, &mut direct, &mut pending);

        let mut text = String::with_capacity(root_range.len() + pending.len() * 16);
        let mut cursor = root_range.start;
        let mut repeats = Vec::with_capacity(pending.len());

        for Pending { repetition, flags } in pending {
            let range = span_range(&repetition.span);
            let slot = format!("{}{}", self.slot_prefix, self.next_slot);
            self.next_slot += 1;

            text.push_str(&self.pattern[cursor..range.start]);
            let _ = write!(text, "(?P<{slot}>{})", &self.pattern[range.clone()]);
            cursor = range.end;

            let body_range = span_range(repetition.ast.span());
            let plain = without_names(self.pattern, &repetition.ast, body_range.clone());
            let (body_text, scope) = self.build(&repetition.ast, body_range, &flags)?;
            let tail = format!("{}tail", self.slot_prefix);
            let body = meta::Regex::new(&format!(
                r"{flags}(?:{body_text})(?P<{tail}>(?:{plain})*)\z"
            ))
            .map_err(|e| TaskError::Pattern(e.to_string()))?;

            let mut names = Vec::new();
            named_groups(&repetition.ast, &mut names);

            repeats.push(RepeatSlot {
                slot,
                names,
                body,
                tail,
                scope,
            });
        }
        text.push_str(&self.pattern[cursor..root_range.end]);

        Ok((text, CaptureScope { direct, repeats }))
    }

    fn scan<'a>(
        &self,
        node: &'a Ast,
        flags: &mut String,
        direct: &mut Vec<String>,
        pending: &mut Vec<Pending<'a>>,
    ) {
        match node {
            Ast::Flags(set) => flags.push_str(&self.pattern[span_range(&set.span)]),
            Ast::Repetition(rep) => {
                if contains_named(&rep.ast) {
                    pending.push(Pending {
                        repetition: rep,
                        flags: flags.clone(),
                    });
                }
            }
            Ast::Group(group) => {
                let mut inner = flags.clone();
                match &group.kind {
                    GroupKind::CaptureName { name, .. } => direct.push(name.name.clone()),
                    GroupKind::NonCapturing(set) if !set.items.is_empty() => {
                        let _ = write!(inner, "(?{})", &self.pattern[span_range(&set.span)]);
                    }
                    _ => {}
                }
                self.scan(&group.ast, &mut inner, direct, pending);
            }
            Ast::Concat(concat) => {
                for item in &concat.asts {
                    self.scan(item, flags, direct, pending);
                }
            }
            Ast::Alternation(alt) => {
                for branch in &alt.asts {
                    let mut branch_flags = flags.clone();
                    self.scan(branch, &mut branch_flags, direct, pending);
                }
            }
            _ => {}
        }
    }
}

fn span_range(span: &ast::Span) -> Range<usize> {
    span.start.offset..span.end.offset
}

fn named_groups(node: &Ast, out: &mut Vec<String>) {
    match node {
        Ast::Group(group) => {
            if let GroupKind::CaptureName { name, .. } = &group.kind {
                out.push(name.name.clone());
            }
            named_groups(&group.ast, out);
        }
        Ast::Repetition(rep) => named_groups(&rep.ast, out),
        Ast::Concat(concat) => concat.asts.iter().for_each(|a| named_groups(a, out)),
        Ast::Alternation(alt) => alt.asts.iter().for_each(|a| named_groups(a, out)),
        _ => {}
    }
}

/// `pattern[range]` with every named group turned non-capturing.
fn without_names(pattern: &str, node: &Ast, range: Range<usize>) -> String {
    let mut openers = Vec::new();
    name_openers(node, &mut openers);
    openers.sort_by_key(|r| r.start);

    let mut text = String::with_capacity(range.len());
    let mut cursor = range.start;
    for opener in openers {
        text.push_str(&pattern[cursor..opener.start]);
        text.push_str("(?:");
        cursor = opener.end;
    }
    text.push_str(&pattern[cursor..range.end]);
    text
}

// `(?P<name>` of each named group
fn name_openers(node: &Ast, out: &mut Vec<Range<usize>>) {
    match node {
        Ast::Group(group) => {
            if let GroupKind::CaptureName { name, .. } = &group.kind {
                out.push(group.span.start.offset..name.span.end.offset + 1);
            }
            name_openers(&group.ast, out);
        }
        Ast::Repetition(rep) => name_openers(&rep.ast, out),
        Ast::Concat(concat) => concat.asts.iter().for_each(|a| name_openers(a, out)),
        Ast::Alternation(alt) => alt.asts.iter().for_each(|a| name_openers(a, out)),
        _ => {}
    }
}

fn contains_named(node: &Ast) -> bool {
    let mut names = Vec::new();
    named_groups(node, &mut names);
    !names.is_empty()
}

/// A slot name prefix no user group can collide with.
fn slot_prefix(fields: &[String]) -> String {
    let mut prefix = String::from("__rep");
    while fields.iter().any(|f| f.starts_with(&prefix)) {
        prefix.push('_');
    }
    prefix
}
