//! Rebuilds the report path of a finding as a `<CodeItem>` element so
//! viewers can navigate from a diagnostic back into the original report.
//!
//! Report wrappers alternate between collection elements (`Targets`,
//! `Modules`, `Namespaces`, `Types`, ...) and named items (`Target`,
//! `Module`, ...). The chain keeps that shape: plain element, element with
//! the ancestor's `Name`, plain element, and so on.

use crate::xml::XmlElement;

pub const CODE_ITEM_ELEMENT: &str = "CodeItem";

const SKIPPED: [&str; 2] = ["FxCopReport", "Messages"];

/// One ancestor of a finding: element name and its `Name` attribute
/// (empty when absent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AncestorRef<'a> {
    pub name: &'a str,
    pub item_name: &'a str,
}

impl<'a> AncestorRef<'a> {
    pub fn of(element: &'a XmlElement) -> Self {
        Self {
            name: element.local_name(),
            item_name: element.attr("Name"),
        }
    }
}

/// `<CodeItem>` wrapping the ancestor chain, outermost ancestor first.
pub fn build(ancestors: &[AncestorRef<'_>]) -> XmlElement {
    let kept: Vec<_> = ancestors
        .iter()
        .filter(|a| !SKIPPED.contains(&a.name))
        .collect();
    let mut item = XmlElement::new(CODE_ITEM_ELEMENT);
    if let Some(chain) = chain(&kept, false) {
        item.push(chain);
    }
    item
}

fn chain(rest: &[&AncestorRef<'_>], named: bool) -> Option<XmlElement> {
    let (first, tail) = rest.split_first()?;
    let mut element = XmlElement::new(first.name);
    if named {
        element = element.with_attribute("Name", first.item_name);
    }
    if let Some(child) = chain(tail, !named) {
        element.push(child);
    }
    Some(element)
}
