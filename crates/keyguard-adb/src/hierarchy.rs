//! Minimal reader for `uiautomator dump` output.
//!
//! Only `<node>` tags and the attributes the unlock flow needs are read.

use keyguard_core::types::{Position, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn location(&self) -> Position {
        Position::new(self.left, self.top)
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.right - self.left,
            height: self.bottom - self.top,
        }
    }

    pub fn center(&self) -> Position {
        Position::new((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiNode {
    pub resource_id: String,
    pub text: String,
    pub bounds: Bounds,
}

/// Every `<node>` in document order.
pub fn parse_nodes(xml: &str) -> Vec<UiNode> {
    let mut nodes = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find("<node ") {
        let tag_and_after = &rest[start..];
        let end = tag_and_after.find('>').unwrap_or(tag_and_after.len());
        let tag = &tag_and_after[..end];
        nodes.push(UiNode {
            resource_id: attribute(tag, "resource-id").unwrap_or_default(),
            text: attribute(tag, "text").unwrap_or_default(),
            bounds: attribute(tag, "bounds")
                .and_then(|b| parse_bounds(&b))
                .unwrap_or_default(),
        });
        rest = &tag_and_after[end..];
    }
    nodes
}

/// Parse `[left,top][right,bottom]`.
pub fn parse_bounds(s: &str) -> Option<Bounds> {
    let nums: Vec<i32> = s
        .split(|c| c == '[' || c == ']' || c == ',')
        .filter(|p| !p.is_empty())
        .map(|p| p.trim().parse().ok())
        .collect::<Option<Vec<_>>>()?;
    match nums.as_slice() {
        [left, top, right, bottom] => Some(Bounds {
            left: *left,
            top: *top,
            right: *right,
            bottom: *bottom,
        }),
        _ => None,
    }
}

fn attribute(tag: &str, name: &str) -> Option<String> {
    let needle = format!(" {name}=\"");
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(unescape(&tag[start..start + len]))
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
