//! Human-readable grammar summaries.
//!
//! [`smart_usage`] walks a [`CommandTree`] and describes every usable child
//! of a node in one line each. Children reachable only after a bound command
//! are shown as optional, others as required:
//!
//! ```text
//! set <key> <value>
//! list [-v|all]
//! rm -> del
//! ```

use serde::{Deserialize, Serialize};

use crate::context::CommandContext;
use crate::cursor::SEPARATOR;
use crate::node::{CommandTree, NodeId};

/// Bracket and separator vocabulary used by the usage generator.
///
/// Every field has a default, so partial configurations deserialize:
///
/// ```
/// use command_dispatch_core::UsageStyle;
///
/// let style: UsageStyle = serde_json::from_str(r#"{"or": " | "}"#).unwrap();
/// assert_eq!(style.or, " | ");
/// assert_eq!(style.optional_open, "[");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageStyle {
    /// Opens a group that may be omitted (`[`).
    pub optional_open: String,
    /// Closes an optional group (`]`).
    pub optional_close: String,
    /// Opens a group where one alternative must be given (`(`).
    pub required_open: String,
    /// Closes a required group (`)`).
    pub required_close: String,
    /// Precedes an argument name (`<`).
    pub argument_open: String,
    /// Follows an argument name (`>`).
    pub argument_close: String,
    /// Separates alternatives (`|`).
    pub or: String,
    /// Points from an alias to its target (`->`).
    pub redirect: String,
}

impl Default for UsageStyle {
    fn default() -> Self {
        Self {
            optional_open: "[".to_string(),
            optional_close: "]".to_string(),
            required_open: "(".to_string(),
            required_close: ")".to_string(),
            argument_open: "<".to_string(),
            argument_close: ">".to_string(),
            or: "|".to_string(),
            redirect: "->".to_string(),
        }
    }
}

impl UsageStyle {
    fn optional(&self, text: &str) -> String {
        format!("{}{text}{}", self.optional_open, self.optional_close)
    }

    fn group(&self, optional: bool) -> (&str, &str) {
        if optional {
            (&self.optional_open, &self.optional_close)
        } else {
            (&self.required_open, &self.required_close)
        }
    }
}

/// Describes each usable direct child of `node`, in insertion order.
///
/// The tree is only read; unusable children are left out.
pub fn smart_usage(
    tree: &CommandTree,
    style: &UsageStyle,
    node: NodeId,
    context: &CommandContext,
) -> Vec<(NodeId, String)> {
    let generator = Generator {
        tree,
        style,
        context,
    };
    let optional = tree.node(node).command().is_some();
    tree.children(node)
        .iter()
        .filter_map(|child| {
            generator
                .describe(*child, optional, false)
                .map(|usage| (*child, usage))
        })
        .collect()
}

struct Generator<'a> {
    tree: &'a CommandTree,
    style: &'a UsageStyle,
    context: &'a CommandContext,
}

impl Generator<'_> {
    fn describe(&self, id: NodeId, optional: bool, deep: bool) -> Option<String> {
        let node = self.tree.node(id);
        if !node.can_use(self.context) {
            return None;
        }

        let own = node.usage_with(self.style);
        let this = if optional { self.style.optional(&own) } else { own };
        if deep {
            return Some(this);
        }

        if let Some(target) = node.redirect() {
            let target = self.tree.node(target).usage_with(self.style);
            return Some(format!(
                "{this}{SEPARATOR}{}{SEPARATOR}{target}",
                self.style.redirect
            ));
        }

        // Flags carry no command, so whatever follows them is optional.
        let children_optional = node.executable().is_none_or(|e| e.command().is_some());
        let children: Vec<NodeId> = node
            .children()
            .iter()
            .copied()
            .filter(|child| self.tree.can_use(*child, self.context))
            .collect();

        match children.as_slice() {
            [] => Some(this),
            [only] => {
                let rest = self
                    .describe(*only, children_optional, children_optional)
                    .unwrap_or_default();
                Some(join(this, &rest))
            }
            many => {
                let mut fragments: Vec<String> = Vec::with_capacity(many.len());
                for child in many {
                    let Some(fragment) = self.describe(*child, children_optional, true) else {
                        continue;
                    };
                    if !fragments.contains(&fragment) {
                        fragments.push(fragment);
                    }
                }
                if fragments.len() == 1 {
                    return Some(join(this, &fragments[0]));
                }

                let (open, close) = self.style.group(children_optional);
                let alternatives: Vec<String> = many
                    .iter()
                    .map(|child| self.tree.node(*child).usage_with(self.style))
                    .collect();
                Some(format!(
                    "{this}{SEPARATOR}{open}{}{close}",
                    alternatives.join(self.style.or.as_str())
                ))
            }
        }
    }
}

fn join(head: String, tail: &str) -> String {
    if tail.is_empty() {
        head
    } else {
        format!("{head}{SEPARATOR}{tail}")
    }
}
