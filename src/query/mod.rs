//! Filter expression nodes handed to the query builder.
//!
//! Properties produce these through `Property::comparison` and
//! `Property::in_`; the query layer consumes them as-is.

use crate::core::{ModelError, Result, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "!=")]
    Ne,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Ne => "!=",
        }
    }
}

impl FromStr for Operator {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "=" | "==" => Ok(Self::Eq),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            "!=" => Ok(Self::Ne),
            other => Err(ModelError::InvalidArgument(format!(
                "Unsupported filter operator: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `(name, op, value)` condition.
///
/// Build these through [`Node::filter`], which expands `!=` into a
/// disjunction; a `FilterNode` carrying `Operator::Ne` is never produced
/// by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterNode {
    pub name: Vec<u8>,
    pub op: Operator,
    pub value: Value,
}

impl FilterNode {
    pub fn new(name: impl Into<Vec<u8>>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            op,
            value: value.into(),
        }
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FilterNode(b'{}', '{}', {})",
            self.name.escape_ascii(),
            self.op,
            self.value.repr()
        )
    }
}

/// Logical OR over an ordered list of conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisjunctionNode {
    pub nodes: Vec<FilterNode>,
}

impl DisjunctionNode {
    pub fn new(nodes: Vec<FilterNode>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Display for DisjunctionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.nodes.iter().map(ToString::to_string).collect();
        write!(f, "OR({})", parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Filter(FilterNode),
    Disjunction(DisjunctionNode),
    /// Matches nothing; the result of a membership test over no values.
    False,
}

impl Node {
    /// Build a condition node; `!=` becomes `(< OR >)` since the query
    /// layer has no native not-equal.
    pub fn filter(name: impl Into<Vec<u8>>, op: Operator, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();

        match op {
            Operator::Ne => Self::Disjunction(DisjunctionNode::new(vec![
                FilterNode::new(name.clone(), Operator::Lt, value.clone()),
                FilterNode::new(name, Operator::Gt, value),
            ])),
            op => Self::Filter(FilterNode::new(name, op, value)),
        }
    }

    /// Combine conditions with OR, collapsing the trivial cases.
    pub fn disjunction(mut nodes: Vec<FilterNode>) -> Self {
        match nodes.len() {
            0 => Self::False,
            1 => Self::Filter(nodes.remove(0)),
            _ => Self::Disjunction(DisjunctionNode::new(nodes)),
        }
    }

    pub fn as_filter(&self) -> Option<&FilterNode> {
        match self {
            Self::Filter(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_disjunction(&self) -> Option<&DisjunctionNode> {
        match self {
            Self::Disjunction(node) => Some(node),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(node) => write!(f, "{}", node),
            Self::Disjunction(node) => write!(f, "{}", node),
            Self::False => write!(f, "FalseNode()"),
        }
    }
}
