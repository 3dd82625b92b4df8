//! Text forms of a linkograph
//!
//! JSON: an array whose first element is the vocabulary, followed by one
//! `[labels, backlinks, forelinks, identifier]` array per node. The identifier
//! may be omitted on input and is written as `null` when absent.
//!
//! CSV: one line per node, `labels,forelink,forelink,...` with labels
//! separated by spaces. Backlinks are derived from the forelinks.
//!
//! Both parsers reject links that leave the graph or point the wrong way.
//! Links present on one side only are accepted; the checker reports those.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::linkograph::{Linkograph, Node};

#[derive(Deserialize)]
struct WireNode(
    BTreeSet<String>,
    BTreeSet<usize>,
    BTreeSet<usize>,
    #[serde(default)] Option<String>,
);

impl From<WireNode> for Node {
    fn from(wire: WireNode) -> Self {
        Node {
            labels: wire.0,
            backlinks: wire.1,
            forelinks: wire.2,
            identifier: wire.3,
        }
    }
}

impl Serialize for Linkograph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.nodes.len() + 1))?;
        seq.serialize_element(&self.vocabulary)?;
        for node in &self.nodes {
            seq.serialize_element(&(
                &node.labels,
                &node.backlinks,
                &node.forelinks,
                &node.identifier,
            ))?;
        }
        seq.end()
    }
}

struct LinkographVisitor;

impl<'de> Visitor<'de> for LinkographVisitor {
    type Value = Linkograph;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an array of a vocabulary followed by node entries")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Linkograph, A::Error> {
        let vocabulary: Vec<String> = seq
            .next_element()?
            .ok_or_else(|| de::Error::custom("missing vocabulary"))?;

        let mut nodes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(node) = seq.next_element::<WireNode>()? {
            nodes.push(node.into());
        }
        validate_links(&nodes).map_err(<A::Error as de::Error>::custom)?;

        Ok(Linkograph { vocabulary, nodes })
    }
}

impl<'de> Deserialize<'de> for Linkograph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_seq(LinkographVisitor)
    }
}

/// Every backlink must point to an earlier node and every forelink to a later
/// node that exists.
fn validate_links(nodes: &[Node]) -> Result<()> {
    let size = nodes.len();
    for (index, node) in nodes.iter().enumerate() {
        if let Some(back) = node.backlinks.range(index..).next() {
            return Err(Error::InvalidWireFormat(format!(
                "node {}: backlink {} does not point backward",
                index, back
            )));
        }
        if let Some(fore) = node.forelinks.range(..=index).next() {
            return Err(Error::InvalidWireFormat(format!(
                "node {}: forelink {} does not point forward",
                index, fore
            )));
        }
        if let Some(fore) = node.forelinks.range(size..).next() {
            return Err(Error::InvalidWireFormat(format!(
                "node {}: forelink {} is past the last node {}",
                index,
                fore,
                size.saturating_sub(1)
            )));
        }
    }
    Ok(())
}

impl Linkograph {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write the CSV line-per-node form
    ///
    /// Backlinks and identifiers are not written; [`from_csv_str`](Self::from_csv_str)
    /// rebuilds backlinks from the forelinks. A node with neither labels nor
    /// forelinks becomes a blank line, which the parser rejects.
    pub fn to_csv_string(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            let labels: Vec<&str> = node.labels.iter().map(String::as_str).collect();
            out.push_str(&labels.join(" "));
            for fore in &node.forelinks {
                out.push(',');
                out.push_str(&fore.to_string());
            }
            out.push('\n');
        }
        out
    }

    /// Parse the CSV line-per-node form
    ///
    /// The vocabulary is the sorted set of labels used.
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let mut nodes = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                return Err(Error::InvalidWireFormat(format!(
                    "line {}: empty entry",
                    index + 1
                )));
            }

            let mut fields = line.split(',');
            let labels = fields
                .next()
                .unwrap_or_default()
                .split_whitespace()
                .map(String::from)
                .collect();

            let forelinks = fields
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(|field| {
                    field.parse::<usize>().map_err(|_| {
                        Error::InvalidWireFormat(format!(
                            "line {}: invalid forelink '{}'",
                            index + 1,
                            field
                        ))
                    })
                })
                .collect::<Result<BTreeSet<usize>>>()?;

            nodes.push(Node {
                labels,
                forelinks,
                ..Node::default()
            });
        }

        validate_links(&nodes)?;

        for index in 0..nodes.len() {
            let targets: Vec<usize> = nodes[index].forelinks.iter().copied().collect();
            for target in targets {
                nodes[target].backlinks.insert(index);
            }
        }

        let vocabulary: BTreeSet<&String> = nodes.iter().flat_map(|n| n.labels.iter()).collect();
        Ok(Linkograph {
            vocabulary: vocabulary.into_iter().cloned().collect(),
            nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::check_structure;
    use crate::linkograph::tests::simple_linko;

    #[test]
    fn test_json_shape() {
        let mut linko = Linkograph::new().with_vocabulary(["A", "B"]).with_nodes(vec![
            Node::new().with_labels(["B", "A"]).with_identifier("first"),
            Node::new().with_labels(["B"]),
        ]);
        linko.add_link(0, 1);

        assert_eq!(
            linko.to_json().unwrap(),
            r#"[["A","B"],[["A","B"],[],[1],"first"],[["B"],[0],[],null]]"#
        );
    }

    #[test]
    fn test_json_round_trip_keeps_identifiers() {
        let mut linko = simple_linko();
        linko.set_identifiers(["a", "b", "c", "d", "e"]);
        let parsed = Linkograph::from_json(&linko.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, linko);
        assert_eq!(parsed.subgraph(Some(3), None).identifiers(), vec![Some("d"), Some("e")]);
    }

    #[test]
    fn test_json_identifier_is_optional() {
        let linko = Linkograph::from_json(r#"[["A"], [["A"], [], [1]], [["A"], [0], []]]"#).unwrap();
        assert_eq!(linko.len(), 2);
        assert_eq!(linko.identifiers(), vec![None, None]);
        assert!(check_structure(&linko, true).is_consistent());
    }

    #[test]
    fn test_json_rejects_malformed() {
        assert!(Linkograph::from_json("[]").is_err());
        assert!(Linkograph::from_json(r#"{"vocabulary": []}"#).is_err());
        assert!(Linkograph::from_json(r#"[["A"], [["A"], [-1], []]]"#).is_err());
        assert!(matches!(
            Linkograph::from_json("[["),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_from_csv_str() {
        let text = "A B C,1,2,3\nD,3,4\nA,4\nB C,4\nA\n";
        let linko = Linkograph::from_csv_str(text).unwrap();

        assert_eq!(linko, simple_linko());
        assert!(check_structure(&linko, true).is_consistent());
    }

    #[test]
    fn test_to_csv_string() {
        let text = simple_linko().to_csv_string();
        assert_eq!(text, "A B C,1,2,3\nD,3,4\nA,4\nB C,4\nA\n");
        assert_eq!(Linkograph::from_csv_str(&text).unwrap(), simple_linko());
    }

    #[test]
    fn test_from_csv_str_errors() {
        assert!(matches!(
            Linkograph::from_csv_str("A,1\nB,x"),
            Err(Error::InvalidWireFormat(message)) if message.contains("line 2")
        ));
        assert!(Linkograph::from_csv_str("A,1\n\nB").is_err());
        assert!(Linkograph::from_csv_str("").unwrap().is_empty());
    }

    #[test]
    fn test_from_csv_str_rejects_links_outside_the_graph() {
        assert!(matches!(
            Linkograph::from_csv_str("A,1,2,3\nA"),
            Err(Error::InvalidWireFormat(message)) if message.contains("forelink 2 is past")
        ));
        assert!(matches!(
            Linkograph::from_csv_str("A,1\nA,0"),
            Err(Error::InvalidWireFormat(message)) if message.contains("node 1: forelink 0")
        ));
        assert!(Linkograph::from_csv_str("A,0").is_err());
    }

    #[test]
    fn test_json_rejects_links_outside_the_graph() {
        let past_end = Linkograph::from_json(r#"[["A"], [["A"], [], [1]], [["A"], [0], [4]]]"#);
        assert!(past_end.unwrap_err().to_string().contains("forelink 4 is past"));

        let backward = Linkograph::from_json(r#"[["A"], [["A"], [], []], [["A"], [], [0]]]"#);
        assert!(backward.unwrap_err().to_string().contains("does not point forward"));

        let late_backlink = Linkograph::from_json(r#"[["A"], [["A"], [1], []], [["A"], [], []]]"#);
        assert!(late_backlink
            .unwrap_err()
            .to_string()
            .contains("backlink 1 does not point backward"));
    }

    #[test]
    fn test_json_keeps_one_sided_links_for_the_checker() {
        let linko = Linkograph::from_json(r#"[["A"], [["A"], [], [1]], [["A"], [], []]]"#).unwrap();
        assert!(!check_structure(&linko, false).is_consistent());
    }
}
