//! Bijective integer encoding of linkograph topologies
//!
//! A linkograph of `n` nodes has `total_links(n)` possible links. Ordering
//! them by terminal node, then by source node, turns every topology into a
//! bit set and so into a unique integer below `2^total_links(n)`. Labels are
//! not part of the encoding.

mod code;
mod counter;
mod frequency;

pub use code::LinkCode;
pub use counter::ModularCounter;
pub use frequency::{frequency, histogram, sub_linkograph_frequency, FrequencyOptions};

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::limits::validate_range_links;
use crate::linkograph::{Linkograph, Ontology};
use crate::stats::total_links;

/// A linkograph topology as `(length, code)`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Enumeration {
    pub length: usize,
    pub code: LinkCode,
}

impl Enumeration {
    pub fn new(length: usize, code: impl Into<LinkCode>) -> Self {
        Self {
            length,
            code: code.into(),
        }
    }
}

impl fmt::Display for Enumeration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.length, self.code)
    }
}

/// Number of distinct topologies on `n` nodes: `2^total_links(n)`
pub fn total_linkographs(n: usize) -> LinkCode {
    LinkCode::power_of_two(total_links(n))
}

/// Bit position of the link `back -> fore`
fn link_position(back: usize, fore: usize) -> usize {
    back + total_links(fore)
}

/// Encode the topology of `linko`
///
/// Only backlinks are read; forelinks of a consistent graph carry the same
/// information.
pub fn encode(linko: &Linkograph) -> Enumeration {
    let mut code = LinkCode::zero();
    for (fore, node) in linko.iter().enumerate() {
        for &back in node.backlinks.range(..fore) {
            code.set_bit(link_position(back, fore));
        }
    }
    Enumeration {
        length: linko.len(),
        code,
    }
}

/// Rebuild the unlabeled linkograph for an enumeration
pub fn decode(enumeration: &Enumeration) -> Result<Linkograph> {
    if enumeration.code.bit_len() > total_links(enumeration.length) {
        return Err(Error::InvalidEnumeration {
            length: enumeration.length,
            code: enumeration.code.to_string(),
        });
    }
    Ok(decode_unchecked(enumeration.length, &enumeration.code))
}

fn decode_unchecked(length: usize, code: &LinkCode) -> Linkograph {
    let mut linko = Linkograph::with_size(length);
    let mut fore = 1;
    for position in code.ones() {
        while total_links(fore + 1) <= position {
            fore += 1;
        }
        linko.add_link(position - total_links(fore), fore);
    }
    linko
}

/// Decode every code in `codes` for graphs of `length` nodes
///
/// Consecutive ranges partition the code space, so independent workers can
/// each take one. Codes are addressed as `u128`, which bounds `length`.
pub fn decode_range(
    length: usize,
    codes: Range<u128>,
) -> Result<impl Iterator<Item = Linkograph>> {
    let links = total_links(length);
    validate_range_links(links)?;

    let total = 1u128 << links;
    if codes.end > total {
        return Err(Error::InvalidEnumeration {
            length,
            code: (codes.end - 1).to_string(),
        });
    }

    tracing::debug!(
        "Decoding {} linkographs of length {}",
        codes.end.saturating_sub(codes.start),
        length
    );
    Ok(codes.map(move |code| decode_unchecked(length, &LinkCode::from(code))))
}

/// Ontology described by one adjacency code per class
///
/// Bit `j` of `codes[i]` set means an edge `classes[i] -> classes[j]`. Classes
/// default to `"0"`, `"1"`, ...; extra classes beyond the number of codes are
/// ignored.
pub fn ontology_from_codes(codes: &[LinkCode], classes: Option<&[String]>) -> Result<Ontology> {
    let classes: Vec<String> = match classes {
        None => (0..codes.len()).map(|i| i.to_string()).collect(),
        Some(classes) if classes.len() < codes.len() => {
            return Err(Error::ClassOutOfRange {
                digit: codes.len() - 1,
                available: classes.len(),
            });
        }
        Some(classes) => classes[..codes.len()].to_vec(),
    };

    let mut ontology: Ontology = classes.iter().map(|c| (c.clone(), Vec::new())).collect();
    for (class, code) in classes.iter().zip(codes) {
        for target in code.ones() {
            let terminal = classes.get(target).ok_or(Error::ClassOutOfRange {
                digit: target,
                available: classes.len(),
            })?;
            ontology
                .entry(class.clone())
                .or_default()
                .push(terminal.clone());
        }
    }

    Ok(ontology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::check_structure;
    use crate::linkograph::tests::simple_linko;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_total_linkographs() {
        assert_eq!(total_linkographs(0), LinkCode::from(1u64));
        assert_eq!(total_linkographs(3), LinkCode::from(8u64));
        assert_eq!(total_linkographs(6), LinkCode::from(1u64 << 15));
        assert_eq!(total_linkographs(12).bit_len(), 67);
    }

    #[test]
    fn test_encode_simple() {
        let encoded = encode(&simple_linko());
        assert_eq!(encoded, Enumeration::new(5, 923u64));
        assert_eq!(encoded.to_string(), "(5, 923)");
    }

    #[test]
    fn test_decode_small() {
        let linko = decode(&Enumeration::new(3, 0b101u64)).unwrap();
        assert_eq!(linko.len(), 3);
        assert_eq!(linko.nodes[0].forelinks, BTreeSet::from([1]));
        assert_eq!(linko.nodes[1].forelinks, BTreeSet::from([2]));
        assert_eq!(linko.nodes[2].backlinks, BTreeSet::from([1]));
        assert!(linko.nodes.iter().all(|n| n.labels.is_empty()));

        assert!(decode(&Enumeration::new(0, 0u64)).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        for (length, code) in [(0, 1u64), (1, 1), (3, 8), (4, 64)] {
            let result = decode(&Enumeration::new(length, code));
            assert!(
                matches!(result, Err(Error::InvalidEnumeration { .. })),
                "({length}, {code}) should be rejected"
            );
        }
        assert!(decode(&Enumeration::new(4, 63u64)).is_ok());
    }

    #[test]
    fn test_round_trip_exhaustive() {
        for length in 0..6 {
            let total = 1u64 << total_links(length);
            for code in 0..total {
                let enumeration = Enumeration::new(length, code);
                let linko = decode(&enumeration).unwrap();
                assert!(check_structure(&linko, false).is_consistent());
                assert_eq!(encode(&linko), enumeration);
            }
        }
    }

    #[test]
    fn test_round_trip_large() {
        let mut code = LinkCode::zero();
        for bit in [0, 17, 64, 100, 189] {
            code.set_bit(bit);
        }
        let enumeration = Enumeration {
            length: 20,
            code,
        };
        let linko = decode(&enumeration).unwrap();
        assert_eq!(linko.link_count(), 5);
        assert_eq!(encode(&linko), enumeration);
    }

    #[test]
    fn test_decode_range() {
        let decoded: Vec<Linkograph> = decode_range(3, 2..6).unwrap().collect();
        assert_eq!(decoded.len(), 4);
        assert_eq!(encode(&decoded[0]), Enumeration::new(3, 2u64));
        assert_eq!(encode(&decoded[3]), Enumeration::new(3, 5u64));

        assert!(decode_range(3, 0..9).is_err());
        assert!(matches!(decode_range(17, 0..1), Err(Error::Limit(_))));
        assert_eq!(decode_range(4, 5..5).unwrap().count(), 0);
    }

    #[test]
    fn test_ontology_from_codes() {
        let codes = [LinkCode::from(0b10u64), LinkCode::from(0b11u64)];
        let ontology = ontology_from_codes(&codes, None).unwrap();
        assert_eq!(ontology["0"], vec!["1"]);
        assert_eq!(ontology["1"], vec!["0", "1"]);

        let classes = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let ontology = ontology_from_codes(&codes, Some(&classes)).unwrap();
        assert_eq!(ontology.len(), 2);
        assert_eq!(ontology["A"], vec!["B"]);
        assert_eq!(ontology["B"], vec!["A", "B"]);
    }

    #[test]
    fn test_ontology_from_codes_errors() {
        let codes = [LinkCode::from(0b100u64), LinkCode::zero()];
        assert!(matches!(
            ontology_from_codes(&codes, None),
            Err(Error::ClassOutOfRange { digit: 2, available: 2 })
        ));

        let classes = vec!["A".to_string()];
        assert!(ontology_from_codes(&codes, Some(&classes)).is_err());
    }

    proptest! {
        #[test]
        fn prop_round_trip_medium(
            (length, code) in (6usize..10).prop_flat_map(|n| {
                let bits = total_links(n).min(63);
                (Just(n), 0u64..(1u64 << bits))
            })
        ) {
            let enumeration = Enumeration::new(length, code);
            let linko = decode(&enumeration).unwrap();
            prop_assert_eq!(linko.link_count() as u32, code.count_ones());
            prop_assert_eq!(encode(&linko), enumeration);
        }

        #[test]
        fn prop_encode_inverts_decode_of_any_graph(
            links in proptest::collection::btree_set((0usize..8, 0usize..8), 0..20)
        ) {
            let mut linko = Linkograph::with_size(8);
            for (a, b) in links {
                linko.add_link(a.min(b), a.max(b));
            }
            let decoded = decode(&encode(&linko)).unwrap();
            prop_assert_eq!(decoded, linko);
        }
    }
}
