//! T-complexity of link bitstrings

use std::ops::Range;

use super::slice::{entry_to_string, LinkDirection};
use crate::linkograph::Linkograph;

fn word<'a>(symbols: &'a [u8], range: &Range<usize>) -> &'a [u8] {
    &symbols[range.clone()]
}

/// T-complexity of `string`
///
/// The string starts out as single-symbol codewords. Each step takes the
/// penultimate codeword, counts how often it repeats immediately to its left,
/// and merges every run of it (up to that multiplicity) with the codeword that
/// follows. The result sums `log2(multiplicity + 1)` over all steps.
pub fn t_complexity(string: &str) -> f64 {
    let symbols = string.as_bytes();
    // Codewords are always contiguous spans of the input.
    let mut codewords: Vec<Range<usize>> = (0..symbols.len()).map(|i| i..i + 1).collect();

    let mut complexity = 0.0;
    while codewords.len() > 1 {
        let next = word(symbols, &codewords[codewords.len() - 2]);
        let count = 1 + codewords[..codewords.len() - 2]
            .iter()
            .rev()
            .take_while(|cw| word(symbols, cw) == next)
            .count();
        complexity += ((count + 1) as f64).log2();

        let mut merged = Vec::with_capacity(codewords.len());
        let mut start: Option<usize> = None;
        let mut run = 0;
        for cw in &codewords {
            let begin = *start.get_or_insert(cw.start);
            if word(symbols, cw) == next && run < count {
                run += 1;
            } else {
                merged.push(begin..cw.end);
                start = None;
                run = 0;
            }
        }
        if let (Some(begin), Some(last)) = (start, codewords.last()) {
            merged.push(begin..last.end);
        }
        codewords = merged;
    }

    complexity
}

/// Concatenated forelink bitstrings of every node but the last
///
/// Node `i` contributes one character per later node.
pub fn linkograph_to_bitstring(linko: &Linkograph) -> String {
    let Some(last) = linko.len().checked_sub(1) else {
        return String::new();
    };
    (0..last)
        .map(|index| entry_to_string(&linko.nodes[index], index, LinkDirection::Fore, index, last))
        .collect()
}
