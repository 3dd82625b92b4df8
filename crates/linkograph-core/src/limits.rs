//! Resource limits for exhaustive enumeration
//!
//! Enumerating every linkograph of `n` nodes visits `2^(n(n-1)/2)` graphs and
//! enumerating every labeling visits `classes^n` labelings. Callers bound `n`;
//! these limits only reject requests whose counts cannot be represented.

/// Maximum labelings visited by a single frequency/histogram sweep (2^32)
pub const MAX_SWEEP_LABELINGS: u64 = 1 << 32;

/// Maximum possible links for ranged decoding, which addresses codes as `u128`
pub const MAX_RANGE_LINKS: usize = 127;

/// Limit violation
#[derive(Debug, Clone, PartialEq)]
pub enum LimitError {
    TooManyLabelings { classes: usize, length: usize, max: u64 },
    RangeTooWide { links: usize, max: usize },
}

impl std::fmt::Display for LimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyLabelings { classes, length, max } => {
                write!(
                    f,
                    "Too many labelings: {}^{} exceeds {} (pass an explicit sample count)",
                    classes, length, max
                )
            }
            Self::RangeTooWide { links, max } => {
                write!(f, "Ranged decoding supports at most {} links, got {}", max, links)
            }
        }
    }
}

impl std::error::Error for LimitError {}

/// Number of labelings of `length` nodes over `classes` classes, if within limits
pub fn validate_sweep(classes: usize, length: usize) -> Result<u64, LimitError> {
    let exponent = u32::try_from(length).unwrap_or(u32::MAX);
    (classes as u64)
        .checked_pow(exponent)
        .filter(|count| *count <= MAX_SWEEP_LABELINGS)
        .ok_or(LimitError::TooManyLabelings {
            classes,
            length,
            max: MAX_SWEEP_LABELINGS,
        })
}

/// Validate that codes of a linkograph with `links` possible links fit in `u128`
pub fn validate_range_links(links: usize) -> Result<(), LimitError> {
    if links > MAX_RANGE_LINKS {
        return Err(LimitError::RangeTooWide {
            links,
            max: MAX_RANGE_LINKS,
        });
    }
    Ok(())
}
