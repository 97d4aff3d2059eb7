//! UDS symbols and sequences
//!
//! The alphabet is `B` (base, no prior comparison), `U` (up), `D` (down) and
//! `S` (same). A sequence is serialized as one character per symbol with no
//! separators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UdsError};

/// One step of relative change between consecutive blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UdsSymbol {
    Base,
    Up,
    Down,
    Same,
}

impl UdsSymbol {
    pub fn as_char(self) -> char {
        match self {
            UdsSymbol::Base => 'B',
            UdsSymbol::Up => 'U',
            UdsSymbol::Down => 'D',
            UdsSymbol::Same => 'S',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'B' => Some(UdsSymbol::Base),
            'U' => Some(UdsSymbol::Up),
            'D' => Some(UdsSymbol::Down),
            'S' => Some(UdsSymbol::Same),
            _ => None,
        }
    }
}

impl fmt::Display for UdsSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Ordered UDS symbols, always starting with a single `Base`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdsSequence {
    symbols: Vec<UdsSymbol>,
}

impl UdsSequence {
    pub(crate) fn from_symbols(symbols: Vec<UdsSymbol>) -> Self {
        debug_assert_eq!(symbols.first(), Some(&UdsSymbol::Base));
        Self { symbols }
    }

    pub fn symbols(&self) -> &[UdsSymbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol counts for reporting
    pub fn stats(&self) -> UdsStats {
        let mut stats = UdsStats::default();
        for symbol in &self.symbols {
            match symbol {
                UdsSymbol::Base => stats.base += 1,
                UdsSymbol::Up => stats.up += 1,
                UdsSymbol::Down => stats.down += 1,
                UdsSymbol::Same => stats.same += 1,
            }
        }
        stats
    }
}

impl fmt::Display for UdsSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{}", symbol.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for UdsSequence {
    type Err = UdsError;

    /// Parse a UDS text stream
    ///
    /// The stream must start with exactly one `B` and contain only `B`, `U`,
    /// `D` and `S` afterwards.
    fn from_str(s: &str) -> Result<Self> {
        let mut symbols = Vec::with_capacity(s.len());
        for (position, c) in s.chars().enumerate() {
            let symbol =
                UdsSymbol::from_char(c).ok_or(UdsError::InvalidSymbol { symbol: c, position })?;
            // Base is only valid as the leading sentinel.
            if (symbol == UdsSymbol::Base) != (position == 0) {
                return Err(UdsError::InvalidSymbol { symbol: c, position });
            }
            symbols.push(symbol);
        }
        if symbols.is_empty() {
            return Err(UdsError::InvalidSymbol {
                symbol: ' ',
                position: 0,
            });
        }
        Ok(Self { symbols })
    }
}

/// Histogram of a UDS sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdsStats {
    pub base: usize,
    pub up: usize,
    pub down: usize,
    pub same: usize,
}

impl UdsStats {
    pub fn total(&self) -> usize {
        self.base + self.up + self.down + self.same
    }

    /// Fraction of comparisons that saw no significant change
    pub fn same_ratio(&self) -> f64 {
        let compared = self.up + self.down + self.same;
        if compared == 0 {
            return 0.0;
        }
        self.same as f64 / compared as f64
    }
}
