//! Cross-crate integration tests for the scanner workspace.

#[cfg(test)]
mod support;

#[cfg(test)]
mod aggregator;

#[cfg(test)]
mod enrichment;
