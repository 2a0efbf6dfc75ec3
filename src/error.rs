// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error type shared by the indexing core, connectivity and attributes

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors raised by key, grid, mesh and attribute operations.
///
/// All failures are local and synchronous. Nothing here is transient, so
/// callers should never retry; an attribute computation that fails leaves the
/// attribute cache exactly as it was.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// The requested spatial dimension (or element arity) is not supported
    #[error("unsupported dimension {found} (expected {expected})")]
    InvalidDimension { found: usize, expected: &'static str },

    /// A key, attribute or element was never inserted or computed
    #[error("not found: {0}")]
    NotFound(String),

    /// Recognized configuration that has no implementation (e.g. hex-only attribute)
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Zero-area, zero-volume or otherwise collapsed geometry
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// An edge incident to more than two faces where exactly two are required
    #[error("non-manifold edge ({v0}, {v1}) is shared by {faces} faces")]
    NonManifoldEdge { v0: usize, v1: usize, faces: usize },

    /// Raw arrays with bad lengths, out-of-range indices or non-finite values
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Attribute prerequisites that refer back to themselves
    #[error("cyclic attribute dependency: {0}")]
    CyclicDependency(String),
}

impl MeshError {
    pub(crate) fn dimension(found: usize, expected: &'static str) -> Self {
        Self::InvalidDimension { found, expected }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MeshError::NonManifoldEdge { v0: 3, v1: 7, faces: 3 };
        assert_eq!(err.to_string(), "non-manifold edge (3, 7) is shared by 3 faces");

        let err = MeshError::dimension(4, "2 or 3");
        assert_eq!(err.to_string(), "unsupported dimension 4 (expected 2 or 3)");
    }
}
