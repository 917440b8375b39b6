use serde::Serialize;
use utoipa::ToSchema;

use super::operation::Operation;

/// Ordered, non-empty list of operations applied left to right.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct Pipeline(Vec<Operation>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("pipeline must contain at least one operation")]
pub struct EmptyPipeline;

impl Pipeline {
    pub fn new(operations: Vec<Operation>) -> Result<Self, EmptyPipeline> {
        if operations.is_empty() {
            return Err(EmptyPipeline);
        }
        Ok(Self(operations))
    }

    pub fn operations(&self) -> &[Operation] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Pipeline {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pipeline_rejected() {
        assert_eq!(Pipeline::new(vec![]), Err(EmptyPipeline));
    }

    #[test]
    fn test_order_preserved() {
        let pipeline = Pipeline::new(vec![Operation::Flip, Operation::Rotate(90.0)]).unwrap();
        let tags: Vec<_> = pipeline.into_iter().map(|op| op.tag()).collect();
        assert_eq!(tags, vec!["flip", "rotate"]);
        assert_eq!(pipeline.len(), 2);
    }
}
