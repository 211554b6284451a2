use chatree_tree::{NodeId, TreeError};
use thiserror::Error;

use crate::form::SubmissionId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("node {0} has no open chat form")]
    NotAForm(NodeId),

    #[error("node {0} is already submitting")]
    AlreadySubmitting(NodeId),

    #[error("node {0} cannot have children")]
    NotExpandable(NodeId),

    #[error("nothing to send")]
    EmptyInput,

    #[error("no send in flight with id {0}")]
    UnknownSubmission(SubmissionId),
}
