use crate::Category;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenameError {
    /// A generated name may map back to exactly one original per category.
    #[error("{category}: `{value}` already stands for `{owner}` and cannot also stand for `{key}`")]
    Conflict {
        category: Category,
        key: String,
        value: String,
        owner: String,
    },

    #[error(
        "{category}: no unused name for `{original}` up to length {length} \
         ({assigned} names assigned); the character pool is too small"
    )]
    ExhaustedPool {
        category: Category,
        original: String,
        length: usize,
        assigned: usize,
    },

    #[error("{category}: character pool is empty")]
    EmptyPool { category: Category },
}
