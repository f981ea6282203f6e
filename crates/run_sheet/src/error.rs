use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunSheetError {
    #[error("duplicate run sheet item id '{0}'")]
    DuplicateItemId(String),
}
