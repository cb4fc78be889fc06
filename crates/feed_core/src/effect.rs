use crate::FetchRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchPage(FetchRequest),
}
