#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RankSetError {
    #[error("score bounds must be non-negative, got [{low}, {high}]")]
    NegativeBound { low: i64, high: i64 },

    #[error("score range is inverted: low {low} is greater than high {high}")]
    InvertedRange { low: i64, high: i64 },
}

pub type RankSetResult<T> = Result<T, RankSetError>;
