use thiserror::Error;

/// Reasons a position record can be refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("expected 6 fields, found {0}")]
    FieldCount(usize),
    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {rank} spans {files} files instead of 8")]
    FileCount { rank: usize, files: usize },
    #[error("empty run '{digit}' on rank {rank} does not fit in the remaining files")]
    EmptyRun { rank: usize, digit: char },
    #[error("unknown piece '{0}'")]
    UnknownPiece(char),
    #[error("invalid side to move '{0}'")]
    SideToMove(String),
    #[error("invalid castling field '{0}'")]
    Castling(String),
    #[error("invalid en passant field '{0}'")]
    EnPassant(String),
    #[error("invalid move counter '{0}'")]
    Counter(String),
    #[error("expected exactly one king per side")]
    KingCount,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid position record: {0}")]
    InvalidRecord(#[from] RecordError),
    #[error("search depth must be positive, got {0}")]
    InvalidDepth(i32),
    #[error("a search is already running")]
    SearchInProgress,
    #[error("illegal or badly formatted move '{0}'")]
    UnknownMove(String),
}
