//! unix specific values

/// Separates entries of a PATH-like list
pub const PATH_DELIMITER: char = ':';
