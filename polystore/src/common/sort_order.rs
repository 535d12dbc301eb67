/// Specifies the direction for ordering query results.
///
/// Used with the query builder's `order_by`:
/// ```text
/// db.query("players").order_by("score", SortOrder::Descending).execute()?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest to largest (A to Z, 0 to 9)
    Ascending,
    /// Largest to smallest (Z to A, 9 to 0)
    Descending,
}

impl SortOrder {
    /// The SQL keyword for this direction.
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }

    /// The signed direction used by document-store sort specifications.
    pub fn direction(&self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}
