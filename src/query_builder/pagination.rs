/// Row window of a query, rendered as trailing `limit` / `offset` literals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    /// Window for a 1-indexed page of `per_page` rows
    pub fn page(page: u64, per_page: u64) -> Self {
        Self {
            limit: Some(per_page),
            offset: Some(page.saturating_sub(1).saturating_mul(per_page)),
        }
    }

    pub fn limit_only(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    pub fn offset_only(offset: u64) -> Self {
        Self {
            limit: None,
            offset: Some(offset),
        }
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none()
    }

    /// Trailing clause text, empty when no window is set
    pub fn to_sql(&self) -> String {
        let mut sql = String::new();

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" limit {limit}"));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" offset {offset}"));
        }

        sql
    }

    /// Applies the window to an already ordered sequence
    pub fn apply<T>(&self, rows: Vec<T>) -> Vec<T> {
        let skip = self.offset.map_or(0, |o| usize::try_from(o).unwrap_or(usize::MAX));
        let take = self.limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        rows.into_iter().skip(skip).take(take).collect()
    }

    /// Page count for `total_count` rows; 1 without a limit
    pub fn total_pages(&self, total_count: u64) -> u64 {
        match self.limit {
            Some(0) | None => 1,
            Some(limit) => total_count.div_ceil(limit),
        }
    }

    pub fn current_page(&self) -> u64 {
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) if limit > 0 => offset / limit + 1,
            _ => 1,
        }
    }

    pub fn has_next_page(&self, total_count: u64) -> bool {
        match self.limit {
            Some(limit) => self.offset.unwrap_or(0).saturating_add(limit) < total_count,
            None => false,
        }
    }
}
