use crate::core::types::PaginationInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset,
            limit: limit.max(1),
        }
    }

    pub fn advance(self) -> Self {
        Self {
            offset: self.offset + self.limit,
            ..self
        }
    }

    pub fn retreat(self) -> Self {
        Self {
            offset: self.offset.saturating_sub(self.limit),
            ..self
        }
    }

    pub fn with_limit(self, limit: u64) -> Self {
        Self::new(0, limit)
    }

    pub fn first(self) -> Self {
        Self { offset: 0, ..self }
    }

    pub fn derive(&self, total: u64) -> PaginationInfo {
        derive(total, self.offset, self.limit)
    }
}

pub fn derive(total: u64, offset: u64, limit: u64) -> PaginationInfo {
    let limit = limit.max(1);
    PaginationInfo {
        total_rows: total,
        current_page: offset / limit + 1,
        total_pages: total.div_ceil(limit).max(1),
        has_previous: offset > 0,
        has_next: offset + limit < total,
    }
}
