/// Per-run tallies shared by both reconciliation modes. Item-scoped
/// failures land in `errors` and never abort the batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub created: u32,
    pub duplicates: u32,
    pub deleted: u32,
    pub not_found: u32,
    pub errors: u32,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}
