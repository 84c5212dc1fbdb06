use smb_load::LoadReport;

/// What one step did across the files it examined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub step: String,
    pub examined: usize,
    pub rewritten: usize,
    /// Non-null values turned into nulls by failed coercions.
    pub nulls: usize,
    pub load: Option<LoadReport>,
}

impl StepReport {
    pub fn new(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub steps: Vec<StepReport>,
    pub dry_run: bool,
}

impl RunReport {
    pub fn rewritten(&self) -> usize {
        self.steps.iter().map(|s| s.rewritten).sum()
    }

    pub fn load(&self) -> Option<&LoadReport> {
        self.steps.iter().rev().find_map(|s| s.load.as_ref())
    }
}
