/// Final state of one run, logged when it completes.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub index: usize,
    pub temperature: f64,
    pub field: f64,
    pub steps: usize,
    pub magnetization: f64,
    pub energy: f64,
    /// Whether the run's table reached the exporter without error.
    pub exported: bool,
}

/// What a whole batch did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub outcomes: Vec<RunOutcome>,
    /// Highest number of runs observed executing at the same time.
    pub peak_concurrency: usize,
}

impl BatchSummary {
    pub fn completed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn export_failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.exported).count()
    }
}
