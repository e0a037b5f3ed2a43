use crate::model::{Service, ServiceStatus};

/// Status category tab shown above the service table
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatusTab {
    #[default]
    All,
    Active,
    Inactive,
    Failed,
}

impl StatusTab {
    pub const ALL: [StatusTab; 4] = [Self::All, Self::Active, Self::Inactive, Self::Failed];

    pub fn cycle(self) -> Self {
        match self {
            Self::All => Self::Active,
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Failed,
            Self::Failed => Self::All,
        }
    }

    pub fn cycle_back(self) -> Self {
        match self {
            Self::All => Self::Failed,
            Self::Active => Self::All,
            Self::Inactive => Self::Active,
            Self::Failed => Self::Inactive,
        }
    }

    pub fn matches(&self, status: ServiceStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == ServiceStatus::Active,
            Self::Inactive => status == ServiceStatus::Inactive,
            Self::Failed => status == ServiceStatus::Failed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Failed => "Failed",
        }
    }

    /// Parse a tab name as typed on the command line
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Free-text search over service name and description
#[derive(Clone, Debug, Default)]
pub struct SearchFilter {
    term: String,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_active(&self) -> bool {
        !self.term.trim().is_empty()
    }

    /// Case-insensitive substring match; a blank term matches everything.
    pub fn matches(&self, service: &Service) -> bool {
        if !self.is_active() {
            return true;
        }
        let term = self.term.to_lowercase();
        service.name.to_lowercase().contains(&term)
            || service.description.to_lowercase().contains(&term)
    }

    pub fn set(&mut self, term: impl Into<String>) {
        self.term = term.into();
    }

    pub fn push(&mut self, c: char) {
        self.term.push(c);
    }

    pub fn pop(&mut self) {
        self.term.pop();
    }

    pub fn clear(&mut self) {
        self.term.clear();
    }
}

/// Per-tab service counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub all: usize,
    pub active: usize,
    pub inactive: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn tally<'a>(services: impl IntoIterator<Item = &'a Service>) -> Self {
        let mut counts = Self::default();
        for service in services {
            counts.all += 1;
            match service.status {
                ServiceStatus::Active => counts.active += 1,
                ServiceStatus::Inactive => counts.inactive += 1,
                ServiceStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    pub fn get(&self, tab: StatusTab) -> usize {
        match tab {
            StatusTab::All => self.all,
            StatusTab::Active => self.active,
            StatusTab::Inactive => self.inactive,
            StatusTab::Failed => self.failed,
        }
    }
}

/// Search term and status tab, composed with a logical AND.
///
/// The filter never owns or mutates the service list; every call derives its
/// result from the slice it is given.
#[derive(Clone, Debug, Default)]
pub struct ServiceFilter {
    pub search: SearchFilter,
    pub tab: StatusTab,
}

impl ServiceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab(mut self, tab: StatusTab) -> Self {
        self.tab = tab;
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search.set(term);
        self
    }

    pub fn matches(&self, service: &Service) -> bool {
        self.search.matches(service) && self.tab.matches(service.status)
    }

    /// Services passing both predicates, in list order
    pub fn visible<'a>(&self, services: &'a [Service]) -> Vec<&'a Service> {
        services.iter().filter(|s| self.matches(s)).collect()
    }

    /// Tab counts over the search-filtered set (the active tab is ignored)
    pub fn counts(&self, services: &[Service]) -> StatusCounts {
        StatusCounts::tally(services.iter().filter(|s| self.search.matches(s)))
    }

    pub fn cycle_tab(&mut self) {
        self.tab = self.tab.cycle();
    }

    pub fn label(&self) -> String {
        if self.search.is_active() {
            format!("{} /{}/", self.tab.label(), self.search.term())
        } else {
            self.tab.label().to_string()
        }
    }
}
