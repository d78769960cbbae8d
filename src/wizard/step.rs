// Wizard steps

/// The six ordered steps of the listing wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    BasicInfo,
    Details,
    Availability,
    Media,
    Terms,
    Review,
}

impl Step {
    pub const ALL: [Self; 6] = [
        Self::BasicInfo,
        Self::Details,
        Self::Availability,
        Self::Media,
        Self::Terms,
        Self::Review,
    ];

    pub const fn index(self) -> usize {
        match self {
            Self::BasicInfo => 0,
            Self::Details => 1,
            Self::Availability => 2,
            Self::Media => 3,
            Self::Terms => 4,
            Self::Review => 5,
        }
    }

    /// Clamps out-of-range indices to the last step.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn prev(self) -> Self {
        if self.index() == 0 {
            self
        } else {
            Self::from_index(self.index() - 1)
        }
    }

    pub const fn is_last(self) -> bool {
        self.index() == Self::ALL.len() - 1
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic Information",
            Self::Details => "Details & Pricing",
            Self::Availability => "Availability & Location",
            Self::Media => "Photos & Video",
            Self::Terms => "Rental Terms",
            Self::Review => "Review & Submit",
        }
    }
}
