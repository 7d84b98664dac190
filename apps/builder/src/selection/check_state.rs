//! Tri-state checkbox derivation. Always computed from the children on read;
//! never stored.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::selection::state::{
    CompanySelection, PositionSelection, ProjectSelection, SelectionState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Checked,
    Unchecked,
    Indeterminate,
}

impl CheckState {
    /// Indeterminate when some but not all children are selected. A parent
    /// without children shows its own flag.
    pub fn derive(own: bool, children: impl IntoIterator<Item = bool>) -> Self {
        let mut any = false;
        let mut all = true;
        let mut seen = false;
        for child in children {
            seen = true;
            any |= child;
            all &= child;
        }
        match (seen, any, all) {
            (false, _, _) => Self::from_flag(own),
            (true, true, true) => CheckState::Checked,
            (true, true, false) => CheckState::Indeterminate,
            (true, false, _) => CheckState::Unchecked,
        }
    }

    pub fn from_flag(selected: bool) -> Self {
        if selected {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        }
    }
}

impl PositionSelection {
    pub fn check_state(&self) -> CheckState {
        CheckState::derive(self.selected, self.bullets.iter().copied())
    }
}

impl ProjectSelection {
    pub fn check_state(&self) -> CheckState {
        CheckState::derive(self.selected, self.highlights.iter().copied())
    }
}

impl CompanySelection {
    /// A company is also indeterminate when any of its positions is, so a
    /// partially selected position is visible at the company level.
    pub fn check_state(&self) -> CheckState {
        if self
            .positions
            .iter()
            .any(|p| p.check_state() == CheckState::Indeterminate)
        {
            return CheckState::Indeterminate;
        }
        CheckState::derive(self.selected, self.positions.iter().map(|p| p.selected))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyCheckState {
    pub state: CheckState,
    pub positions: Vec<CheckState>,
}

/// Check states for every parent-level checkbox of one selection state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckStates {
    pub work_experience: BTreeMap<String, CompanyCheckState>,
    pub projects: Vec<CheckState>,
}

impl SelectionState {
    pub fn check_states(&self) -> CheckStates {
        CheckStates {
            work_experience: self
                .work_experience
                .iter()
                .map(|(name, company)| {
                    (
                        name.clone(),
                        CompanyCheckState {
                            state: company.check_state(),
                            positions: company.positions.iter().map(|p| p.check_state()).collect(),
                        },
                    )
                })
                .collect(),
            projects: self.projects.iter().map(|p| p.check_state()).collect(),
        }
    }
}
