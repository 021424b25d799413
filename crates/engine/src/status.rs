use api_types::payment::StatusEntry;

/// Status label printed on a receipt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiptStatus {
    Incomplete,
    Complete,
    Unrecognized,
}

impl ReceiptStatus {
    /// Any `incomplete` entry wins, then any `complete` entry; an empty or
    /// unknown trail is unrecognized. States compare exactly.
    pub fn derive(entries: &[StatusEntry]) -> Self {
        let has = |state: &str| {
            entries
                .iter()
                .any(|entry| entry.state == state)
        };

        if has("incomplete") {
            Self::Incomplete
        } else if has("complete") {
            Self::Complete
        } else {
            Self::Unrecognized
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Incomplete => "INCOMPLETE",
            Self::Complete => "COMPLETE",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(states: &[&str]) -> Vec<StatusEntry> {
        states
            .iter()
            .map(|state| StatusEntry {
                state: state.to_string(),
            })
            .collect()
    }

    #[test]
    fn incomplete_wins_regardless_of_position() {
        for states in [
            vec!["complete", "incomplete"],
            vec!["incomplete", "complete"],
            vec!["pending", "complete", "incomplete", "complete"],
        ] {
            assert_eq!(
                ReceiptStatus::derive(&entries(&states)),
                ReceiptStatus::Incomplete
            );
        }
    }

    #[test]
    fn complete_when_no_incomplete_entry() {
        assert_eq!(
            ReceiptStatus::derive(&entries(&["complete"])).label(),
            "COMPLETE"
        );
        assert_eq!(
            ReceiptStatus::derive(&entries(&["pending", "complete"])),
            ReceiptStatus::Complete
        );
    }

    #[test]
    fn states_compare_exactly() {
        assert_eq!(
            ReceiptStatus::derive(&entries(&["complete", "INCOMPLETE"])),
            ReceiptStatus::Complete
        );
        assert_eq!(
            ReceiptStatus::derive(&entries(&["Complete", " complete"])),
            ReceiptStatus::Unrecognized
        );
    }

    #[test]
    fn empty_or_unknown_is_unrecognized() {
        assert_eq!(ReceiptStatus::derive(&[]).label(), "UNRECOGNIZED");
        assert_eq!(
            ReceiptStatus::derive(&entries(&["pending", ""])),
            ReceiptStatus::Unrecognized
        );
    }
}
