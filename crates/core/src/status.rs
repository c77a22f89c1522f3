//! Status and kind enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table. The string label is what appears in
//! JSON (milestone arrays, API payloads) and in the lookup table's `name`.

/// Lookup ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_lookup_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant, in seed order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database lookup ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Resolve a database lookup ID back into the enum.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// The lowercase label used in JSON and in the lookup table.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            /// Parse a label produced by [`Self::as_str`].
            pub fn parse(label: &str) -> Option<Self> {
                match label {
                    $( $label => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_lookup_enum! {
    /// Project lifecycle status.
    ProjectStatus {
        Open = 1 => "open",
        InProgress = 2 => "in_progress",
        Completed = 3 => "completed",
        Cancelled = 4 => "cancelled",
    }
}

define_lookup_enum! {
    /// Proposal (bid) status.
    ProposalStatus {
        Pending = 1 => "pending",
        Accepted = 2 => "accepted",
        Rejected = 3 => "rejected",
        Withdrawn = 4 => "withdrawn",
    }
}

define_lookup_enum! {
    /// Contract lifecycle status.
    ContractStatus {
        Active = 1 => "active",
        Completed = 2 => "completed",
        Disputed = 3 => "disputed",
        Cancelled = 4 => "cancelled",
    }
}

define_lookup_enum! {
    /// Milestone workflow status. Milestones live inside the contract row,
    /// so this one is serialized by label rather than by ID.
    MilestoneStatus {
        Pending = 1 => "pending",
        InProgress = 2 => "in_progress",
        Submitted = 3 => "submitted",
        Approved = 4 => "approved",
        RevisionRequested = 5 => "revision_requested",
        Paid = 6 => "paid",
    }
}

define_lookup_enum! {
    /// Dispute workflow status.
    DisputeStatus {
        Open = 1 => "open",
        UnderReview = 2 => "under_review",
        Resolved = 3 => "resolved",
        Rejected = 4 => "rejected",
    }
}

define_lookup_enum! {
    /// Wallet transaction kind. The kind implies the direction of `amount`.
    TransactionType {
        Deposit = 1 => "deposit",
        Withdrawal = 2 => "withdrawal",
        Payment = 3 => "payment",
        Earning = 4 => "earning",
        Refund = 5 => "refund",
    }
}

define_lookup_enum! {
    /// Wallet transaction settlement status.
    TransactionStatus {
        Pending = 1 => "pending",
        Completed = 2 => "completed",
        Failed = 3 => "failed",
        Cancelled = 4 => "cancelled",
    }
}

define_lookup_enum! {
    /// Job posting status.
    JobStatus {
        Open = 1 => "open",
        Closed = 2 => "closed",
    }
}

define_lookup_enum! {
    /// How a project's budget is billed.
    BudgetType {
        Fixed = 1 => "fixed",
        Hourly = 2 => "hourly",
    }
}

define_lookup_enum! {
    /// Freelancer's estimate attached to a proposal.
    EstimatedDuration {
        LessThanWeek = 1 => "less_than_week",
        OneToTwoWeeks = 2 => "one_to_two_weeks",
        TwoToFourWeeks = 3 => "two_to_four_weeks",
        OneToThreeMonths = 4 => "one_to_three_months",
        MoreThanThreeMonths = 5 => "more_than_three_months",
    }
}
