/// Column-name and cell-value constants for the attendance ledger.
/// Single source of truth - exported to Python via PyO3.

// ── Roster columns ──────────────────────────────────────────────────────────
pub mod roster {
    pub const ROLL_NO: &str = "Roll_No";
    pub const NAME: &str = "Name";
    pub const TOTAL_PRESENT: &str = "Total_Present";
    pub const PERCENTAGE: &str = "Percentage";

    pub const IDENTITY: [&str; 2] = [ROLL_NO, NAME];
    pub const DERIVED: [&str; 2] = [TOTAL_PRESENT, PERCENTAGE];

    /// Every column that is not a date column.
    pub const FIXED: [&str; 4] = [ROLL_NO, NAME, TOTAL_PRESENT, PERCENTAGE];

    /// Columns whose numeric-looking text is written back as numbers.
    pub const NUMERIC: [&str; 3] = [ROLL_NO, TOTAL_PRESENT, PERCENTAGE];
}

// ── Presence columns ────────────────────────────────────────────────────────
pub mod presence {
    pub const ROLL_NO: &str = super::roster::ROLL_NO;
}

// ── Status values ───────────────────────────────────────────────────────────
pub mod status {
    pub const PRESENT: &str = "P";
    pub const ABSENT: &str = "A";
    pub const UNRECORDED: &str = "";
}
