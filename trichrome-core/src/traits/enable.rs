//! Column enable line trait

/// Column select lines of the matrix
///
/// Exactly one column may be powered at any instant while scanning; a
/// second active line shows up as ghosting between columns.
pub trait EnableLines {
    /// Power exactly `column` and de-power every other column
    fn select_column(&mut self, column: usize);

    /// De-power every column
    fn all_off(&mut self);

    /// Toggle the heartbeat strobe (diagnostic only)
    fn toggle_strobe(&mut self);

    /// Switch the supply of the driver chips
    fn power_drivers(&mut self, on: bool);
}
