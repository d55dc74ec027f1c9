//! Module interfaces
//!
//! Every control module in `gnc_exec` implements `State`, so that the
//! executable (and any controller which nests another) can initialise and
//! cycle it without knowing its internals.

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The persistent state of a control module.
pub trait State {
    /// Data needed to initialise the module, usually the name of its
    /// parameter file.
    type InitData;
    /// Error raised by `init`.
    type InitError;

    /// Sensed and commanded data consumed each cycle.
    type InputData;
    /// Demands produced each cycle.
    type OutputData;
    /// Diagnostics produced alongside the demands.
    type StatusReport;
    /// Error raised by `proc`.
    type ProcError;

    /// Initialise the module, replacing any existing state.
    ///
    /// # Outputs
    /// - On success `Ok(())`.
    /// - On error an `InitError` instance, in which case the module is left
    ///   as it was.
    fn init(&mut self, init_data: Self::InitData)
        -> Result<(), Self::InitError>;

    /// Run one control cycle.
    ///
    /// # Outputs
    /// - On success a tuple of the output data and status report.
    /// - On error a `ProcError` instance.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
