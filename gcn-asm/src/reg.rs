use core::fmt;

/// Architectural register referenced by an operand.
///
/// Scalar and vector general-purpose registers carry their index; the
/// remaining variants name special registers. The emulator resolves
/// `VccLo`/`VccHi`/`ExecLo` against the full 64-bit register depending on
/// the access width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    /// Scalar general-purpose register `s[i]`.
    S(u8),
    /// Vector general-purpose register `v[i]`, one 32-bit slot per lane.
    V(u8),
    /// Scalar condition code, a single bit.
    Scc,
    /// Vector condition code, a 64-bit lane mask.
    Vcc,
    /// Low half of VCC.
    VccLo,
    /// High half of VCC.
    VccHi,
    /// Execution mask, a 64-bit lane mask.
    Exec,
    /// Low half of EXEC.
    ExecLo,
    /// Memory descriptor register.
    M0,
    /// Program counter.
    Pc,
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::S(i) => write!(f, "s{i}"),
            Reg::V(i) => write!(f, "v{i}"),
            Reg::Scc => f.write_str("scc"),
            Reg::Vcc => f.write_str("vcc"),
            Reg::VccLo => f.write_str("vcc_lo"),
            Reg::VccHi => f.write_str("vcc_hi"),
            Reg::Exec => f.write_str("exec"),
            Reg::ExecLo => f.write_str("exec_lo"),
            Reg::M0 => f.write_str("m0"),
            Reg::Pc => f.write_str("pc"),
        }
    }
}
