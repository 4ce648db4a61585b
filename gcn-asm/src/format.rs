/// Instruction encoding families of the GCN3 ISA.
///
/// The family decides which operand slots of an [`Inst`](crate::Inst) are
/// populated and how the opcode number is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Format {
    /// Scalar, one source operand.
    Sop1,
    /// Scalar, two source operands.
    Sop2,
    /// Scalar compare, result goes to SCC.
    Sopc,
    /// Scalar with a 16-bit inline immediate.
    Sopk,
    /// Scalar program flow: branches, waits, no-ops.
    Sopp,
    /// Scalar memory loads.
    Smem,
    /// Vector, one source operand.
    Vop1,
    /// Vector, two source operands.
    Vop2,
    /// Vector three-address form.
    #[strum(serialize = "VOP3a")]
    Vop3a,
    /// Vector three-address form with a scalar carry destination.
    #[strum(serialize = "VOP3b")]
    Vop3b,
    /// Vector compare, result is a 64-bit lane mask.
    Vopc,
    /// Flat (generic address space) per-lane memory access.
    Flat,
    /// Local data share access.
    Ds,
}
