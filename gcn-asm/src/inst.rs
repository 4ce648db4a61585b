use crate::{Format, Operand, SdwaSelect};

/// A decoded GCN3 instruction.
///
/// Produced by a decoder and consumed by the emulator. Only the operand
/// slots meaningful for the instruction's [`Format`] are populated; the
/// emulator panics when a handler reaches for a slot the decoder left
/// empty, since that is a decoder bug rather than a runtime condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Inst {
    /// Encoding family.
    pub format: Format,
    /// Opcode number within the family.
    pub opcode: u16,
    /// Mnemonic, e.g. `v_add_f32`. The emulator keys the VOP3a abs/neg
    /// pre-processing off the type suffix of this name.
    pub name: String,
    /// Encoded size in bytes: 4, or 8 with a trailing literal or SDWA word.
    pub byte_size: u8,

    /// First source operand.
    pub src0: Option<Operand>,
    /// Second source operand.
    pub src1: Option<Operand>,
    /// Third source operand (VOP3 forms).
    pub src2: Option<Operand>,
    /// Destination operand.
    pub dst: Option<Operand>,
    /// Scalar carry/borrow destination (VOP3b).
    pub sdst: Option<Operand>,
    /// Per-lane address operand (FLAT, DS).
    pub addr: Option<Operand>,
    /// Data operand (memory stores, SMEM destination).
    pub data: Option<Operand>,
    /// Second data operand (DS write2 forms).
    pub data1: Option<Operand>,
    /// Base address operand (SMEM).
    pub base: Option<Operand>,
    /// Offset operand (SMEM).
    pub offset: Option<Operand>,
    /// 16-bit signed immediate operand (SOPK, SOPP).
    pub simm16: Option<Operand>,

    /// First immediate offset of DS instructions.
    pub offset0: u32,
    /// Second immediate offset of DS instructions.
    pub offset1: u32,

    /// Absolute-value modifier mask over Src0..Src2 (VOP3a).
    pub abs: u8,
    /// Negation modifier mask over Src0..Src2 (VOP3a).
    pub neg: u8,
    /// Output modifier (VOP3a); non-zero values are unsupported.
    pub omod: u8,

    /// Whether the SDWA word is present.
    pub is_sdwa: bool,
    /// Sub-dword selection for Src0.
    pub src0_sel: SdwaSelect,
    /// Sub-dword selection for Src1.
    pub src1_sel: SdwaSelect,
    /// Sub-dword selection for the destination.
    pub dst_sel: SdwaSelect,
}

impl Inst {
    /// A bare instruction of the given family and opcode; every operand slot
    /// starts empty and every modifier at its neutral value.
    pub fn new(format: Format, opcode: u16) -> Self {
        Inst {
            format,
            opcode,
            name: String::new(),
            byte_size: 4,
            src0: None,
            src1: None,
            src2: None,
            dst: None,
            sdst: None,
            addr: None,
            data: None,
            data1: None,
            base: None,
            offset: None,
            simm16: None,
            offset0: 0,
            offset1: 0,
            abs: 0,
            neg: 0,
            omod: 0,
            is_sdwa: false,
            src0_sel: SdwaSelect::default(),
            src1_sel: SdwaSelect::default(),
            dst_sel: SdwaSelect::default(),
        }
    }

    /// Same as [`Inst::new`] with the mnemonic attached.
    pub fn named(format: Format, opcode: u16, name: &str) -> Self {
        let mut inst = Self::new(format, opcode);
        inst.name = name.to_string();
        inst
    }
}
