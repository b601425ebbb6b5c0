//! VM parameters

/// Number of slots in the segment table.
pub const SEG_COUNT: usize = 8;

/// Default RAM size in KiB.
pub const RAM_DEFAULT_KIB: u16 = 16;

/// Largest addressable RAM: physical addresses are 16-bit.
pub const RAM_MAX_KIB: u16 = 64;

/// "No such pointer": uninitialized segment registers, and the value of
/// `IP` once the machine has halted.
pub const SENTINEL: u32 = 0xFFFF_FFFF;

/// Magic prefix of a VMX program image.
pub const VMX_MAGIC: &[u8; 5] = b"VMX25";

/// Magic prefix of a VMI snapshot.
pub const VMI_MAGIC: &[u8; 5] = b"VMI25";

/// Snapshot format version written by this implementation.
pub const VMI_VERSION: u8 = 1;

/// Upper bound on the parameter area: strings plus the argv table must fit
/// in a 16-bit segment.
pub const PARAM_AREA_MAX: u32 = 0xFFFF;
