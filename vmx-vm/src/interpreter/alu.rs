//! Arithmetic, logic and the condition codes.

use vmx_asm::regs::{AC, CC};
use vmx_asm::Operand;

use super::Interpreter;
use crate::error::Fault;

/// N flag position in `CC`.
const FLAG_N: u32 = 1 << 31;

/// Z flag position in `CC`.
const FLAG_Z: u32 = 1 << 30;

/// Floored signed division: the quotient rounds toward negative infinity
/// and the remainder takes the divisor's sign (or is zero).
pub(crate) fn floored_div(a: i32, b: i32) -> (i32, i32) {
    let mut q = a.wrapping_div(b);
    let mut r = a.wrapping_rem(b);
    if r != 0 && (r ^ b) < 0 {
        q = q.wrapping_sub(1);
        r = r.wrapping_add(b);
    }
    (q, r)
}

impl<C> Interpreter<C> {
    /// Derive N and Z from a 32-bit result. `CC` holds nothing else.
    pub(crate) fn set_nz(&mut self, result: u32) {
        let n = if result & 0x8000_0000 != 0 { FLAG_N } else { 0 };
        let z = if result == 0 { FLAG_Z } else { 0 };
        self.registers[CC] = n | z;
    }

    pub(crate) fn flag_n(&self) -> bool {
        self.registers[CC] & FLAG_N != 0
    }

    pub(crate) fn flag_z(&self) -> bool {
        self.registers[CC] & FLAG_Z != 0
    }

    /// `A = f(A, B)`, setting N and Z from the result.
    pub(crate) fn alu_binary(
        &mut self,
        a: &Operand,
        b: &Operand,
        f: fn(u32, u32) -> u32,
    ) -> Result<(), Fault> {
        let lhs = self.read_operand(a)?;
        let rhs = self.read_operand(b)?;
        let result = f(lhs, rhs);
        self.write_operand(a, result)?;
        self.set_nz(result);
        Ok(())
    }

    /// `A = !A`, setting N and Z.
    pub(crate) fn alu_not(&mut self, a: &Operand) -> Result<(), Fault> {
        let result = !self.read_operand(a)?;
        self.write_operand(a, result)?;
        self.set_nz(result);
        Ok(())
    }

    /// Flags from `A - B` without writing the difference.
    pub(crate) fn alu_cmp(&mut self, a: &Operand, b: &Operand) -> Result<(), Fault> {
        let lhs = self.read_operand(a)?;
        let rhs = self.read_operand(b)?;
        self.set_nz(lhs.wrapping_sub(rhs));
        Ok(())
    }

    /// Signed floored division: quotient to A, remainder to `AC`, flags
    /// from the quotient. A zero divisor is fatal.
    pub(crate) fn alu_div(&mut self, a: &Operand, b: &Operand) -> Result<(), Fault> {
        let lhs = self.read_operand(a)?;
        let rhs = self.read_operand(b)?;
        if rhs == 0 {
            return Err(Fault::DivisionByZero);
        }
        let (q, r) = floored_div(lhs as i32, rhs as i32);
        self.write_operand(a, q as u32)?;
        self.registers[AC] = r as u32;
        self.set_nz(q as u32);
        Ok(())
    }

    /// `A = uniform [0, B)`, zero when B is zero; flags from the result.
    pub(crate) fn alu_rnd(&mut self, a: &Operand, b: &Operand) -> Result<(), Fault> {
        use rand::Rng;

        let limit = self.read_operand(b)?;
        let value = if limit == 0 {
            0
        } else {
            self.rng().gen_range(0..limit)
        };
        self.write_operand(a, value)?;
        self.set_nz(value);
        Ok(())
    }

    /// The machine RNG, seeded from the wall clock on first use.
    fn rng(&mut self) -> &mut rand::rngs::StdRng {
        use rand::SeedableRng;
        use std::time::{SystemTime, UNIX_EPOCH};

        self.rng.get_or_insert_with(|| {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default();
            rand::rngs::StdRng::seed_from_u64(nanos)
        })
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;
    use vmx_asm::op;

    use super::floored_div;
    use crate::prelude::*;

    #[test]
    fn floored_division_rounds_down() {
        assert_eq!(floored_div(7, 2), (3, 1));
        assert_eq!(floored_div(-7, 2), (-4, 1));
        assert_eq!(floored_div(7, -2), (-4, -1));
        assert_eq!(floored_div(-7, -2), (3, -1));
        assert_eq!(floored_div(6, 3), (2, 0));
        assert_eq!(floored_div(i32::MIN, -1), (i32::MIN, 0));
    }

    #[quickcheck]
    fn floored_division_identity(a: i32, b: i32) -> bool {
        if b == 0 || (a == i32::MIN && b == -1) {
            return true;
        }
        let (q, r) = floored_div(a, b);
        a == q.wrapping_mul(b).wrapping_add(r) && (r == 0 || (r < 0) == (b < 0))
    }

    #[test]
    fn condition_codes_hold_only_n_and_z() {
        let mut vm = Interpreter::<ScriptedConsole>::default();
        vm.set_nz(0);
        assert_eq!(vm.registers[regs::CC], 0x4000_0000);
        vm.set_nz(0x8000_0000);
        assert_eq!(vm.registers[regs::CC], 0x8000_0000);
        vm.set_nz(1);
        assert_eq!(vm.registers[regs::CC], 0);
    }

    #[test]
    fn shift_counts_are_masked() {
        let mut vm = Interpreter::<ScriptedConsole>::default();
        vm.registers[regs::EAX] = 1;
        vm.alu_binary(&op::reg(regs::EAX), &op::imm(33), |a, b| a << (b & 31))
            .unwrap();
        assert_eq!(vm.registers[regs::EAX], 2);
    }

    #[test]
    fn rnd_is_reproducible_with_seed() {
        let mut vm1 = Interpreter::<ScriptedConsole>::default().with_rng_seed(7);
        let mut vm2 = Interpreter::<ScriptedConsole>::default().with_rng_seed(7);
        vm1.alu_rnd(&op::reg(regs::EAX), &op::imm(1000)).unwrap();
        vm2.alu_rnd(&op::reg(regs::EAX), &op::imm(1000)).unwrap();
        let v = vm1.registers[regs::EAX];
        assert_eq!(v, vm2.registers[regs::EAX]);
        assert!(v < 1000);
    }

    #[test]
    fn rnd_zero_limit_yields_zero() {
        let mut vm = Interpreter::<ScriptedConsole>::default().with_rng_seed(7);
        vm.registers[regs::EAX] = 9;
        vm.alu_rnd(&op::reg(regs::EAX), &op::imm(0)).unwrap();
        assert_eq!(vm.registers[regs::EAX], 0);
        assert!(vm.flag_z());
    }
}
