//! Interrupt acceptance: IM 0/1/2, NMI edges, line hold semantics, the EI
//! shadow and wake-up from HALT.

use emu_core::{Cpu, LineState, SimpleBus};
use zilog_z80::{PF, Z80, Z80Config};

/// CPU at `pc` with SP at 0x8000, interrupts enabled in mode `im`.
fn enabled_cpu(pc: u16, im: u8) -> Z80 {
    let mut cpu = Z80::with_config(Z80Config { loop_acceleration: false });
    let regs = cpu.registers_mut();
    regs.pc = pc;
    regs.sp = 0x8000;
    regs.im = im;
    regs.iff1 = true;
    regs.iff2 = true;
    cpu
}

fn stacked(bus: &SimpleBus, sp: u16) -> u16 {
    u16::from_le_bytes([bus.peek(sp), bus.peek(sp.wrapping_add(1))])
}

#[test]
fn test_im1_jumps_to_0038() {
    let mut bus = SimpleBus::new();
    let mut cpu = enabled_cpu(0x1234, 1);
    cpu.set_irq_line(LineState::Assert);

    assert_eq!(cpu.execute(&mut bus, 1), 13);

    let regs = cpu.registers();
    assert_eq!(regs.pc, 0x0038);
    assert_eq!(regs.sp, 0x7FFE);
    assert_eq!(stacked(&bus, 0x7FFE), 0x1234);
    assert!(!regs.iff1 && !regs.iff2);
    assert_eq!(regs.wz, 0x0038);
    assert_eq!(regs.r, 1, "acknowledge is an M1 cycle");
}

#[test]
fn test_assert_stays_active_after_acknowledge() {
    let mut bus = SimpleBus::new();
    let mut cpu = enabled_cpu(0x1000, 1);
    cpu.set_irq_line(LineState::Assert);
    cpu.execute(&mut bus, 1);
    assert_eq!(cpu.irq_line(), LineState::Assert);
}

#[test]
fn test_hold_clears_on_acknowledge() {
    let mut bus = SimpleBus::new();
    let mut cpu = enabled_cpu(0x1000, 1);
    cpu.set_irq_line(LineState::Hold);
    cpu.execute(&mut bus, 1);
    assert_eq!(cpu.irq_line(), LineState::Clear);
    assert_eq!(cpu.registers().pc, 0x0038);
}

#[test]
fn test_im2_reads_vector_table() {
    let mut bus = SimpleBus::new();
    bus.set_irq_data(0x10);
    bus.load(0x8010, &[0x00, 0x90]);

    let mut cpu = enabled_cpu(0x4000, 2);
    cpu.registers_mut().i = 0x80;
    cpu.registers_mut().sp = 0xF000;
    cpu.set_irq_line(LineState::Assert);

    assert_eq!(cpu.execute(&mut bus, 1), 19);
    assert_eq!(cpu.registers().pc, 0x9000);
    assert_eq!(stacked(&bus, 0xEFFE), 0x4000);
}

#[test]
fn test_im0_idle_bus_is_rst_38() {
    let mut bus = SimpleBus::new();
    let mut cpu = enabled_cpu(0x2000, 0);
    cpu.set_irq_line(LineState::Assert);

    assert_eq!(cpu.execute(&mut bus, 1), 13);
    assert_eq!(cpu.registers().pc, 0x0038);
    assert_eq!(stacked(&bus, 0x7FFE), 0x2000);
}

#[test]
fn test_im0_rst_from_data_bus() {
    let mut bus = SimpleBus::new();
    bus.set_irq_data(0xCF); // RST 08
    let mut cpu = enabled_cpu(0x2000, 0);
    cpu.set_irq_line(LineState::Assert);

    cpu.execute(&mut bus, 1);
    assert_eq!(cpu.registers().pc, 0x0008);
}

#[test]
fn test_im0_call() {
    let mut bus = SimpleBus::new();
    bus.set_irq_data(0x00CD_1234);
    let mut cpu = enabled_cpu(0x2000, 0);
    cpu.set_irq_line(LineState::Assert);

    assert_eq!(cpu.execute(&mut bus, 1), 19);
    assert_eq!(cpu.registers().pc, 0x1234);
    assert_eq!(stacked(&bus, 0x7FFE), 0x2000);
}

#[test]
fn test_im0_jp_pushes_nothing() {
    let mut bus = SimpleBus::new();
    bus.set_irq_data(0x00C3_3000);
    let mut cpu = enabled_cpu(0x2000, 0);
    cpu.set_irq_line(LineState::Assert);

    assert_eq!(cpu.execute(&mut bus, 1), 12);
    assert_eq!(cpu.registers().pc, 0x3000);
    assert_eq!(cpu.registers().sp, 0x8000);
}

#[test]
fn test_disabled_interrupts_are_ignored() {
    let mut bus = SimpleBus::new();
    let mut cpu = enabled_cpu(0x0000, 1);
    cpu.registers_mut().iff1 = false;
    cpu.set_irq_line(LineState::Assert);

    assert_eq!(cpu.execute(&mut bus, 1), 4); // NOP
    assert_eq!(cpu.registers().pc, 0x0001);
}

#[test]
fn test_ei_delays_acceptance_by_one_instruction() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[0xFB, 0x00, 0x00]); // EI; NOP; NOP

    let mut cpu = enabled_cpu(0x0000, 1);
    cpu.registers_mut().iff1 = false;
    cpu.registers_mut().iff2 = false;
    cpu.set_irq_line(LineState::Assert);

    assert_eq!(cpu.execute(&mut bus, 1), 4); // EI
    assert_eq!(cpu.execute(&mut bus, 1), 4); // NOP runs in the EI shadow
    assert_eq!(cpu.execute(&mut bus, 1), 13);
    assert_eq!(cpu.registers().pc, 0x0038);
    assert_eq!(stacked(&bus, 0x7FFE), 0x0002);
}

#[test]
fn test_ei_shadow_also_delays_nmi() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[0xFB, 0x00]);

    let mut cpu = enabled_cpu(0x0000, 1);
    cpu.execute(&mut bus, 1);
    cpu.set_nmi_line(LineState::Assert);

    assert_eq!(cpu.execute(&mut bus, 1), 4);
    assert_eq!(cpu.execute(&mut bus, 1), 11);
    assert_eq!(cpu.registers().pc, 0x0066);
}

#[test]
fn test_nmi_on_rising_edge_only() {
    let mut bus = SimpleBus::new();
    let mut cpu = enabled_cpu(0x1000, 1);
    cpu.registers_mut().iff2 = false;
    cpu.registers_mut().iff1 = true;

    cpu.set_nmi_line(LineState::Assert);
    assert_eq!(cpu.execute(&mut bus, 1), 11);
    let regs = cpu.registers();
    assert_eq!(regs.pc, 0x0066);
    assert!(!regs.iff1);
    assert_eq!(stacked(&bus, 0x7FFE), 0x1000);

    // Still asserted: no new edge, so only NOPs run
    cpu.set_nmi_line(LineState::Assert);
    assert_eq!(cpu.execute(&mut bus, 1), 4);
    assert_eq!(cpu.registers().pc, 0x0067);

    cpu.set_nmi_line(LineState::Clear);
    cpu.set_nmi_line(LineState::Assert);
    assert_eq!(cpu.execute(&mut bus, 1), 11);
    assert_eq!(cpu.registers().pc, 0x0066);
}

#[test]
fn test_nmi_ignores_iff1() {
    let mut bus = SimpleBus::new();
    let mut cpu = enabled_cpu(0x1000, 1);
    cpu.registers_mut().iff1 = false;
    cpu.set_nmi_line(LineState::Hold);

    assert_eq!(cpu.execute(&mut bus, 1), 11);
    assert_eq!(cpu.registers().pc, 0x0066);
    assert_eq!(cpu.nmi_line(), LineState::Clear);
}

#[test]
fn test_nmi_beats_irq() {
    let mut bus = SimpleBus::new();
    let mut cpu = enabled_cpu(0x1000, 1);
    cpu.set_irq_line(LineState::Assert);
    cpu.set_nmi_line(LineState::Assert);

    cpu.execute(&mut bus, 1);
    assert_eq!(cpu.registers().pc, 0x0066);
    // IFF1 is now clear, so the IRQ waits for RETN
    cpu.execute(&mut bus, 1);
    assert_eq!(cpu.registers().pc, 0x0067);
}

#[test]
fn test_retn_restores_iff1() {
    let mut bus = SimpleBus::new();
    bus.load(0x0066, &[0xED, 0x45]); // RETN

    let mut cpu = enabled_cpu(0x1000, 1);
    cpu.set_nmi_line(LineState::Assert);
    cpu.execute(&mut bus, 1);
    assert!(!cpu.registers().iff1);

    assert_eq!(cpu.execute(&mut bus, 1), 14);
    let regs = cpu.registers();
    assert_eq!(regs.pc, 0x1000);
    assert!(regs.iff1);
    assert_eq!(regs.sp, 0x8000);
}

#[test]
fn test_interrupt_wakes_halt() {
    let mut bus = SimpleBus::new();
    bus.load(0x0100, &[0x76]); // HALT

    let mut cpu = enabled_cpu(0x0100, 1);
    assert_eq!(cpu.execute(&mut bus, 100), 100);
    assert!(cpu.is_halted());
    assert_eq!(cpu.registers().pc, 0x0100);

    cpu.set_irq_line(LineState::Hold);
    assert_eq!(cpu.execute(&mut bus, 1), 13);
    assert!(!cpu.is_halted());
    assert_eq!(cpu.registers().pc, 0x0038);
    assert_eq!(stacked(&bus, 0x7FFE), 0x0101, "returns past the HALT");
}

#[test]
fn test_halt_refresh_not_double_counted() {
    let mut bus = SimpleBus::new();
    bus.load(0x0100, &[0x76]);

    let mut cpu = enabled_cpu(0x0100, 1);
    cpu.execute(&mut bus, 4); // HALT itself: R = 1
    cpu.execute(&mut bus, 40); // ten idle M1 cycles
    assert_eq!(cpu.registers().r, 11);

    cpu.set_irq_line(LineState::Hold);
    cpu.execute(&mut bus, 1);
    assert_eq!(cpu.registers().r, 12);
}

#[test]
fn test_ld_a_i_then_irq_clears_pv() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[0xED, 0x57]); // LD A, I

    let mut cpu = enabled_cpu(0x0000, 1);
    cpu.execute(&mut bus, 1);
    assert_ne!(cpu.registers().f & PF, 0, "P/V copies IFF2");

    cpu.set_irq_line(LineState::Assert);
    cpu.execute(&mut bus, 1);
    assert_eq!(cpu.registers().pc, 0x0038);
    assert_eq!(cpu.registers().f & PF, 0);
}

#[test]
fn test_reset_clears_interrupt_state() {
    let mut bus = SimpleBus::new();
    let mut cpu = enabled_cpu(0x1234, 2);
    cpu.set_irq_line(LineState::Assert);
    cpu.set_nmi_line(LineState::Assert);
    cpu.execute(&mut bus, 1);

    cpu.reset();
    let regs = cpu.registers();
    assert_eq!(regs.pc, 0);
    assert_eq!(regs.im, 0);
    assert!(!regs.iff1 && !regs.iff2);
    assert_eq!(cpu.irq_line(), LineState::Clear);
    assert_eq!(cpu.nmi_line(), LineState::Clear);
    assert_eq!(regs.ix, 0xFFFF);
}
