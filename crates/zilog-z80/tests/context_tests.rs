//! Export/import of the CPU context: a restored core continues exactly as
//! the original would have.

use std::cell::Cell;
use std::rc::Rc;

use emu_core::{Cpu, LineState, SimpleBus};
use zilog_z80::{
    CONTEXT_SIZE, ContextError, DaisyChain, DaisyDevice, INT_IEO, INT_REQ, Z80, Z80Context,
};

/// A busy program touching memory, both register banks, the stack and
/// the flags.
#[rustfmt::skip]
const PROGRAM: &[u8] = &[
    0x31, 0x00, 0xF0,       // LD SP, 0xF000
    0x21, 0x00, 0x40,       // LD HL, 0x4000
    0x06, 0x20,             // loop: LD B, 0x20
    0x34,                   // inner: INC (HL)
    0x86,                   // ADD A, (HL)
    0xF5,                   // PUSH AF
    0xD1,                   // POP DE
    0x08,                   // EX AF, AF'
    0xD9,                   // EXX
    0x23,                   // INC HL
    0xD9,                   // EXX
    0x3F,                   // CCF
    0xDD, 0x23,             // INC IX
    0xCB, 0x46,             // BIT 0, (HL)
    0x23,                   // INC HL
    0x10, 0xF0,             // DJNZ inner
    0x18, 0xEC,             // JR loop
];

fn copy_memory(from: &SimpleBus) -> SimpleBus {
    let mut bus = SimpleBus::new();
    for addr in 0..=0xFFFF {
        bus.poke(addr, from.peek(addr));
    }
    bus
}

#[test]
fn test_restored_core_continues_identically() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, PROGRAM);
    let mut cpu = Z80::new();

    for cut in [1u32, 37, 500, 9_999] {
        cpu.execute(&mut bus, cut);
        let image = cpu.export_context();
        assert_eq!(image.len(), CONTEXT_SIZE);

        let mut twin = Z80::new();
        twin.import_context(&image).expect("valid image");
        let mut twin_bus = copy_memory(&bus);
        assert_eq!(twin.context(), cpu.context());

        for slice in [3, 250, 4_000] {
            assert_eq!(cpu.execute(&mut bus, slice), twin.execute(&mut twin_bus, slice));
            assert_eq!(cpu.context(), twin.context(), "diverged after cut at {cut}");
        }
        for addr in (0x4000..0x4400).chain(0xEF00..0xF000) {
            assert_eq!(bus.peek(addr), twin_bus.peek(addr), "memory at {addr:#06X}");
        }
    }
}

#[test]
fn test_ei_shadow_survives_restore() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[0xFB, 0x00]); // EI; NOP
    let mut cpu = Z80::new();
    cpu.registers_mut().im = 1;
    cpu.registers_mut().sp = 0x8000;
    cpu.execute(&mut bus, 1);

    let ctx = cpu.context();
    assert!(ctx.ei_delay);

    let mut twin = Z80::new();
    twin.set_context(&ctx).expect("valid context");
    twin.set_irq_line(LineState::Assert);
    assert_eq!(twin.execute(&mut bus, 1), 4, "NOP runs before the interrupt");
    assert_eq!(twin.execute(&mut bus, 1), 13);
}

#[test]
fn test_q_survives_restore() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[0xFE, 0x28, 0x37]); // CP 0x28; SCF
    let mut cpu = Z80::new();
    cpu.execute(&mut bus, 1);

    let mut twin = Z80::new();
    twin.import_context(&cpu.export_context()).expect("valid image");
    twin.execute(&mut bus, 1);
    cpu.execute(&mut bus, 1);
    assert_eq!(twin.registers().f, cpu.registers().f);
}

#[test]
fn test_pending_nmi_survives_restore() {
    let mut bus = SimpleBus::new();
    let mut cpu = Z80::new();
    cpu.registers_mut().sp = 0x8000;
    cpu.set_nmi_line(LineState::Assert);

    let mut twin = Z80::new();
    twin.import_context(&cpu.export_context()).expect("valid image");
    assert_eq!(twin.nmi_line(), LineState::Assert);
    assert_eq!(twin.execute(&mut bus, 1), 11);
    assert_eq!(twin.registers().pc, 0x0066);
}

struct Device(Rc<Cell<u8>>);

impl DaisyDevice for Device {
    fn reset(&mut self) {
        self.0.set(0);
    }
    fn irq_state(&self) -> u8 {
        self.0.get()
    }
    fn interrupt_entry(&mut self) -> u8 {
        self.0.set(INT_IEO);
        0x40
    }
    fn interrupt_reti(&mut self) {
        self.0.set(0);
    }
}

fn chained_cpu() -> (Z80, Vec<Rc<Cell<u8>>>) {
    let cells: Vec<_> = (0..2).map(|_| Rc::new(Cell::new(0))).collect();
    let devices = cells
        .iter()
        .map(|c| Box::new(Device(Rc::clone(c))) as Box<dyn DaisyDevice>)
        .collect();
    let mut cpu = Z80::new();
    cpu.reset_with(Some(DaisyChain::new(devices).expect("two devices")));
    (cpu, cells)
}

#[test]
fn test_daisy_state_round_trip() {
    let mut bus = SimpleBus::new();
    let (mut cpu, cells) = chained_cpu();
    {
        let regs = cpu.registers_mut();
        regs.im = 2;
        regs.iff1 = true;
        regs.sp = 0x8000;
    }
    cells[1].set(INT_REQ);
    cpu.set_irq_line(LineState::Assert);
    cpu.execute(&mut bus, 1);

    let ctx = cpu.context();
    assert_eq!(ctx.daisy_states[1], INT_IEO);
    assert_eq!(ctx.daisy_service, Some(1));
    assert_eq!(ctx.daisy_request, None);

    let (mut twin, _) = chained_cpu();
    twin.set_context(&ctx).expect("chain has two devices");
    let chain = twin.daisy_chain().expect("attached");
    assert_eq!(chain.service(), Some(1));
    assert_eq!(chain.states()[1], INT_IEO);
    assert_eq!(twin.context(), ctx);
}

#[test]
fn test_rejects_index_beyond_attached_chain() {
    let (cpu, _) = chained_cpu();
    let mut ctx = cpu.context();
    ctx.daisy_service = Some(3);

    let (mut twin, _) = chained_cpu();
    assert_eq!(
        twin.set_context(&ctx),
        Err(ContextError::InvalidDaisyIndex { index: 3, devices: 2 })
    );
}

#[test]
fn test_import_rejects_malformed_images() {
    let mut cpu = Z80::new();
    assert_eq!(
        cpu.import_context(&[0; 12]),
        Err(ContextError::WrongSize { expected: CONTEXT_SIZE, actual: 12 })
    );

    let mut image = cpu.export_context();
    image[30] = 5;
    assert_eq!(cpu.import_context(&image), Err(ContextError::InvalidInterruptMode(5)));

    let mut image = cpu.export_context();
    image[39] = 9;
    assert!(matches!(
        Z80Context::from_bytes(&image),
        Err(ContextError::InvalidDaisyIndex { index: 9, .. })
    ));
}
