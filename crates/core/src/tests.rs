// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use crate::bus::{FaultKind, SystemBus, UART_IRQ};
    use crate::peripherals::uart::UartDevice;
    use crate::svmem::{self, Disassembly, SvMemError};
    use crate::verify::verify_probe;
    use crate::{Bus, Peripheral, SimulationError};
    use aligncheck_config::{BoardProfile, UartSettings};
    use aligncheck_hal::{probe, Bounded, Heartbeat, MemoryMap, Uart, UartError, UartStatus};

    const UART_BASE: u64 = 0xC000_0000;

    #[test]
    fn test_bus_little_endian() {
        let mut bus = SystemBus::new();
        bus.write_u64(0x100, 0x1122_3344_5566_7788).unwrap();

        assert_eq!(bus.read_u8(0x100).unwrap(), 0x88);
        assert_eq!(bus.read_u16(0x100).unwrap(), 0x7788);
        assert_eq!(bus.read_u32(0x104).unwrap(), 0x1122_3344);
        assert_eq!(bus.read_u64(0x100).unwrap(), 0x1122_3344_5566_7788);
    }

    #[test]
    fn test_bus_unmapped_access() {
        let mut bus = SystemBus::new();
        assert!(matches!(
            bus.read_u8(0x2000_0000),
            Err(SimulationError::MemoryViolation(0x2000_0000))
        ));
        assert!(bus.write_u8(0x2000_0000, 1).is_err());
    }

    #[test]
    fn test_probe_on_default_board() {
        let mut bus = SystemBus::new();
        probe::run(&mut bus.window(0));

        // 20 stores and 2 readbacks, one bus cycle each
        assert_eq!(bus.cycles, 22);

        let report = verify_probe(&mut bus, 0);
        assert!(report.passed(), "{:?}", report.mismatches);
        assert_eq!(report.results.a, 850);
        assert_eq!(report.results.b, 125);
        assert_eq!(report.results.c, -850);
        assert_eq!(report.results.d, -125);
        assert!(report.region.starts_with("8877665544332211"));
        assert_eq!(bus.read_u16(0xFFFC).unwrap(), 0xFCAE);
        assert_eq!(bus.read_u16(0xFFFE).unwrap(), 0xFF83);
        // Verification reads the region back one byte per cycle
        assert_eq!(bus.cycles, 22 + probe::REGION_LEN as u64);
    }

    #[test]
    fn test_probe_twice_same_digest() {
        let mut bus = SystemBus::new();
        probe::run(&mut bus.window(0));
        let first = verify_probe(&mut bus, 0);
        probe::run(&mut bus.window(0));
        let second = verify_probe(&mut bus, 0);

        assert_eq!(first.digest, second.digest);
        assert_eq!(first.region, second.region);
    }

    #[test]
    fn test_probe_leaves_rest_of_memory() {
        let mut bus = SystemBus::new();
        bus.ram.fill(0x5A);
        probe::run(&mut bus.window(0));

        let start = probe::REGION_START;
        assert!(bus.ram.data[..start].iter().all(|&b| b == 0x5A));
    }

    #[test]
    fn test_verify_reports_corrupted_slot() {
        let mut bus = SystemBus::new();
        probe::run(&mut bus.window(0));
        bus.write_u8(0xFFE5, 0x00).unwrap();

        let report = verify_probe(&mut bus, 0);
        assert!(!report.passed());
        assert_eq!(report.mismatches.len(), 1);
        let m = &report.mismatches[0];
        assert_eq!(m.offset, 0xFFE4);
        assert_eq!(m.width, 4);
        assert_eq!(m.expected, 0xFFEE_DDCC);
        assert_eq!(m.actual, 0xFFEE_00CC);
    }

    #[test]
    fn test_probe_misaligned_base_faults() {
        let mut bus = SystemBus::new();
        probe::run(&mut bus.window(0x4));

        let report = verify_probe(&mut bus, 0x4);
        assert!(!report.passed());
        // Only the two 64-bit stores are misaligned at +4.
        let misaligned: Vec<_> = report
            .faults
            .iter()
            .filter(|f| f.kind == FaultKind::Misaligned)
            .collect();
        assert_eq!(misaligned.len(), 2);
        assert!(misaligned.iter().all(|f| f.width == 8 && f.write));
    }

    #[test]
    fn test_probe_unmapped_base_faults() {
        let mut bus = SystemBus::new();
        probe::run(&mut bus.window(0x10_0000));

        assert_eq!(bus.faults.len(), 22);
        assert!(bus.faults.iter().all(|f| f.kind == FaultKind::Unmapped));
        let report = verify_probe(&mut bus, 0x10_0000);
        assert_eq!(report.mismatches.len(), 20);
        assert_eq!(report.faults.len(), 22 + probe::REGION_LEN);
    }

    #[test]
    fn test_verify_records_readback_faults() {
        let mut bus = SystemBus::new();
        probe::run(&mut bus.window(0x2));
        let after_probe = bus.faults.len();

        // The region at +2 runs two bytes past the end of RAM.
        let report = verify_probe(&mut bus, 0x2);
        let readback: Vec<_> = report.faults[after_probe..].to_vec();
        assert_eq!(readback.len(), 2);
        assert!(readback
            .iter()
            .all(|f| f.kind == FaultKind::Unmapped && f.width == 1 && !f.write));
        assert_eq!(readback[0].addr, 0x1_0000);
        assert_eq!(readback[1].addr, 0x1_0001);
        assert!(!report.passed());
    }

    #[test]
    fn test_uart_device_status() {
        let dev = UartDevice::default();
        let status = dev.status();
        assert_eq!(status, UartStatus::TX_EMPTY | UartStatus::RX_EMPTY);
    }

    #[test]
    fn test_uart_device_overrun() {
        let mut dev = UartDevice::default();
        dev.write(0x08, b'a').unwrap();
        assert!(dev.status().contains(UartStatus::TX_FULL));
        dev.write(0x08, b'b').unwrap();
        assert_eq!(dev.overruns(), 1);

        dev.flush();
        assert_eq!(dev.transmitted(), b"a");
    }

    #[test]
    fn test_uart_device_drains_on_tick() {
        let mut dev = UartDevice::new(&UartSettings {
            tx_depth: 1,
            tx_drain_ticks: 3,
        });
        dev.write(0x08, b'z').unwrap();
        assert!(!dev.tick());
        assert!(!dev.tick());
        assert!(dev.transmitted().is_empty());
        dev.tick();
        assert_eq!(dev.transmitted(), b"z");
        assert!(dev.status().contains(UartStatus::TX_EMPTY));
    }

    #[test]
    fn test_uart_device_config_register() {
        let mut dev = UartDevice::default();
        dev.write(0x04, 0x3C).unwrap();
        assert_eq!(dev.read(0x04).unwrap(), 0x3C);
        assert_eq!(dev.config(), 0x3C);
    }

    #[test]
    fn test_driver_sends_through_bus() {
        let mut bus = SystemBus::new();
        Uart::new(bus.window(UART_BASE))
            .send_string("Hello, soft-core!\n")
            .unwrap();

        let dev = bus.uart_mut().unwrap();
        dev.flush();
        assert_eq!(dev.transmitted(), b"Hello, soft-core!\n");
        assert_eq!(dev.overruns(), 0);
        assert!(bus.faults.is_empty());
    }

    #[test]
    fn test_driver_bounded_send_times_out() {
        let mut bus = SystemBus::new();
        let mut uart = Uart::with_policy(bus.window(UART_BASE), Bounded::new(2));

        assert_eq!(uart.send(b'A'), Ok(()));
        assert_eq!(uart.send(b'B'), Err(UartError::Blocked { polls: 2 }));
        drop(uart);

        let dev = bus.uart_mut().unwrap();
        dev.flush();
        assert_eq!(dev.transmitted(), b"A");
    }

    #[test]
    fn test_driver_deeper_fifo() {
        let profile = BoardProfile {
            uart: UartSettings {
                tx_depth: 4,
                tx_drain_ticks: 100,
            },
            ..BoardProfile::default_board()
        };
        let mut bus = SystemBus::from_profile(&profile).unwrap();
        let mut uart = Uart::with_policy(bus.window(UART_BASE), Bounded::new(1));

        uart.send_string("abcd").unwrap();
        assert!(uart.is_tx_full());
        assert!(!uart.is_tx_empty());
        assert!(uart.send(b'e').is_err());
    }

    #[test]
    fn test_driver_receive_and_clear_irq() {
        let mut bus = SystemBus::new();
        bus.uart_mut().unwrap().inject_rx(b"hi");

        let mut uart = Uart::new(bus.window(UART_BASE));
        assert!(!uart.is_rx_empty());
        assert!(uart.status().contains(UartStatus::IRQ_PENDING));
        assert_eq!(uart.receive(), Ok(b'h'));
        assert_eq!(uart.receive(), Ok(b'i'));
        assert_eq!(uart.receive(), Err(UartError::Empty));

        uart.clear_irq();
        assert!(!uart.status().contains(UartStatus::IRQ_PENDING));
        drop(uart);

        assert_eq!(bus.pending_irqs, vec![UART_IRQ]);
    }

    #[test]
    fn test_from_profile_rejects_bad_layout() {
        let mut profile = BoardProfile::default_board();
        profile.heartbeat = 0xFFD0;
        assert!(matches!(
            SystemBus::from_profile(&profile),
            Err(SimulationError::Layout(_))
        ));
    }

    #[test]
    fn test_heartbeat_on_bus() {
        let map = MemoryMap::SOFTCORE;
        let mut bus = SystemBus::new();
        bus.ram.fill(0xEE);

        let mut heartbeat = Heartbeat::new(bus.window(map.heartbeat as u64));
        heartbeat.reset();
        for _ in 0..3 {
            heartbeat.beat();
        }
        drop(heartbeat);

        assert_eq!(bus.read_u8(map.heartbeat as u64).unwrap(), 3);
        assert_eq!(bus.read_u8(map.heartbeat as u64 + 1).unwrap(), 0xEE);
    }

    #[test]
    fn test_report_json() {
        let mut bus = SystemBus::new();
        probe::run(&mut bus.window(0));
        let json = verify_probe(&mut bus, 0).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["results"]["c"], -850);
        assert!(value["faults"].as_array().unwrap().is_empty());
    }

    const LISTING: &str = "\
firmware.elf:     file format elf32-littleriscv


Disassembly of section .text:

00000000 <_start>:
   0:\t00000513          \tli\ta0,0
   4:\t00a50533          \tadd\ta0,a0,a0
   8:\t0000006f          \tj\t8 <_start+0x8>
";

    #[test]
    fn test_svmem_byte_wide() {
        let text =
            svmem::render(&[0x13, 0x05, 0xFF], &Disassembly::new(), "mock_mem", 8).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "mock_mem.block_ram_inst.memory['h0000] = 8'h13;",
                "mock_mem.block_ram_inst.memory['h0001] = 8'h05;",
                "mock_mem.block_ram_inst.memory['h0002] = 8'hFF;",
            ]
        );
    }

    #[test]
    fn test_svmem_words_are_little_endian_and_padded() {
        let image = [0x13, 0x05, 0x00, 0x00, 0x33, 0x05, 0xA5];
        let text = svmem::render(&image, &Disassembly::new(), "rom", 32).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "rom.block_ram_inst.memory['h0000] = 32'h00000513;",
                "rom.block_ram_inst.memory['h0001] = 32'h00A50533;",
            ]
        );
    }

    #[test]
    fn test_svmem_wide_word() {
        let image = 0x1122_3344_5566_7788u64.to_le_bytes();
        let text = svmem::render(&image, &Disassembly::new(), "mock_mem", 64).unwrap();
        assert_eq!(
            text,
            "mock_mem.block_ram_inst.memory['h0000] = 64'h1122334455667788;\n"
        );
    }

    #[test]
    fn test_svmem_empty_image() {
        let text = svmem::render(&[], &Disassembly::new(), "mock_mem", 32).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_svmem_rejects_bad_width() {
        for width in [0, 12, 33] {
            assert!(matches!(
                svmem::render(&[0u8; 4], &Disassembly::new(), "mock_mem", width),
                Err(SvMemError::InvalidWidth(w)) if w == width
            ));
        }
    }

    #[test]
    fn test_parse_disassembly() {
        let instrs = svmem::parse_disassembly(LISTING).unwrap();
        assert_eq!(instrs.len(), 3);
        assert_eq!(instrs[&0], "li\ta0,0");
        assert_eq!(instrs[&4], "add\ta0,a0,a0");
        assert_eq!(instrs[&8], "j\t8 <_start+0x8>");
    }

    #[test]
    fn test_svmem_comments_from_listing() {
        let instrs = svmem::parse_disassembly(LISTING).unwrap();
        let image = [0x13, 0x05, 0x00, 0x00, 0x33, 0x05, 0xA5, 0x00];

        let by_word = svmem::render(&image, &instrs, "mock_mem", 32).unwrap();
        let lines: Vec<&str> = by_word.lines().collect();
        assert_eq!(
            lines[0],
            "mock_mem.block_ram_inst.memory['h0000] = 32'h00000513; // 0x0: li\ta0,0"
        );
        assert_eq!(
            lines[1],
            "mock_mem.block_ram_inst.memory['h0001] = 32'h00A50533; // 0x4: add\ta0,a0,a0"
        );

        // A 64-bit word spans both instructions.
        let joined = svmem::render(&image, &instrs, "mock_mem", 64).unwrap();
        assert!(joined.ends_with("// 0x0: li\ta0,0 ; 0x4: add\ta0,a0,a0\n"));

        // Byte-wide memory only annotates the first byte of each instruction.
        let bytes = svmem::render(&image, &instrs, "mock_mem", 8).unwrap();
        let annotated = bytes.lines().filter(|l| l.contains("//")).count();
        assert_eq!(annotated, 2);
    }
}
