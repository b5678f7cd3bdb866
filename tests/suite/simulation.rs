//! Tick simulation tests

use std::time::Duration;

use circuitry_core::{Settle, Simulator, TickClock};
use circuitry_types::TickRate;

use crate::common::{half_adder, sr_latch};

#[test]
fn half_adder_adds() {
    let fixture = half_adder();
    let mut sim = Simulator::new(&fixture.circuit);

    let cases = [
        (false, false, false, false),
        (true, false, true, false),
        (false, true, true, false),
        (true, true, false, true),
    ];
    for (a, b, sum, carry) in cases {
        sim.set_input(fixture.a, a).unwrap();
        sim.set_input(fixture.b, b).unwrap();
        assert!(matches!(sim.settle(10), Settle::Stable { .. }));
        assert_eq!(sim.led(fixture.sum), Some(sum), "sum for {a} + {b}");
        assert_eq!(sim.led(fixture.carry), Some(carry), "carry for {a} + {b}");
    }
}

#[test]
fn latch_remembers_last_command() {
    let latch = sr_latch();
    let mut sim = Simulator::new(&latch.circuit);

    sim.set_input(latch.reset, true).unwrap();
    sim.settle(10);
    assert_eq!(sim.led(latch.q), Some(false));

    sim.set_input(latch.reset, false).unwrap();
    sim.settle(10);
    assert_eq!(sim.led(latch.q), Some(false), "reset state should hold");

    sim.set_input(latch.set, true).unwrap();
    sim.settle(10);
    assert_eq!(sim.led(latch.q), Some(true));

    sim.set_input(latch.set, false).unwrap();
    sim.settle(10);
    assert_eq!(sim.led(latch.q), Some(true), "set state should hold");
}

#[test]
fn simulation_leaves_the_circuit_alone() {
    let fixture = half_adder();
    let before = fixture.circuit.clone();
    let mut sim = Simulator::new(&fixture.circuit);
    sim.toggle_input(fixture.a).unwrap();
    sim.run(5);
    assert_eq!(fixture.circuit, before);
}

#[test]
fn clock_paces_ticks_by_frame_interval() {
    let fixture = half_adder();
    let mut sim = Simulator::new(&fixture.circuit);
    let mut clock = TickClock::new(fixture.circuit.settings.tick_rate());
    assert_eq!(clock.interval(), Duration::from_millis(16));

    let mut ran = 0;
    for _ in 0..10 {
        ran += clock.advance(Duration::from_millis(8), &mut sim);
    }
    assert_eq!(ran, 5);
    assert_eq!(sim.ticks(), 5);

    let slow = TickClock::new(TickRate::new(0));
    assert_eq!(slow.interval(), Duration::from_secs(1));
}
