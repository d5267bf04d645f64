//! End-to-end adapter tests: setup through the registry, cycles driven
//! through the scheduler, peers wired via named cell lookup.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use kinsplus_core::config::AdapterConfig;
use kinsplus_core::consts::MAX_JOINTS;
use kinsplus_core::pose::Pose;
use kinsplus_core::setup::KinsAdapter;
use kinsplus_hal::thread::CyclicThread;
use kinsplus_hal::PinRegistry;

fn config(coordinates: &str, extra_joints: i32) -> AdapterConfig {
    AdapterConfig {
        coordinates: coordinates.to_string(),
        extra_joints,
        kins_type: "b".to_string(),
        ..AdapterConfig::default()
    }
}

#[test]
fn full_cycle_through_the_scheduler() {
    let mut registry = PinRegistry::new();
    let adapter = KinsAdapter::setup(&config("XYZ", 2), &mut registry).unwrap();

    // The homing sequencer and motion planner sides of the pin boundary.
    let homed_3 = registry.bit_cell("kinsplus.3.homed").unwrap();
    let prehome_3 = registry.float_cell("kinsplus.3.prehome-cmd").unwrap();
    let prehome_fb_3 = registry.float_cell("kinsplus.3.prehome-fb").unwrap();
    let posthome_3 = registry.float_cell("kinsplus.3.posthome-cmd").unwrap();
    let offset_3 = registry.float_cell("kinsplus.3.motor-offset").unwrap();
    let cmd_out_3 = registry.float_cell("kinsplus.3.motor-pos-cmd").unwrap();
    let fb_out_3 = registry.float_cell("kinsplus.3.motor-pos-fb").unwrap();
    let cmd_out_4 = registry.float_cell("kinsplus.4.motor-pos-cmd").unwrap();

    let mut thread = CyclicThread::new(Duration::from_millis(1));
    let extra = adapter.extra().clone();
    thread
        .add_funct(
            "kinsplus.extrajoints.update",
            Box::new(move |period_ns| extra.update(period_ns)),
        )
        .unwrap();

    // Cycle 1: nothing homed, everything follows the pre-home sources.
    prehome_3.set(1.0);
    prehome_fb_3.set(2.0);
    thread.step(1_000_000);
    assert_eq!(cmd_out_3.get(), 1.0);
    assert_eq!(fb_out_3.get(), 2.0);
    assert_eq!(cmd_out_4.get(), 0.0);

    // Cycle 2: joint 3 homes; command switches to posthome + offset, the
    // feedback loops back to the pre-home command.
    homed_3.set(true);
    posthome_3.set(5.0);
    offset_3.set(0.5);
    thread.step(1_000_000);
    assert_eq!(cmd_out_3.get(), 5.5);
    assert_eq!(fb_out_3.get(), 1.0);

    // Joint 4 stays on its (zero) pre-home sources.
    assert_eq!(cmd_out_4.get(), 0.0);
}

#[test]
fn peer_ordering_is_registration_order() {
    // A peer funct registered before the update publishes inputs that the
    // same cycle's update already observes.
    let mut registry = PinRegistry::new();
    let adapter = KinsAdapter::setup(&config("X", 1), &mut registry).unwrap();

    let prehome = registry.float_cell("kinsplus.1.prehome-cmd").unwrap();
    let cmd_out = registry.float_cell("kinsplus.1.motor-pos-cmd").unwrap();

    let cycles = Arc::new(AtomicUsize::new(0));
    let mut thread = CyclicThread::new(Duration::from_millis(1));
    {
        let cycles = Arc::clone(&cycles);
        let prehome = Arc::clone(&prehome);
        thread
            .add_funct(
                "planner.publish",
                Box::new(move |_| {
                    let n = cycles.fetch_add(1, Ordering::SeqCst) + 1;
                    prehome.set(n as f64);
                }),
            )
            .unwrap();
    }
    let extra = adapter.extra().clone();
    thread
        .add_funct(
            "kinsplus.extrajoints.update",
            Box::new(move |period_ns| extra.update(period_ns)),
        )
        .unwrap();

    thread.step(1_000_000);
    assert_eq!(cmd_out.get(), 1.0);
    thread.step(1_000_000);
    assert_eq!(cmd_out.get(), 2.0);
}

#[test]
fn transforms_run_independently_of_the_update() {
    let mut registry = PinRegistry::new();
    let adapter = KinsAdapter::setup(&config("XYZC", 1), &mut registry).unwrap();

    let mut joints = [0.0; MAX_JOINTS];
    joints[0] = 10.0;
    joints[1] = 20.0;
    joints[2] = 30.0;
    joints[3] = 45.0;

    let mut pose = Pose::default();
    adapter.mapping().forward(&joints, &mut pose);
    assert_eq!(pose.x, 10.0);
    assert_eq!(pose.y, 20.0);
    assert_eq!(pose.z, 30.0);
    assert_eq!(pose.c, 45.0);

    let mut back = [0.0; MAX_JOINTS];
    adapter.mapping().inverse(&pose, &mut back);
    assert_eq!(&back[..4], &joints[..4]);
    // The extra joint slot (4) is untouched by the transforms.
    assert_eq!(back[4], 0.0);
}

#[test]
fn over_limit_setup_creates_no_pins() {
    let mut registry = PinRegistry::new();
    let config = AdapterConfig {
        coordinates: "XYZABCUVWXYZABCU".to_string(), // 16 kinematic joints
        extra_joints: 1,
        kins_type: "b".to_string(),
        ..AdapterConfig::default()
    };
    assert!(KinsAdapter::setup(&config, &mut registry).is_err());
    assert!(registry.is_empty());
}
