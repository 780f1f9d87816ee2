//! Regression test for the tick-driven per-entity timer: no wall clock,
//! just accumulated `dt`, firing a `TimerFire` event once its period
//! elapses.

use lexicrucible::entity::Timer;
use lexicrucible::events::DomainEvent;
use lexicrucible::world::WorldBuilder;
use lexicrucible::MaterialSpec;

#[test]
fn timer_fires_once_its_period_elapses_across_ticks() {
    let mut world = WorldBuilder::new(2).with_event_log(true).build();
    world.register_material(MaterialSpec::minimal("spark"));
    let id = world.spawn("spark", Some(0.0), Some(0.0)).unwrap();
    world.entity_mut(id).unwrap().timers.push(Timer::new("speak", 2.0, 0.0));

    world.tick(1.0).unwrap();
    assert!(!world
        .observers_mut()
        .log()
        .iter()
        .any(|e| matches!(e, DomainEvent::TimerFire { name, .. } if name == "speak")));

    world.tick(1.0).unwrap();
    assert!(world
        .observers_mut()
        .log()
        .iter()
        .any(|e| matches!(e, DomainEvent::TimerFire { name, .. } if name == "speak")));
}
