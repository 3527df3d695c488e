//! End-to-end session behaviour against the fake coprocessor.

use ahrscomms::app::events::AppEvent;
use ahrscomms::app::ports::ObjectStore;
use ahrscomms::error::CommsCategory;
use ahrscomms::fsm::StateId;
use ahrscomms::fsm::context::SyncState;
use ahrscomms::objects::{
    AhrsCalibration, AhrsSettings, AlarmSeverity, AttitudeSettings, BaroAltitude, CalibrationMode,
    GpsPosition, HomeLocation,
};
use ahrscomms::proto::messages::GpsQuality;
use ahrscomms::proto::{MessageKind, Request};
use ahrscomms::tracker::DirtyFlag;

use super::mock_rig::{Harness, SERIAL};

fn home() -> HomeLocation {
    HomeLocation::from_lla(47.3977, 8.5456, 488.0, [0.3, 0.4, 0.0])
}

/// 0.001° north of [`home`], same ellipsoid height.
fn good_fix() -> GpsPosition {
    GpsPosition {
        latitude: 473_987_000,
        longitude: 85_456_000,
        altitude: 440.0,
        geoid_separation: 48.0,
        groundspeed: 4.0,
        heading: 90.0,
        satellites: 8,
        pdop: 2.0,
        hdop: 2.0,
        vdop: 2.0,
    }
}

fn mag_north_requests(h: &Harness) -> Vec<[f32; 3]> {
    h.rig
        .link
        .sent
        .iter()
        .filter_map(|r| match r {
            Request::SetMagNorth(m) => Some(m.be),
            _ => None,
        })
        .collect()
}

// ── Scenario A: link never comes up ───────────────────────────

#[test]
fn scenario_a_resync_failing_forever() {
    let mut h = Harness::new();
    h.rig.link.resync_ok = false;

    h.ticks(50);

    assert_eq!(h.service.state(), StateId::Resyncing);
    assert_eq!(h.rig.store.alarm(), AlarmSeverity::Critical);
    assert_eq!(h.service.counters().total(), 0);
    assert_eq!(h.rig.link.resync_attempts, 50);
    assert!(h.rig.link.sent.is_empty());
    assert_eq!(h.now(), 50 * 100);
    assert!(h.rig.clock.sleeps.borrow().iter().all(|&ms| ms == 100));
}

// ── Scenario B: first home push ───────────────────────────────

#[test]
fn scenario_b_home_reference_normalised_and_pushed() {
    let mut h = Harness::new();
    h.rig.store.set_home_location(HomeLocation {
        be: [0.3, 0.4, 0.0],
        ..HomeLocation::default()
    });

    h.connect();
    assert!(!h.service.synced().home);
    h.tick();

    let pushed = mag_north_requests(&h);
    assert_eq!(pushed.len(), 1);
    assert!((pushed[0][0] - 0.6).abs() < 1e-6);
    assert!((pushed[0][1] - 0.8).abs() < 1e-6);
    assert_eq!(pushed[0][2], 0.0);
    assert!(h.service.synced().home);
    assert!(h.rig.store.ahrs_status().home_set);
}

#[test]
fn zero_field_vector_is_pushed_as_north() {
    let mut h = Harness::new();
    h.connect();
    h.tick();
    assert_eq!(mag_north_requests(&h), vec![[1.0, 0.0, 0.0]]);
}

// ── Scenario C: GPS hysteresis ────────────────────────────────

#[test]
fn scenario_c_gps_ramps_for_29_samples_then_good() {
    let mut h = Harness::new();
    h.rig.store.set_home_location(home());
    h.connect();

    for _ in 0..30 {
        h.rig.store.set_gps_position(good_fix());
        h.tick();
    }

    let samples: Vec<_> = h
        .rig
        .link
        .update_requests()
        .into_iter()
        .map(|u| u.gps.expect("gps was dirty every period"))
        .collect();
    assert_eq!(samples.len(), 30);

    for (i, s) in samples[..29].iter().enumerate() {
        assert_eq!(s.quality, GpsQuality::Ramping, "sample {}", i + 1);
        assert_eq!(s.ned, [0.0; 3]);
        assert_eq!(s.groundspeed, 0.0);
    }

    let last = samples[29];
    assert_eq!(last.quality, GpsQuality::Good);
    assert!((last.ned[0] - 111.2).abs() < 1.0, "north {}", last.ned[0]);
    assert!(last.ned[1].abs() < 0.5, "east {}", last.ned[1]);
    assert!(last.ned[2].abs() < 0.5, "down {}", last.ned[2]);
    assert_eq!(last.groundspeed, 4.0);
    assert_eq!(last.heading, 90.0);
    assert_eq!(h.service.gps_quality(), GpsQuality::Good);
}

#[test]
fn indoor_home_sends_indoor_samples() {
    let mut h = Harness::new();
    h.rig.store.set_home_location(HomeLocation {
        indoor: true,
        ..home()
    });
    h.connect();

    for _ in 0..40 {
        h.rig.store.set_gps_position(good_fix());
        h.tick();
    }
    for u in h.rig.link.update_requests() {
        let gps = u.gps.expect("gps was dirty");
        assert_eq!(gps.quality, GpsQuality::Indoor);
        assert_eq!(gps.quality.wire_value(), -1);
        assert_eq!(gps.ned, [0.0; 3]);
    }
}

#[test]
fn resync_restarts_gps_ramp() {
    let mut h = Harness::new();
    h.rig.store.set_home_location(home());
    h.connect();

    for _ in 0..20 {
        h.rig.store.set_gps_position(good_fix());
        h.tick();
    }
    assert_eq!(h.service.good_gps_fixes(), 20);

    h.rig.link.fail_on.push(MessageKind::SetGetUpdate);
    h.tick();
    assert_eq!(h.service.state(), StateId::Resyncing);
    assert_eq!(h.service.good_gps_fixes(), 0);

    h.connect();
    let before = h.rig.link.update_requests().len();
    for _ in 0..30 {
        h.rig.store.set_gps_position(good_fix());
        h.tick();
    }
    let after: Vec<_> = h.rig.link.update_requests()[before..]
        .iter()
        .map(|u| u.gps.map(|g| g.quality))
        .collect();
    assert!(after[..29].iter().all(|q| *q == Some(GpsQuality::Ramping)));
    assert_eq!(after[29], Some(GpsQuality::Good));
}

#[test]
fn resync_drops_reported_gps_quality() {
    let mut h = Harness::new();
    h.rig.store.set_home_location(home());
    h.connect();

    for _ in 0..30 {
        h.rig.store.set_gps_position(good_fix());
        h.tick();
    }
    assert_eq!(h.service.gps_quality(), GpsQuality::Good);

    h.rig.link.fail_on.push(MessageKind::SetGetUpdate);
    h.tick();
    assert_eq!(h.service.state(), StateId::Resyncing);
    assert_eq!(h.service.gps_quality(), GpsQuality::Ramping);

    // The first ramping sample after the reconnect is not a quality change.
    h.connect();
    h.sink.events.clear();
    h.rig.store.set_gps_position(good_fix());
    h.tick();
    assert!(
        !h.sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::GpsQualityChanged { .. }))
    );
}

// ── Scenario D: update failure mid-stream ─────────────────────

#[test]
fn scenario_d_update_failure_resyncs_and_resets_sync() {
    let mut h = Harness::new();
    h.connect();
    h.ticks(3);
    assert_eq!(
        h.service.synced(),
        SyncState {
            home: true,
            calibration: true,
            algorithm: true,
        }
    );

    h.rig.link.fail_on.push(MessageKind::SetGetUpdate);
    h.tick();

    assert_eq!(h.service.state(), StateId::Resyncing);
    assert_eq!(h.service.error_count(CommsCategory::Update), 1);
    assert_eq!(h.service.counters().total(), 1);
    assert_eq!(h.rig.store.alarm(), AlarmSeverity::Critical);

    h.connect();
    assert_eq!(h.service.synced(), SyncState::default());

    let before = h.rig.link.sent.len();
    h.tick();
    assert_eq!(
        h.rig.link.sent_kinds()[before..],
        [
            MessageKind::SetMagNorth,
            MessageKind::SetGetCalibration,
            MessageKind::SetAlgorithm,
            MessageKind::SetGetUpdate,
        ]
    );
    assert_eq!(h.service.error_count(CommsCategory::Update), 1);
}

#[test]
fn each_failure_moves_exactly_its_own_counter() {
    let cases = [
        (MessageKind::SetMagNorth, CommsCategory::HomeLocation),
        (MessageKind::SetGetCalibration, CommsCategory::Calibration),
        (MessageKind::SetAlgorithm, CommsCategory::Algorithm),
        (MessageKind::SetGetUpdate, CommsCategory::Update),
    ];
    for (kind, category) in cases {
        let mut h = Harness::new();
        h.connect();
        h.rig.link.fail_on.push(kind);
        h.tick();

        assert_eq!(h.service.state(), StateId::Resyncing, "{kind:?}");
        for other in CommsCategory::ALL {
            let expected = u16::from(other == category);
            assert_eq!(h.service.error_count(other), expected, "{kind:?} / {other}");
        }
        assert_eq!(h.rig.store.ahrs_status().comm_errors_for(category), 1);
    }
}

#[test]
fn failure_abandons_rest_of_period() {
    let mut h = Harness::new();
    h.connect();
    let before = h.rig.link.sent.len();
    h.rig.link.fail_on.push(MessageKind::SetGetCalibration);
    h.tick();

    assert_eq!(
        h.rig.link.sent_kinds()[before..],
        [MessageKind::SetMagNorth, MessageKind::SetGetCalibration]
    );
}

#[test]
fn counters_accumulate_across_episodes() {
    let mut h = Harness::new();
    for _ in 0..3 {
        h.connect();
        h.rig.link.fail_on.push(MessageKind::SetGetUpdate);
        h.tick();
    }
    assert_eq!(h.service.error_count(CommsCategory::Update), 3);
    assert_eq!(h.sink.faults(), 3);
}

#[test]
fn identity_failure_is_not_counted() {
    let mut h = Harness::new();
    h.rig.link.fail_on.push(MessageKind::Identity);
    h.ticks(2);

    assert_eq!(h.service.state(), StateId::Resyncing);
    assert_eq!(h.service.counters().total(), 0);

    h.connect();
    assert_eq!(h.service.state(), StateId::Streaming);
}

// ── Push-once and echo suppression ────────────────────────────

#[test]
fn configuration_pushed_once_per_episode() {
    let mut h = Harness::new();
    h.connect();
    h.ticks(10);

    assert_eq!(h.rig.link.count(MessageKind::SetMagNorth), 1);
    assert_eq!(h.rig.link.count(MessageKind::SetGetCalibration), 1);
    assert_eq!(h.rig.link.count(MessageKind::SetAlgorithm), 1);
    assert_eq!(h.rig.link.count(MessageKind::SetGetUpdate), 10);

    let pushed: Vec<_> = h
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ConfigPushed(flag) => Some(*flag),
            _ => None,
        })
        .collect();
    assert_eq!(
        pushed,
        [
            DirtyFlag::HomeLocation,
            DirtyFlag::Calibration,
            DirtyFlag::AlgorithmSettings,
        ]
    );
}

#[test]
fn calibration_write_back_is_not_an_edit() {
    let mut h = Harness::new();
    h.connect();
    h.tick();

    let cal = h.rig.store.calibration();
    assert_eq!(cal.accel_var, [0.01, 0.02, 0.03]);
    assert_eq!(cal.mag_var, [0.01, 0.02, 0.03]);
    assert!(!h.service.tracker().is_dirty(DirtyFlag::Calibration));

    h.ticks(5);
    assert_eq!(h.rig.link.count(MessageKind::SetGetCalibration), 1);

    // A real edit is still seen.
    h.rig.store.set_calibration(AhrsCalibration {
        gyro_bias: [0.5, -0.5, 0.0],
        ..h.rig.store.calibration()
    });
    h.ticks(3);
    assert_eq!(h.rig.link.count(MessageKind::SetGetCalibration), 2);
}

#[test]
fn continuous_calibration_never_latches() {
    let mut h = Harness::new();
    h.rig.store.set_calibration(AhrsCalibration {
        measure_var: CalibrationMode::Echo,
        ..AhrsCalibration::default()
    });
    h.connect();
    h.ticks(5);

    assert_eq!(h.rig.link.count(MessageKind::SetGetCalibration), 5);
    assert!(!h.service.synced().calibration);
    assert!(!h.rig.store.ahrs_status().calibration_set);
    // Home and algorithm latch normally.
    assert_eq!(h.rig.link.count(MessageKind::SetMagNorth), 1);
}

#[test]
fn home_edit_triggers_single_repush() {
    let mut h = Harness::new();
    h.connect();
    h.ticks(2);

    h.rig.store.set_home_location(home());
    h.rig.store.set_home_location(home());
    h.ticks(3);

    assert_eq!(h.rig.link.count(MessageKind::SetMagNorth), 2);
}

#[test]
fn settings_edit_repushes_algorithm() {
    let mut h = Harness::new();
    h.connect();
    h.tick();

    h.rig.store.set_ahrs_settings(AhrsSettings {
        algorithm: ahrscomms::objects::FusionAlgorithm::Simple,
        ..AhrsSettings::default()
    });
    h.tick();

    let algorithms: Vec<_> = h
        .rig
        .link
        .sent
        .iter()
        .filter_map(|r| match r {
            Request::SetAlgorithm(a) => Some(a.algorithm),
            _ => None,
        })
        .collect();
    assert_eq!(
        algorithms,
        [
            ahrscomms::objects::FusionAlgorithm::InsGps,
            ahrscomms::objects::FusionAlgorithm::Simple,
        ]
    );
}

// ── Sensor samples ────────────────────────────────────────────

#[test]
fn barometer_sent_only_when_updated() {
    let mut h = Harness::new();
    h.connect();
    h.rig.store.set_baro_altitude(BaroAltitude {
        altitude: 123.5,
        ..BaroAltitude::default()
    });
    h.ticks(2);

    let updates = h.rig.link.update_requests();
    assert_eq!(updates[0].barometer.map(|b| b.altitude), Some(123.5));
    assert!(updates[1].barometer.is_none());
    assert!(updates.iter().all(|u| u.gps.is_none()));
}

// ── Outputs ───────────────────────────────────────────────────

#[test]
fn update_response_feeds_outputs() {
    let mut h = Harness::new();
    let half = (-45.0f32).to_radians();
    h.rig.link.quaternion = [half.cos(), 0.0, 0.0, half.sin()];
    h.rig.store.set_attitude_settings(AttitudeSettings {
        roll_bias: 1.0,
        pitch_bias: 0.0,
    });
    h.connect();
    h.tick();

    let att = h.rig.store.attitude_actual();
    assert!((att.yaw - 270.0).abs() < 1e-3, "yaw {}", att.yaw);
    assert!((att.roll + 1.0).abs() < 1e-4, "roll {}", att.roll);
    assert_eq!(att.q, h.rig.link.quaternion);

    let pos = h.rig.store.position_actual();
    assert_eq!(pos.ned, [1.0, 2.0, -3.0]);
    assert_eq!(pos.vel, [0.5, 0.0, 0.0]);

    let status = h.rig.store.ahrs_status();
    assert_eq!(status.cpu_load, 37);
    assert_eq!(status.idle_time_per_cycle, 1200);
    assert_eq!(status.running_time_per_cycle, 800);
    assert_eq!(status.dropped_updates, 2);
    assert_eq!(status.serial_number, SERIAL);
}

#[test]
fn raw_mode_publishes_sensor_record() {
    let mut h = Harness::new();
    h.rig.store.set_ahrs_settings(AhrsSettings {
        update_raw: true,
        update_filtered: false,
        ..AhrsSettings::default()
    });
    h.connect();
    h.tick();

    assert_eq!(h.rig.link.count(MessageKind::GetAttitudeRaw), 1);
    assert_eq!(h.rig.link.count(MessageKind::SetGetUpdate), 0);
    let raw = h.rig.store.attitude_raw();
    assert_eq!(raw.magnetometers, [100, -50, 400]);
    assert_eq!(raw.gyros, [1650, 1651, 1652]);
    assert_eq!(raw.gyrotemp, [2100, 2101]);
    assert_eq!(raw.accels_filtered, [0.0, 0.0, -9.81]);
}

#[test]
fn raw_failure_counts_attitude_raw() {
    let mut h = Harness::new();
    h.rig.store.set_ahrs_settings(AhrsSettings {
        update_raw: true,
        ..AhrsSettings::default()
    });
    h.connect();
    h.rig.link.fail_on.push(MessageKind::GetAttitudeRaw);
    h.tick();

    assert_eq!(h.service.error_count(CommsCategory::AttitudeRaw), 1);
    assert_eq!(h.rig.link.count(MessageKind::SetGetUpdate), 0);
}

#[test]
fn alarm_tracks_link_state() {
    let mut h = Harness::new();
    assert_eq!(h.rig.store.alarm(), AlarmSeverity::Critical);
    h.connect();
    assert_eq!(h.rig.store.alarm(), AlarmSeverity::Cleared);
    h.rig.link.fail_on.push(MessageKind::SetMagNorth);
    h.tick();
    assert_eq!(h.rig.store.alarm(), AlarmSeverity::Critical);
}

// ── Timing ────────────────────────────────────────────────────

#[test]
fn period_is_anchored_not_relative() {
    let mut h = Harness::new();
    h.connect();
    h.rig.link.latency_ms = 3;
    let start = h.now();

    for k in 1..=5u64 {
        h.tick();
        assert_eq!(h.now(), start + 20 * k, "period {k}");
    }
    // First period ran four exchanges, later ones only the update.
    let sleeps = h.rig.clock.sleeps.borrow();
    assert_eq!(sleeps[sleeps.len() - 5..], [8, 17, 17, 17, 17]);
}

#[test]
fn zero_period_uses_default() {
    let mut h = Harness::new();
    h.rig.store.set_ahrs_settings(AhrsSettings {
        update_period_ms: 0,
        ..AhrsSettings::default()
    });
    h.connect();
    let start = h.now();
    h.ticks(3);
    assert_eq!(h.now(), start + 60);
}

#[test]
fn custom_period_is_honoured() {
    let mut h = Harness::new();
    h.rig.store.set_ahrs_settings(AhrsSettings {
        update_period_ms: 50,
        ..AhrsSettings::default()
    });
    h.connect();
    let start = h.now();
    h.ticks(4);
    assert_eq!(h.now(), start + 200);
}
