//! Tests for the waveform synthesizer.

use crate::params::SynthesisConfig;
use crate::timing::PulseInterval;

use super::*;

fn config(
    sample_rate_hz: u32,
    intermediate_freq_hz: f64,
    amplitude_fraction: f64,
) -> SynthesisConfig {
    SynthesisConfig {
        sample_rate_hz,
        intermediate_freq_hz,
        amplitude_fraction,
    }
}

fn on_off_on() -> Vec<PulseInterval> {
    vec![PulseInterval::on(100), PulseInterval::off(200), PulseInterval::on(100)]
}

// =========================================================================
// Sample counts
// =========================================================================

#[test]
fn test_samples_for_duration_exact() {
    assert_eq!(samples_for_duration(100, 1_000_000), 100);
    assert_eq!(samples_for_duration(350, 500_000), 175);
    assert_eq!(samples_for_duration(1, 2_000_000), 2);
}

#[test]
fn test_samples_for_duration_ties_to_even() {
    // 0.5 -> 0, 1.5 -> 2, 2.5 -> 2, 3.5 -> 4
    assert_eq!(samples_for_duration(1, 500_000), 0);
    assert_eq!(samples_for_duration(3, 500_000), 2);
    assert_eq!(samples_for_duration(5, 500_000), 2);
    assert_eq!(samples_for_duration(7, 500_000), 4);
}

#[test]
fn test_samples_for_duration_rounds_to_nearest() {
    // 3 us at 300 kHz = 0.9 samples, 7 us at 300 kHz = 2.1 samples
    assert_eq!(samples_for_duration(3, 300_000), 1);
    assert_eq!(samples_for_duration(7, 300_000), 2);
}

#[test]
fn test_samples_for_duration_no_overflow() {
    let samples = samples_for_duration(u32::MAX, u32::MAX);
    assert!(samples > 0);
}

#[test]
fn test_total_samples_matches_emitted() {
    let intervals = vec![
        PulseInterval::on(3),
        PulseInterval::off(5),
        PulseInterval::on(1),
        PulseInterval::off(1_234),
    ];
    let cfg = config(500_000, 5_000.0, 1.0);
    let synth = synthesize(&intervals, cfg);
    let expected = total_samples(&intervals, &cfg);
    assert_eq!(synth.total_samples(), expected);
    assert_eq!(synth.size_hint(), (expected as usize, Some(expected as usize)));
    assert_eq!(synth.count() as u64, expected);
}

// =========================================================================
// DC scenario
// =========================================================================

#[test]
fn test_dc_on_off_on() {
    let intervals = on_off_on();
    let samples: Vec<ComplexSample> = synthesize(&intervals, config(1_000_000, 0.0, 1.0)).collect();

    assert_eq!(samples.len(), 400);
    assert!(samples[..100].iter().all(|s| *s == ComplexSample::new(1.0, 0.0)));
    assert!(samples[100..300].iter().all(|s| *s == ComplexSample::ZERO));
    assert!(samples[300..].iter().all(|s| *s == ComplexSample::new(1.0, 0.0)));
}

// =========================================================================
// Keying and amplitude
// =========================================================================

#[test]
fn test_off_intervals_are_exactly_zero() {
    let intervals = vec![
        PulseInterval::off(40),
        PulseInterval::on(37),
        PulseInterval::off(113),
        PulseInterval::off(9),
    ];
    let cfg = config(1_000_000, 123_456.0, 0.8);
    let mut synth = synthesize(&intervals, cfg);
    let mut index = 0;
    for interval in &intervals {
        for _ in 0..cfg.samples_for(interval.duration_us) {
            let sample = synth.next().unwrap();
            if !interval.is_on() {
                assert_eq!(sample.i, 0.0, "sample {}", index);
                assert_eq!(sample.q, 0.0, "sample {}", index);
            }
            index += 1;
        }
    }
    assert!(synth.next().is_none());
}

#[test]
fn test_on_samples_have_requested_magnitude() {
    let intervals = vec![PulseInterval::on(500), PulseInterval::off(10), PulseInterval::on(77)];
    for amplitude in [1.0, 0.5, 0.01] {
        let cfg = config(2_000_000, 31_000.0, amplitude);
        let on_ticks = cfg.samples_for(500) as usize;
        for sample in synthesize(&intervals, cfg).take(on_ticks) {
            assert!((sample.magnitude() - amplitude).abs() < 1e-12);
        }
    }
}

#[test]
fn test_zero_sample_interval_is_skipped() {
    // 1 us at 500 kHz rounds to zero samples.
    let intervals = vec![PulseInterval::on(4), PulseInterval::off(1), PulseInterval::on(4)];
    let cfg = config(500_000, 0.0, 1.0);
    let samples: Vec<ComplexSample> = synthesize(&intervals, cfg).collect();
    assert_eq!(samples.len(), 4);
    assert!(samples.iter().all(|s| *s == ComplexSample::new(1.0, 0.0)));
}

#[test]
fn test_empty_sequence_yields_nothing() {
    let mut synth = synthesize(&[], config(500_000, 5_000.0, 1.0));
    assert_eq!(synth.total_samples(), 0);
    assert!(synth.next().is_none());
    assert!(synth.next().is_none());
}

// =========================================================================
// Phase continuity
// =========================================================================

fn phase_delta(from: f64, to: f64) -> f64 {
    wrap_phase(to - from)
}

#[test]
fn test_phase_continuous_across_boundaries() {
    let intervals = vec![
        PulseInterval::on(13),
        PulseInterval::off(7),
        PulseInterval::on(29),
        PulseInterval::on(3),
        PulseInterval::off(11),
    ];
    let cfg = config(1_000_000, 87_500.0, 1.0);
    let increment = wrap_phase(cfg.phase_increment());

    let mut synth = synthesize(&intervals, cfg);
    let mut previous = None;
    while synth.samples_emitted() < synth.total_samples() {
        let phase = synth.phase();
        synth.next().unwrap();
        if let Some(prev) = previous {
            let delta = phase_delta(prev, phase);
            assert!(
                (delta - increment).abs() < 1e-9,
                "phase jump of {} at tick {}",
                delta,
                synth.samples_emitted()
            );
        }
        previous = Some(phase);
    }
}

#[test]
fn test_carrier_resumes_where_continuous_oscillator_would_be() {
    let intervals = on_off_on();
    let cfg = config(1_000_000, 12_345.0, 1.0);
    let samples: Vec<ComplexSample> = synthesize(&intervals, cfg).collect();

    // First sample of the second burst sits at tick 300 of an unbroken tone.
    let expected = wrap_phase(300.0 * cfg.phase_increment());
    let actual = wrap_phase(samples[300].arg());
    assert!((actual - expected).abs() < 1e-9);

    let last_of_first = wrap_phase(samples[99].arg());
    let first_of_second = wrap_phase(samples[300].arg());
    let ticks_between = 201.0;
    let expected_delta = wrap_phase(ticks_between * cfg.phase_increment());
    assert!((phase_delta(last_of_first, first_of_second) - expected_delta).abs() < 1e-9);
}

#[test]
fn test_negative_if_rotates_clockwise() {
    let intervals = vec![PulseInterval::on(10)];
    let cfg = config(1_000_000, -250_000.0, 1.0);
    let samples: Vec<ComplexSample> = synthesize(&intervals, cfg).collect();
    // -pi/2 per tick: (1,0) -> (0,-1)
    assert!((samples[1].i).abs() < 1e-12);
    assert!((samples[1].q + 1.0).abs() < 1e-12);
    assert!((samples[2].i + 1.0).abs() < 1e-12);
}

#[test]
fn test_restart_reproduces_stream() {
    let intervals = on_off_on();
    let cfg = config(250_000, 3_333.0, 0.7);
    let first: Vec<ComplexSample> = synthesize(&intervals, cfg).collect();
    let second: Vec<ComplexSample> = synthesize(&intervals, cfg).collect();
    assert_eq!(first, second);
}

#[test]
#[should_panic(expected = "synthesis config must be finite")]
fn test_non_finite_config_panics() {
    let intervals = on_off_on();
    let _ = synthesize(&intervals, config(1_000, f64::NAN, 1.0));
}
