//! Gap Analysis Example
//!
//! This example demonstrates estimating fuel events that happened while
//! a device was silent: the windowed detector never saw them, but the
//! two readings bracketing the gap still tell a story.
//!
//! ## What You'll Learn
//!
//! - When gap analysis concludes nothing (noise, ordinary burn)
//! - How drains and fills are estimated from the consumption model
//! - Why a shallow drop across a gap can mean a hidden *fill*
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_gap_analysis
//! ```

use fuelguard_core::{
    traits::StaticProfiles, ConsumptionProfile, GapAnalyzer, Reading, SensorConfig,
};

const HOUR: u64 = 3_600_000;

fn main() {
    println!("FuelGuard Gap Analysis Example");
    println!("==============================\n");

    // 2.5 L/h nominal burn, 4 L/h worst case, 3 L sensor deviation.
    // Over a 2 hour gap: expect ~5 L burned, at most ~8 L.
    let profile = ConsumptionProfile {
        activity_threshold: 3.0,
        idle_rate_lph: 2.5,
        max_rate_lph: 4.0,
        distance_rate_lpkm: 0.3,
    };
    let mut gap = GapAnalyzer::new(StaticProfiles::new(profile));
    let sensor = SensorConfig::new(1, "fuel_calibrated", "fuel_outlier").unwrap();

    let scenarios: [(&str, u64, f64, f64); 5] = [
        ("Sensor noise only", 2, 80.0, 78.5),
        ("Ordinary idle burn", 2, 80.0, 74.0),
        ("Theft while parked", 2, 80.0, 40.0),
        ("Overnight drop too shallow (hidden top-up)", 12, 80.0, 70.0),
        ("Refuel during silence", 2, 40.0, 75.0),
    ];

    for (description, hours, before, after) in &scenarios {
        let previous = Reading::new(7, 0).with_float("fuel_calibrated", *before);
        let current = Reading::new(7, hours * HOUR).with_float("fuel_calibrated", *after);

        print!("{:.<45} {} L -> {} L over {} h: ", description, before, after, hours);

        match gap.check_for_activity_if_data_loss(&current, &previous, None, &sensor) {
            Some(activity) => println!(
                "{} (~{:.1} L estimated)",
                activity.kind.name(),
                activity.change_volume
            ),
            None => println!("no conclusion"),
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("Key Insights:");
    println!("- Changes inside the deviation band are never called events");
    println!("- A drop matching predicted burn is ordinary consumption");
    println!("- Estimates subtract (drains) or add (fills) the predicted burn");
    println!("- Gap analysis is stateless and best-effort: it declines, never errors");
}
