//! Compare a fast detector against a slower reference detector.
//!
//! No human annotation is involved: the reference detector's boxes play the
//! role of ground truth after confidence filtering.

use voc_eval::{
    relative_f1, relative_map, Annotation, BoundingBox, BoundingBoxes, RelativeConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Relative Detector Comparison ===\n");

    let mut boxes = BoundingBoxes::new();
    for frame in 0..20u32 {
        let frame_id = format!("frame_{frame:03}");
        let shift = f64::from(frame) * 4.0;
        let car = BoundingBox::new(50.0 + shift, 80.0, 150.0 + shift, 160.0);
        let person = BoundingBox::new(300.0, 40.0 + shift, 340.0, 160.0 + shift);

        boxes.push(Annotation::ground_truth(frame_id.as_str(), "3", car).with_confidence(0.91));
        boxes.push(Annotation::ground_truth(frame_id.as_str(), "1", person).with_confidence(0.84));
        // Not part of the whitelist below
        boxes.push(
            Annotation::ground_truth(frame_id.as_str(), "10", BoundingBox::new(0.0, 0.0, 20.0, 40.0))
                .with_confidence(0.6),
        );

        // The fast detector skips every fifth frame and misses some people
        if frame % 5 != 0 {
            let jitter = f64::from(frame % 3);
            boxes.add_detection(
                frame_id.as_str(),
                "3",
                0.7,
                BoundingBox::new(52.0 + shift + jitter, 78.0, 149.0 + shift, 163.0),
            );
            if frame % 2 == 0 {
                boxes.add_detection(frame_id.as_str(), "1", 0.55, person);
            }
        }
    }

    let config = RelativeConfig::new(["1", "3"]).with_confidence(0.5, 0.3);

    let f1 = relative_f1(&boxes, &config)?;
    println!("F1 report:");
    println!("{}", serde_json::to_string_pretty(&f1)?);
    println!();

    let map = relative_map(&boxes, &config)?;
    println!("Relative AP per class:");
    for result in &map.classes {
        println!("  class {:<3} AP {:.4}", result.class_id, result.ap);
    }
    println!(
        "  mAP {:.4} over {} classes ({})",
        map.summary.map,
        map.summary.class_count,
        map.stats.summary_string()
    );

    Ok(())
}
